//! Builder for `DispatchController`.
//!
//! Registries are required; elevators listed with `with_elevators` are bound
//! in order on `try_build`, so ownership conflicts surface as build errors.

use std::sync::Arc;

use eyre::WrapErr;

use dispatch_traits::{CallStation, ElevatorId, ElevatorRegistry, FloorRegistry};

use crate::config::ControllerCfg;
use crate::controller::DispatchController;
use crate::error::{BuildError, Result};

#[derive(Default)]
pub struct ControllerBuilder {
    cfg: Option<ControllerCfg>,
    elevators: Option<Arc<dyn ElevatorRegistry>>,
    floors: Option<Arc<dyn FloorRegistry>>,
    bind: Vec<ElevatorId>,
    stations: Vec<Arc<dyn CallStation>>,
}

fn validate(cfg: &ControllerCfg) -> Result<()> {
    if cfg.number <= 0 {
        return Err(eyre::Report::new(BuildError::InvalidConfig(
            "controller number must be > 0",
        )));
    }
    if cfg.range < 0 {
        return Err(eyre::Report::new(BuildError::InvalidConfig(
            "range must be >= 0",
        )));
    }
    if cfg.max_passengers == 0 {
        return Err(eyre::Report::new(BuildError::InvalidConfig(
            "max_passengers must be >= 1",
        )));
    }
    Ok(())
}

impl ControllerBuilder {
    pub fn with_config(mut self, cfg: ControllerCfg) -> Self {
        self.cfg = Some(cfg);
        self
    }

    pub fn with_elevator_registry(mut self, registry: Arc<dyn ElevatorRegistry>) -> Self {
        self.elevators = Some(registry);
        self
    }

    pub fn with_floor_registry(mut self, registry: Arc<dyn FloorRegistry>) -> Self {
        self.floors = Some(registry);
        self
    }

    /// Elevators to bind, in scan order.
    pub fn with_elevators(mut self, ids: impl IntoIterator<Item = ElevatorId>) -> Self {
        self.bind.extend(ids);
        self
    }

    pub fn with_call_station(mut self, station: Arc<dyn CallStation>) -> Self {
        self.stations.push(station);
        self
    }

    pub fn try_build(self) -> Result<DispatchController> {
        let elevators = self
            .elevators
            .ok_or_else(|| eyre::Report::new(BuildError::MissingElevatorRegistry))?;
        let floors = self
            .floors
            .ok_or_else(|| eyre::Report::new(BuildError::MissingFloorRegistry))?;
        let cfg = self.cfg.unwrap_or_default();
        validate(&cfg)?;

        let number = cfg.number;
        let mut controller = DispatchController::new(cfg, elevators, floors);
        for id in self.bind {
            // On failure the partial controller drops and releases what it bound.
            controller
                .add_elevator(id)
                .wrap_err_with(|| format!("controller {number}: cannot bind elevator {id}"))?;
        }
        for station in &self.stations {
            controller.register_call_station(station);
        }
        tracing::debug!(
            controller = number,
            elevators = controller.elevator_ids().len(),
            "controller built"
        );
        Ok(controller)
    }
}
