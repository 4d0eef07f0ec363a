//! Assembles the simulated building and its controllers from config.

use std::collections::BTreeMap;
use std::sync::Arc;

use dispatch_building::{Building, ElevatorSpec};
use dispatch_core::error::Result as CoreResult;
use dispatch_core::mocks::RecordingStation;
use dispatch_core::{ControllerCfg, DispatchController};
use dispatch_traits::{CallStation, ControllerId, StationId};
use eyre::WrapErr;

/// Destination kiosks by station id.
pub type Kiosks = BTreeMap<StationId, Arc<RecordingStation>>;

/// Last elevator shown on each kiosk.
pub fn indicators(kiosks: &Kiosks) -> BTreeMap<StationId, Option<i32>> {
    kiosks.iter().map(|(id, k)| (*id, k.current())).collect()
}

pub struct Plant {
    pub building: Arc<Building>,
    pub controllers: Vec<DispatchController>,
    kiosks: Kiosks,
}

impl Plant {
    pub fn controller_mut(&mut self, number: ControllerId) -> Option<&mut DispatchController> {
        self.controllers.iter_mut().find(|c| c.number() == number)
    }

    /// Kiosk for a station id, created and registered with `controller` on first use.
    pub fn kiosk(&mut self, station: StationId, controller: ControllerId) -> Arc<dyn CallStation> {
        let kiosk = self
            .kiosks
            .entry(station)
            .or_insert_with(|| Arc::new(RecordingStation::new(station)))
            .clone();
        let as_dyn: Arc<dyn CallStation> = kiosk;
        if let Some(c) = self.controller_mut(controller) {
            c.register_call_station(&as_dyn);
        }
        as_dyn
    }

    pub fn indicators(&self) -> BTreeMap<StationId, Option<i32>> {
        indicators(&self.kiosks)
    }

    pub fn into_parts(self) -> (Arc<Building>, Vec<DispatchController>, Kiosks) {
        (self.building, self.controllers, self.kiosks)
    }
}

pub fn assemble(cfg: &dispatch_config::Config) -> CoreResult<Plant> {
    let building = Building::new();
    for (floor, label) in cfg.building.labels() {
        building.add_floor(floor, label);
    }
    for e in &cfg.elevators {
        building
            .add_elevator(ElevatorSpec {
                id: e.id,
                start_floor: e.start_floor,
                serves: e.serves,
                skip: e.skip.clone(),
                cars: e.cars,
            })
            .wrap_err_with(|| format!("install elevator {}", e.id))?;
    }
    let building = Arc::new(building);

    let mut controllers = Vec::with_capacity(cfg.controllers.len());
    for c in &cfg.controllers {
        let controller = DispatchController::builder()
            .with_config(ControllerCfg::from(c))
            .with_elevator_registry(building.clone())
            .with_floor_registry(building.clone())
            .with_elevators(c.elevators.iter().copied())
            .try_build()?;
        tracing::info!(
            controller = c.number,
            elevators = ?c.elevators,
            destination_dispatch = c.destination_dispatch,
            "controller ready"
        );
        controllers.push(controller);
    }

    Ok(Plant {
        building,
        controllers,
        kiosks: BTreeMap::new(),
    })
}
