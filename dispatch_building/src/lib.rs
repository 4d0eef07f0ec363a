#![cfg_attr(all(not(debug_assertions), not(test)), deny(warnings))]
#![allow(clippy::module_name_repetitions, clippy::missing_errors_doc)]
//! In-memory building: the elevator and floor registries the dispatch
//! controller talks to, backed by simulated elevators.
//!
//! Entities live in id-keyed maps. Lookups hand out `Arc` handles, and a
//! removed entity simply stops resolving, so in-flight holders never dangle.
pub mod elevator;
pub mod error;

pub use elevator::{ElevatorSpec, IssuedRoute, ServiceMode, SimElevator};
pub use error::BuildingError;

use std::collections::BTreeMap;
use std::sync::{Arc, PoisonError, RwLock};

use dispatch_traits::{
    ArrivalEvent, ElevatorHandle, ElevatorId, ElevatorRegistry, Floor, FloorInfo, FloorRegistry,
};

use crate::error::Result;

#[derive(Debug, Default)]
pub struct Building {
    floors: RwLock<BTreeMap<Floor, FloorInfo>>,
    elevators: RwLock<BTreeMap<ElevatorId, Arc<SimElevator>>>,
}

impl Building {
    pub fn new() -> Self {
        Self::default()
    }

    /// Building with floors `bottom..=top`, labelled by number.
    pub fn with_floors(bottom: Floor, top: Floor) -> Self {
        let b = Self::new();
        for f in bottom..=top {
            b.add_floor(f, f.to_string());
        }
        b
    }

    pub fn add_floor(&self, number: Floor, id: impl Into<String>) {
        let info = FloorInfo {
            number,
            id: id.into(),
        };
        self.floors
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(number, info);
    }

    pub fn remove_floor(&self, number: Floor) -> bool {
        self.floors
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&number)
            .is_some()
    }

    /// Install an elevator; every floor it can reach must already exist.
    pub fn add_elevator(&self, spec: ElevatorSpec) -> Result<Arc<SimElevator>> {
        let id = spec.id;
        let elevator = SimElevator::new(spec)?;
        {
            let floors = self.floors.read().unwrap_or_else(PoisonError::into_inner);
            for car in elevator.cars() {
                for f in [car.bottom_floor, car.top_floor] {
                    if !floors.contains_key(&f) {
                        return Err(BuildingError::UnknownFloor(f));
                    }
                }
            }
        }
        let mut map = self
            .elevators
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        if map.contains_key(&id) {
            return Err(BuildingError::DuplicateElevator(id));
        }
        let elevator = Arc::new(elevator);
        map.insert(id, elevator.clone());
        tracing::debug!(elevator = id, "elevator installed");
        Ok(elevator)
    }

    /// Delete an elevator. Handles already held elsewhere stay valid but the
    /// registry no longer resolves the id.
    pub fn remove_elevator(&self, id: ElevatorId) -> Option<Arc<SimElevator>> {
        self.elevators
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&id)
    }

    pub fn sim_elevator(&self, id: ElevatorId) -> Option<Arc<SimElevator>> {
        self.elevators
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&id)
            .cloned()
    }

    pub fn elevator_ids(&self) -> Vec<ElevatorId> {
        self.elevators
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .keys()
            .copied()
            .collect()
    }

    /// Routes ever issued to an elevator, oldest first.
    pub fn issued_routes(&self, id: ElevatorId) -> Result<Vec<IssuedRoute>> {
        self.sim_elevator(id)
            .map(|e| e.issued())
            .ok_or(BuildingError::UnknownElevator(id))
    }

    /// Advance every elevator one step, collecting arrivals in id order.
    pub fn step(&self) -> Vec<ArrivalEvent> {
        let elevators: Vec<Arc<SimElevator>> = self
            .elevators
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .cloned()
            .collect();
        elevators.iter().filter_map(|e| e.step()).collect()
    }
}

impl ElevatorRegistry for Building {
    fn elevator(&self, id: ElevatorId) -> Option<Arc<dyn ElevatorHandle>> {
        self.sim_elevator(id)
            .map(|e| -> Arc<dyn ElevatorHandle> { e })
    }
}

impl FloorRegistry for Building {
    fn floor(&self, number: Floor) -> Option<FloorInfo> {
        self.floors
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&number)
            .cloned()
    }
}
