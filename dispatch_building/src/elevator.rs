//! Simulated elevator: cars, serviced floors, route queue and service modes.
//!
//! Cars of one elevator are stacked (double-deck style): car `k` sits `k`
//! floors above car 0 and they always move together.

use std::collections::{BTreeSet, VecDeque};
use std::sync::{Mutex, MutexGuard, PoisonError};

use dispatch_traits::{
    ArrivalEvent, Availability, CarInfo, ControllerId, Direction, ElevatorHandle, ElevatorId,
    Floor, RouteKind,
};

use crate::error::{BuildingError, Result};

/// Elevator operating mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ServiceMode {
    #[default]
    Normal,
    Independent,
    Inspection,
    FirePhase1,
}

/// Static layout of a simulated elevator.
#[derive(Debug, Clone)]
pub struct ElevatorSpec {
    pub id: ElevatorId,
    pub start_floor: Floor,
    /// Inclusive range of the lowest car.
    pub serves: (Floor, Floor),
    /// Express floors inside `serves` without a stop.
    pub skip: Vec<Floor>,
    pub cars: u32,
}

/// A route command as received through `add_route`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IssuedRoute {
    pub floor: Floor,
    pub direction: Direction,
    pub kind: RouteKind,
}

#[derive(Debug)]
struct SimState {
    /// Floor of car 0.
    base_floor: Floor,
    queue: VecDeque<IssuedRoute>,
    issued: Vec<IssuedRoute>,
    mode: ServiceMode,
    faulted: bool,
    controller: Option<ControllerId>,
}

#[derive(Debug)]
pub struct SimElevator {
    id: ElevatorId,
    serves: (Floor, Floor),
    /// Stops of car 0; car `k` stops at each of these plus `k`.
    stops: BTreeSet<Floor>,
    car_count: u32,
    state: Mutex<SimState>,
}

impl SimElevator {
    pub fn new(spec: ElevatorSpec) -> Result<Self> {
        let (lo, hi) = spec.serves;
        if lo >= hi {
            return Err(BuildingError::Layout("serves must span at least two floors"));
        }
        if spec.cars == 0 {
            return Err(BuildingError::Layout("an elevator needs at least one car"));
        }
        if !(lo..=hi).contains(&spec.start_floor) {
            return Err(BuildingError::Layout("start floor outside served range"));
        }
        let stops: BTreeSet<Floor> = (lo..=hi).filter(|f| !spec.skip.contains(f)).collect();
        Ok(Self {
            id: spec.id,
            serves: spec.serves,
            stops,
            car_count: spec.cars,
            state: Mutex::new(SimState {
                base_floor: spec.start_floor,
                queue: VecDeque::new(),
                issued: Vec::new(),
                mode: ServiceMode::Normal,
                faulted: false,
                controller: None,
            }),
        })
    }

    fn lock(&self) -> MutexGuard<'_, SimState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn car_offset(k: u32) -> Floor {
        Floor::try_from(k).unwrap_or(Floor::MAX)
    }

    /// Index of the car that stops at `floor`, lowest car first.
    fn car_index_for(&self, floor: Floor) -> Option<u32> {
        (0..self.car_count).find(|&k| {
            floor
                .checked_sub(Self::car_offset(k))
                .is_some_and(|base| self.stops.contains(&base))
        })
    }

    fn car_info(&self, k: u32, base_floor: Floor) -> CarInfo {
        let off = Self::car_offset(k);
        CarInfo {
            number: k + 1,
            floor: base_floor.saturating_add(off),
            bottom_floor: self.serves.0.saturating_add(off),
            top_floor: self.serves.1.saturating_add(off),
        }
    }

    pub fn mode(&self) -> ServiceMode {
        self.lock().mode
    }

    pub fn set_mode(&self, mode: ServiceMode) {
        let mut st = self.lock();
        st.mode = mode;
        if mode != ServiceMode::Normal {
            st.queue.clear();
        }
    }

    /// Mark the elevator as faulted (movement error); it becomes unusable.
    pub fn set_faulted(&self, faulted: bool) {
        self.lock().faulted = faulted;
    }

    /// Floor of the lowest car.
    pub fn floor(&self) -> Floor {
        self.lock().base_floor
    }

    /// Teleport the cars; used to stage scenarios.
    pub fn place_at(&self, base_floor: Floor) {
        self.lock().base_floor = base_floor;
    }

    pub fn queued(&self) -> Vec<IssuedRoute> {
        self.lock().queue.iter().copied().collect()
    }

    pub fn issued(&self) -> Vec<IssuedRoute> {
        self.lock().issued.clone()
    }

    /// Advance one floor toward the first queued route.
    ///
    /// Returns an arrival when the serving car is at the route floor, in which
    /// case the route is popped and the cars do not move this step.
    pub fn step(&self) -> Option<ArrivalEvent> {
        let mut st = self.lock();
        let head = *st.queue.front()?;
        let Some(target_base) = self
            .car_index_for(head.floor)
            .and_then(|k| head.floor.checked_sub(Self::car_offset(k)))
        else {
            // Layout changed under the queued route; drop it.
            st.queue.pop_front();
            return None;
        };
        if st.base_floor == target_base {
            st.queue.pop_front();
            tracing::trace!(elevator = self.id, floor = head.floor, "sim arrival");
            return Some(ArrivalEvent {
                elevator: self.id,
                floor: head.floor,
                direction: head.direction,
            });
        }
        st.base_floor += if target_base > st.base_floor { 1 } else { -1 };
        None
    }
}

impl ElevatorHandle for SimElevator {
    fn id(&self) -> ElevatorId {
        self.id
    }

    fn cars(&self) -> Vec<CarInfo> {
        let base = self.lock().base_floor;
        (0..self.car_count).map(|k| self.car_info(k, base)).collect()
    }

    fn car_for_floor(&self, floor: Floor) -> Option<CarInfo> {
        let k = self.car_index_for(floor)?;
        let base = self.lock().base_floor;
        Some(self.car_info(k, base))
    }

    fn services_floor(&self, floor: Floor, exact: bool) -> bool {
        if exact {
            return self.car_index_for(floor).is_some();
        }
        (0..self.car_count).any(|k| {
            let off = Self::car_offset(k);
            (self.serves.0.saturating_add(off)..=self.serves.1.saturating_add(off)).contains(&floor)
        })
    }

    fn availability_for(
        &self,
        origin: Floor,
        direction: Direction,
        exclusive: bool,
    ) -> Availability {
        let st = self.lock();
        if st.mode != ServiceMode::Normal || st.faulted {
            return Availability::Unusable;
        }
        let Some(head) = st.queue.front() else {
            return Availability::Available;
        };
        // Shared calls may ride along when the car is already heading past the origin.
        let ahead = match head.direction {
            Direction::Up => origin >= st.base_floor && origin <= head.floor,
            Direction::Down => origin <= st.base_floor && origin >= head.floor,
        };
        if !exclusive && head.direction == direction && ahead {
            Availability::Available
        } else {
            Availability::Busy
        }
    }

    fn add_route(
        &self,
        floor: Floor,
        direction: Direction,
        kind: RouteKind,
    ) -> std::result::Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let mut st = self.lock();
        if st.mode != ServiceMode::Normal || st.faulted {
            return Err(Box::new(BuildingError::OutOfService(self.id)));
        }
        if self.car_index_for(floor).is_none() {
            return Err(Box::new(BuildingError::UnservicedFloor {
                elevator: self.id,
                floor,
            }));
        }
        let route = IssuedRoute {
            floor,
            direction,
            kind,
        };
        st.issued.push(route);
        if !st.queue.iter().any(|r| r.floor == floor) {
            st.queue.push_back(route);
        }
        tracing::debug!(elevator = self.id, floor, ?kind, "route queued");
        Ok(())
    }

    fn enable_fire_service_phase1(&self, on: bool) -> bool {
        let mut st = self.lock();
        match (on, st.mode) {
            (true, ServiceMode::FirePhase1) | (false, ServiceMode::Normal) => false,
            // Inspection keeps the car under technician control.
            (true, ServiceMode::Inspection) => false,
            (true, _) => {
                st.mode = ServiceMode::FirePhase1;
                st.queue.clear();
                true
            }
            (false, ServiceMode::FirePhase1) => {
                st.mode = ServiceMode::Normal;
                true
            }
            (false, _) => false,
        }
    }

    fn controller(&self) -> Option<ControllerId> {
        self.lock().controller
    }

    fn set_controller(&self, controller: Option<ControllerId>) {
        self.lock().controller = controller;
    }
}
