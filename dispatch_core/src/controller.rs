//! Destination-dispatch controller.
//!
//! A controller owns its route table and elevator bindings. Elevators and
//! floors are looked up through the registries on every use, so an entity
//! deleted elsewhere shows up as "not found" for that call and nothing more.

use std::collections::BTreeMap;
use std::sync::{Arc, Weak};

use dispatch_traits::{
    CallStation, ControllerId, Direction, ElevatorId, ElevatorRegistry, Floor, FloorRegistry,
    RouteKind, StationId,
};

use crate::assignment::{AssignmentMap, ElevatorBinding};
use crate::collab_error::map_collaborator_error;
use crate::config::ControllerCfg;
use crate::error::{DispatchError, DispatchResult, RouteRejection};
use crate::route::{Admission, Route, RouteTable};
use crate::selector::{Selection, find_closest_elevator};

/// Route kind handed to the elevator for a dispatch command.
#[inline]
pub fn route_kind(pickup: bool, destination_dispatch: bool) -> RouteKind {
    match (pickup, destination_dispatch) {
        (true, true) => RouteKind::PickupCall,
        (_, false) => RouteKind::Direct,
        (false, true) => RouteKind::Continuation,
    }
}

/// What one scheduling pass did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickOutcome {
    /// Pickup commands delivered to elevators.
    pub pickups: usize,
    /// Onward commands delivered after a pickup arrival.
    pub onward: usize,
    /// An unprocessed route could not be served and held back the rest.
    pub blocked: bool,
}

/// Assigns destination-dispatch trips to the elevators bound to one controller.
pub struct DispatchController {
    cfg: ControllerCfg,
    elevators: Arc<dyn ElevatorRegistry>,
    floors: Arc<dyn FloorRegistry>,
    bindings: AssignmentMap,
    routes: RouteTable,
    stations: BTreeMap<StationId, Weak<dyn CallStation>>,
    floor_range: Option<(Floor, Floor)>,
}

impl core::fmt::Debug for DispatchController {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("DispatchController")
            .field("cfg", &self.cfg)
            .field("bindings", &self.bindings)
            .field("routes", &self.routes)
            .field("stations", &self.stations.keys().collect::<Vec<_>>())
            .field("floor_range", &self.floor_range)
            .finish_non_exhaustive()
    }
}

impl DispatchController {
    pub fn new(
        cfg: ControllerCfg,
        elevators: Arc<dyn ElevatorRegistry>,
        floors: Arc<dyn FloorRegistry>,
    ) -> Self {
        Self {
            cfg,
            elevators,
            floors,
            bindings: AssignmentMap::new(),
            routes: RouteTable::new(),
            stations: BTreeMap::new(),
            floor_range: None,
        }
    }

    pub fn builder() -> crate::builder::ControllerBuilder {
        crate::builder::ControllerBuilder::default()
    }

    // ── Scheduling pass ─────────────────────────────────────────────────────

    /// One scheduling pass; call once per timer tick.
    pub fn tick(&mut self) -> TickOutcome {
        tracing::trace!(controller = self.cfg.number, routes = self.routes.len(), "tick");
        if !self.cfg.destination_dispatch || self.cfg.hybrid {
            self.process_hall_calls(Direction::Up);
            self.process_hall_calls(Direction::Down);
        }
        if self.cfg.destination_dispatch {
            self.process_destination_dispatch()
        } else {
            TickOutcome::default()
        }
    }

    /// Conventional up/down hall-call processing. Hall calls are answered by
    /// the elevators themselves, so there is nothing for the controller to do.
    pub fn process_hall_calls(&mut self, _direction: Direction) {}

    pub fn process_destination_dispatch(&mut self) -> TickOutcome {
        let mut out = self.process_routes();
        out.onward = self.dispatch_arrivals();
        out
    }

    /// Send a car to the origin of every unprocessed route, in table order.
    ///
    /// Stops at the first route no car can take so later trips never jump the
    /// queue.
    pub fn process_routes(&mut self) -> TickOutcome {
        let mut out = TickOutcome::default();
        for idx in 0..self.routes.len() {
            let Some(route) = self.routes.get(idx) else {
                break;
            };
            if route.processed {
                continue;
            }
            let (origin, destination) = (route.origin, route.destination);
            let station = route.station();

            let Some(pick) = self.find_closest_elevator(origin, destination).index() else {
                out.blocked = true;
                break;
            };
            let Some(id) = self.bindings.by_index(pick).map(|b| b.id) else {
                out.blocked = true;
                break;
            };
            let Some(elevator) = self.elevators.elevator(id) else {
                out.blocked = true;
                break;
            };
            if elevator.car_for_floor(origin).is_none() {
                out.blocked = true;
                break;
            }
            tracing::info!(
                controller = self.cfg.number,
                elevator = id,
                origin,
                destination,
                "using elevator"
            );

            if let Some(station) = station {
                station.update_indicator(id);
            }
            self.bindings.record_pickup(id, origin, destination);
            if self
                .dispatch_elevator(id, origin, Direction::of_trip(origin, destination), true)
                .is_ok()
            {
                out.pickups += 1;
            }
            if let Some(r) = self.routes.get_mut(idx) {
                r.processed = true;
            }
        }
        out
    }

    /// Send every car that arrived at a pickup floor on to the destinations of
    /// the processed routes starting there.
    fn dispatch_arrivals(&mut self) -> usize {
        let arrived: Vec<(ElevatorId, Floor)> = self
            .bindings
            .iter()
            .filter_map(|b| b.arrival.map(|a| (b.id, a.floor)))
            .collect();
        let mut onward = 0;
        for (id, floor) in arrived {
            let mut idx = 0;
            while let Some(route) = self.routes.get(idx) {
                if !(route.processed && route.origin == floor) {
                    idx += 1;
                    continue;
                }
                let (destination, direction) = (route.destination, route.direction());
                if self
                    .dispatch_elevator(id, destination, direction, false)
                    .is_ok()
                {
                    onward += 1;
                }
                // Served or dropped, the trip leaves the table; idx now holds the successor.
                self.routes.remove_at(idx);
            }
        }
        onward
    }

    // ── Request intake ──────────────────────────────────────────────────────

    /// Queue a trip. Nothing is dispatched until the next `tick`.
    pub fn request_route(
        &mut self,
        station: Option<&Arc<dyn CallStation>>,
        origin: Floor,
        destination: Floor,
    ) -> DispatchResult<()> {
        let n = self.cfg.number;
        let check = self.check_request(origin, destination);
        if let Err(reason) = check {
            tracing::warn!(controller = n, origin, destination, %reason, "route rejected");
            return Err(reason.into());
        }
        tracing::info!(controller = n, origin, destination, "requesting route");

        let overflow = self.bindings.len() > 1;
        match self.routes.admit(
            origin,
            destination,
            station,
            self.cfg.max_passengers,
            overflow,
        ) {
            Admission::Merged { requests } => {
                tracing::info!(controller = n, origin, destination, requests, "route merged");
            }
            Admission::Opened => {
                tracing::debug!(controller = n, origin, destination, "route opened");
            }
            Admission::Saturated => {
                tracing::debug!(controller = n, origin, destination, "route full");
            }
        }
        Ok(())
    }

    fn check_request(&self, origin: Floor, destination: Floor) -> Result<(), RouteRejection> {
        if !self.cfg.destination_dispatch {
            return Err(RouteRejection::DestinationDispatchDisabled);
        }
        if origin == destination {
            return Err(RouteRejection::SameFloor);
        }
        for f in [origin, destination] {
            if self.floors.floor(f).is_none() {
                return Err(RouteRejection::InvalidFloor(f));
            }
        }
        // With no live elevator the per-floor service checks cannot say anything useful.
        if !self
            .bindings
            .iter()
            .any(|b| self.elevators.elevator(b.id).is_some())
        {
            return Err(RouteRejection::NoValidElevators);
        }
        for f in [origin, destination] {
            if !self.is_serviced_floor(f) {
                return Err(RouteRejection::NoServicingElevator(f));
            }
        }
        Ok(())
    }

    /// Drop the first route for the pair; false if there was none.
    pub fn remove_route(&mut self, origin: Floor, destination: Floor) -> bool {
        let removed = self.routes.remove(origin, destination);
        if removed {
            tracing::debug!(controller = self.cfg.number, origin, destination, "route removed");
        }
        removed
    }

    pub fn find_closest_elevator(&self, origin: Floor, destination: Floor) -> Selection {
        let sel = find_closest_elevator(
            &self.bindings,
            &*self.elevators,
            origin,
            destination,
            self.cfg.range,
        );
        match sel {
            Selection::AllUnavailable => tracing::warn!(
                controller = self.cfg.number,
                elevators = self.bindings.len(),
                "elevators unavailable due to service modes or errors"
            ),
            Selection::NoneQualified | Selection::NoElevators => {
                tracing::debug!(controller = self.cfg.number, origin, destination, "no elevator found");
            }
            Selection::Found(_) => {}
        }
        sel
    }

    // ── Dispatch ────────────────────────────────────────────────────────────

    /// Command an elevator to `floor`.
    ///
    /// A missing elevator or floor, or a refused route, drops the command;
    /// the error only tells the caller it was not delivered.
    pub fn dispatch_elevator(
        &mut self,
        id: ElevatorId,
        floor: Floor,
        direction: Direction,
        pickup: bool,
    ) -> DispatchResult<()> {
        let n = self.cfg.number;
        let Some(elevator) = self.elevators.elevator(id) else {
            tracing::warn!(controller = n, elevator = id, floor, "dispatch dropped: elevator gone");
            return Err(DispatchError::UnknownElevator(id));
        };
        let Some(info) = self.floors.floor(floor) else {
            tracing::warn!(controller = n, elevator = id, floor, "dispatch dropped: floor gone");
            return Err(RouteRejection::InvalidFloor(floor).into());
        };
        tracing::info!(controller = n, elevator = id, floor, label = %info.id, "dispatching elevator");

        let kind = route_kind(pickup, self.cfg.destination_dispatch);
        if !pickup {
            self.assign_elevator(id, floor);
        }
        self.bindings.clear_arrival(id);

        elevator.add_route(floor, direction, kind).map_err(|e| {
            let err = map_collaborator_error(&*e);
            tracing::warn!(controller = n, elevator = id, floor, error = %err, "route refused");
            err
        })
    }

    // ── Elevator bindings ───────────────────────────────────────────────────

    /// Bind an elevator and stamp this controller onto it.
    pub fn add_elevator(&mut self, id: ElevatorId) -> DispatchResult<()> {
        let n = self.cfg.number;
        let elevator = self
            .elevators
            .elevator(id)
            .ok_or(DispatchError::UnknownElevator(id))?;
        if self.bindings.contains(id) {
            return Err(DispatchError::AlreadyBound(id));
        }
        if let Some(owner) = elevator.controller() {
            tracing::warn!(controller = n, elevator = id, owner, "elevator already assigned");
            return Err(DispatchError::OwnedElsewhere {
                elevator: id,
                controller: owner,
            });
        }
        elevator.set_controller(Some(n));
        self.bindings.insert(id);
        self.refresh_floor_range();
        tracing::info!(controller = n, elevator = id, "elevator added");
        Ok(())
    }

    /// Unbind an elevator and clear its back-reference.
    pub fn remove_elevator(&mut self, id: ElevatorId) -> DispatchResult<()> {
        self.bindings
            .remove(id)
            .ok_or(DispatchError::NotBound(id))?;
        if let Some(elevator) = self.elevators.elevator(id)
            && elevator.controller() == Some(self.cfg.number)
        {
            elevator.set_controller(None);
        }
        self.refresh_floor_range();
        tracing::info!(controller = self.cfg.number, elevator = id, "elevator removed");
        Ok(())
    }

    pub fn services_elevator(&self, id: ElevatorId) -> bool {
        self.bindings.contains(id)
    }

    fn refresh_floor_range(&mut self) {
        self.floor_range = self
            .bindings
            .iter()
            .filter_map(|b| self.elevators.elevator(b.id))
            .flat_map(|e| e.cars())
            .fold(None, |acc, car| match acc {
                None => Some((car.bottom_floor, car.top_floor)),
                Some((lo, hi)) => Some((lo.min(car.bottom_floor), hi.max(car.top_floor))),
            });
    }

    /// Lowest and highest floor any bound car reaches.
    pub fn floor_range(&self) -> Option<(Floor, Floor)> {
        self.floor_range
    }

    /// True if a bound, still-existing elevator stops at `floor`.
    pub fn is_serviced_floor(&self, floor: Floor) -> bool {
        self.bindings.iter().any(|b| {
            self.elevators
                .elevator(b.id)
                .is_some_and(|e| e.services_floor(floor, true))
        })
    }

    // ── Arrivals and assignments ────────────────────────────────────────────

    /// Arrival callback from the elevator subsystem.
    ///
    /// Ignored for unbound elevators, unknown floors, and while a previous
    /// arrival is still latched.
    pub fn elevator_arrived(&mut self, id: ElevatorId, floor: Floor, direction: Direction) {
        if self
            .bindings
            .get(id)
            .is_none_or(|b| b.arrival.is_some())
        {
            return;
        }
        let Some(info) = self.floors.floor(floor) else {
            return;
        };
        tracing::info!(
            controller = self.cfg.number,
            elevator = id,
            floor,
            label = %info.id,
            "elevator arrived"
        );
        self.bindings.arrive(id, floor, direction);
    }

    /// Elevator waiting at `origin` for a trip to `destination`.
    pub fn elevator_arrived_for(&self, origin: Floor, destination: Floor) -> Option<ElevatorId> {
        self.bindings.arrived_for(origin, destination)
    }

    pub fn is_elevator_assigned(&self, id: ElevatorId, destination: Floor) -> bool {
        self.bindings.is_assigned(id, destination)
    }

    pub fn is_elevator_assigned_to_other(&self, id: ElevatorId, destination: Floor) -> bool {
        self.bindings
            .is_assigned_to_other(id, destination, self.cfg.range)
    }

    pub fn assign_elevator(&mut self, id: ElevatorId, destination: Floor) {
        self.bindings.assign(id, destination);
    }

    // ── Call stations ───────────────────────────────────────────────────────

    /// Returns false if the station was already registered.
    pub fn register_call_station(&mut self, station: &Arc<dyn CallStation>) -> bool {
        let id = station.id();
        if self.stations.get(&id).is_some_and(|w| w.strong_count() > 0) {
            return false;
        }
        self.stations.insert(id, Arc::downgrade(station));
        true
    }

    pub fn unregister_call_station(&mut self, id: StationId) -> bool {
        self.stations.remove(&id).is_some()
    }

    /// Ids of registered stations that are still alive.
    pub fn registered_call_stations(&self) -> Vec<StationId> {
        self.stations
            .iter()
            .filter(|(_, w)| w.strong_count() > 0)
            .map(|(id, _)| *id)
            .collect()
    }

    // ── Fire service ────────────────────────────────────────────────────────

    /// Toggle fire service phase 1 on every bound elevator.
    ///
    /// True if at least one elevator accepted the change.
    pub fn fire_service(&self, on: bool) -> bool {
        let mut accepted = false;
        for b in self.bindings.iter() {
            if let Some(e) = self.elevators.elevator(b.id) {
                accepted |= e.enable_fire_service_phase1(on);
            }
        }
        tracing::info!(controller = self.cfg.number, on, accepted, "fire service phase 1");
        accepted
    }

    // ── Accessors ───────────────────────────────────────────────────────────

    pub fn number(&self) -> ControllerId {
        self.cfg.number
    }

    pub fn config(&self) -> &ControllerCfg {
        &self.cfg
    }

    pub fn routes(&self) -> &RouteTable {
        &self.routes
    }

    pub fn binding(&self, id: ElevatorId) -> Option<&ElevatorBinding> {
        self.bindings.get(id)
    }

    pub fn elevator_ids(&self) -> Vec<ElevatorId> {
        self.bindings.ids()
    }

    pub fn pending_routes(&self) -> impl Iterator<Item = &Route> {
        self.routes.iter().filter(|r| !r.processed)
    }

    pub fn range(&self) -> i32 {
        self.cfg.range
    }

    pub fn set_range(&mut self, range: i32) {
        self.cfg.range = range.max(0);
    }

    pub fn max_passengers(&self) -> u32 {
        self.cfg.max_passengers
    }

    pub fn set_max_passengers(&mut self, max: u32) {
        self.cfg.max_passengers = max.max(1);
    }

    pub fn destination_dispatch(&self) -> bool {
        self.cfg.destination_dispatch
    }

    pub fn set_destination_dispatch(&mut self, on: bool) {
        self.cfg.destination_dispatch = on;
    }

    pub fn hybrid(&self) -> bool {
        self.cfg.hybrid
    }

    pub fn set_hybrid(&mut self, on: bool) {
        self.cfg.hybrid = on;
    }
}

impl Drop for DispatchController {
    fn drop(&mut self) {
        for id in self.bindings.ids() {
            if let Some(e) = self.elevators.elevator(id)
                && e.controller() == Some(self.cfg.number)
            {
                e.set_controller(None);
            }
        }
        tracing::trace!(controller = self.cfg.number, "controller dropped");
    }
}
