//! Collaborator contracts for the dispatch controller.
//!
//! The controller never owns elevators or floors. It reaches them through the
//! registries below by stable integer identifier, and every lookup may come
//! back empty because the entity was deleted elsewhere.
pub mod clock;

pub use clock::{Clock, MonotonicClock};

use std::sync::Arc;

/// Elevator identifier, unique within a building.
pub type ElevatorId = i32;
/// Dispatch controller number.
pub type ControllerId = i32;
/// Call station / destination kiosk identifier.
pub type StationId = i32;
/// Floor number. Negative values are basements.
pub type Floor = i32;

/// Direction of travel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Up,
    Down,
}

impl Direction {
    /// Direction of a trip: up if the destination is above the origin, otherwise down.
    #[inline]
    pub fn of_trip(origin: Floor, destination: Floor) -> Self {
        if destination > origin {
            Direction::Up
        } else {
            Direction::Down
        }
    }

    #[inline]
    pub fn is_up(self) -> bool {
        matches!(self, Direction::Up)
    }
}

/// An elevator's own three-way answer to "can you take this call?".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Availability {
    /// Idle or already heading the right way.
    Available,
    /// Usable, but currently serving other routes.
    Busy,
    /// In a service mode or error state; must not be selected.
    Unusable,
}

/// How a route handed to an elevator should be treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteKind {
    /// Onward leg of a trip (passenger already aboard).
    Continuation,
    /// Destination-dispatch pickup at the trip origin.
    PickupCall,
    /// Controller dispatch outside destination-dispatch mode.
    Direct,
}

/// Snapshot of one car of an elevator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CarInfo {
    pub number: u32,
    /// Floor the car is currently at (or passing).
    pub floor: Floor,
    pub bottom_floor: Floor,
    pub top_floor: Floor,
}

/// Floor identity as resolved by the floor registry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FloorInfo {
    pub number: Floor,
    /// Display label ("L", "G", "12A", ...).
    pub id: String,
}

/// Arrival notification flowing from the elevator subsystem to a controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArrivalEvent {
    pub elevator: ElevatorId,
    pub floor: Floor,
    pub direction: Direction,
}

/// Runtime view of one elevator.
///
/// All methods take `&self`; implementations synchronize internally because
/// handles are shared between the dispatch tick and the elevator subsystem.
pub trait ElevatorHandle: Send + Sync {
    fn id(&self) -> ElevatorId;

    /// All cars of this elevator.
    fn cars(&self) -> Vec<CarInfo>;

    /// The car that serves `floor`, if any.
    fn car_for_floor(&self, floor: Floor) -> Option<CarInfo>;

    /// Whether the elevator serves `floor`.
    ///
    /// With `exact` the floor must be a stop; without it, floors the shaft
    /// merely passes (express zones) also count.
    fn services_floor(&self, floor: Floor, exact: bool) -> bool;

    fn availability_for(&self, origin: Floor, direction: Direction, exclusive: bool)
    -> Availability;

    fn add_route(
        &self,
        floor: Floor,
        direction: Direction,
        kind: RouteKind,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;

    /// Toggle fire service phase 1. Returns true if the elevator accepted the change.
    fn enable_fire_service_phase1(&self, on: bool) -> bool;

    /// Owning controller back-reference (an identifier, never a pointer).
    fn controller(&self) -> Option<ControllerId>;
    fn set_controller(&self, controller: Option<ControllerId>);
}

/// Directory of live elevators.
pub trait ElevatorRegistry: Send + Sync {
    fn elevator(&self, id: ElevatorId) -> Option<Arc<dyn ElevatorHandle>>;
}

/// Directory of floors.
pub trait FloorRegistry: Send + Sync {
    fn floor(&self, number: Floor) -> Option<FloorInfo>;
}

/// A request origin that wants to know which elevator was assigned.
pub trait CallStation: Send + Sync {
    fn id(&self) -> StationId;
    fn update_indicator(&self, elevator: ElevatorId);
}
