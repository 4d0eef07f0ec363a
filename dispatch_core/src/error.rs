use dispatch_traits::{ControllerId, ElevatorId, Floor};
use thiserror::Error;

/// Why `request_route` refused a trip. Checked in declaration order.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum RouteRejection {
    #[error("destination dispatch not enabled")]
    DestinationDispatchDisabled,
    #[error("floors are the same")]
    SameFloor,
    #[error("invalid floor {0}")]
    InvalidFloor(Floor),
    #[error("no elevators found for floor {0}")]
    NoServicingElevator(Floor),
    #[error("no valid elevators found")]
    NoValidElevators,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DispatchError {
    #[error("route rejected: {0}")]
    Rejected(#[from] RouteRejection),
    #[error("elevator {0} not found")]
    UnknownElevator(ElevatorId),
    #[error("elevator {0} already bound to this controller")]
    AlreadyBound(ElevatorId),
    #[error("elevator {elevator} already assigned to controller {controller}")]
    OwnedElsewhere {
        elevator: ElevatorId,
        controller: ControllerId,
    },
    #[error("elevator {0} is not bound to this controller")]
    NotBound(ElevatorId),
    #[error("collaborator error: {0}")]
    Collaborator(String),
    #[error("out of service: {0}")]
    OutOfService(String),
}

#[derive(Debug, Error, Clone)]
pub enum BuildError {
    #[error("missing elevator registry")]
    MissingElevatorRegistry,
    #[error("missing floor registry")]
    MissingFloorRegistry,
    #[error("invalid config: {0}")]
    InvalidConfig(&'static str),
}

pub type DispatchResult<T> = std::result::Result<T, DispatchError>;
pub type Result<T> = eyre::Result<T>;
pub use eyre::Report;
