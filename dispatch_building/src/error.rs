use dispatch_traits::{ElevatorId, Floor};
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BuildingError {
    #[error("unknown floor {0}")]
    UnknownFloor(Floor),
    #[error("unknown elevator {0}")]
    UnknownElevator(ElevatorId),
    #[error("elevator {0} already exists")]
    DuplicateElevator(ElevatorId),
    #[error("elevator {elevator} does not serve floor {floor}")]
    UnservicedFloor { elevator: ElevatorId, floor: Floor },
    #[error("elevator {0} is out of service")]
    OutOfService(ElevatorId),
    #[error("invalid elevator layout: {0}")]
    Layout(&'static str),
}

pub type Result<T> = std::result::Result<T, BuildingError>;
