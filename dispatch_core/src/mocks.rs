//! Test and helper mocks for dispatch_core

use std::sync::{Mutex, PoisonError};

use dispatch_traits::{CallStation, ElevatorId, StationId};

/// A call station that remembers every indicator update, oldest first.
#[derive(Debug)]
pub struct RecordingStation {
    id: StationId,
    shown: Mutex<Vec<ElevatorId>>,
}

impl RecordingStation {
    pub fn new(id: StationId) -> Self {
        Self {
            id,
            shown: Mutex::new(Vec::new()),
        }
    }

    pub fn shown(&self) -> Vec<ElevatorId> {
        self.shown
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Last elevator shown on the indicator.
    pub fn current(&self) -> Option<ElevatorId> {
        self.shown().last().copied()
    }
}

impl CallStation for RecordingStation {
    fn id(&self) -> StationId {
        self.id
    }

    fn update_indicator(&self, elevator: ElevatorId) {
        self.shown
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(elevator);
    }
}
