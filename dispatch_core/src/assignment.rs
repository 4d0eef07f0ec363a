//! Per-elevator bookkeeping for one controller.

use dispatch_traits::{Direction, ElevatorId, Floor};

/// An arrival latched at a pickup floor, waiting for the next tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Arrival {
    pub floor: Floor,
    pub direction: Direction,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElevatorBinding {
    pub id: ElevatorId,
    pub arrival: Option<Arrival>,
    /// Committed destination; the car is locked to it until it arrives there.
    pub assigned_destination: Option<Floor>,
    /// Destination of the trip the car was last sent to pick up.
    pub destination_floor: Option<Floor>,
    /// Pickup floor the car is heading to, if any.
    pub call_floor: Option<Floor>,
}

impl ElevatorBinding {
    pub fn new(id: ElevatorId) -> Self {
        Self {
            id,
            arrival: None,
            assigned_destination: None,
            destination_floor: None,
            call_floor: None,
        }
    }
}

/// Bindings in the order elevators were added; selection scans in this order.
#[derive(Debug, Default)]
pub struct AssignmentMap {
    bindings: Vec<ElevatorBinding>,
}

impl AssignmentMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    pub fn contains(&self, id: ElevatorId) -> bool {
        self.bindings.iter().any(|b| b.id == id)
    }

    pub fn insert(&mut self, id: ElevatorId) -> bool {
        if self.contains(id) {
            return false;
        }
        self.bindings.push(ElevatorBinding::new(id));
        true
    }

    pub fn remove(&mut self, id: ElevatorId) -> Option<ElevatorBinding> {
        let idx = self.bindings.iter().position(|b| b.id == id)?;
        Some(self.bindings.remove(idx))
    }

    pub fn get(&self, id: ElevatorId) -> Option<&ElevatorBinding> {
        self.bindings.iter().find(|b| b.id == id)
    }

    pub fn get_mut(&mut self, id: ElevatorId) -> Option<&mut ElevatorBinding> {
        self.bindings.iter_mut().find(|b| b.id == id)
    }

    pub fn by_index(&self, idx: usize) -> Option<&ElevatorBinding> {
        self.bindings.get(idx)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ElevatorBinding> {
        self.bindings.iter()
    }

    pub fn ids(&self) -> Vec<ElevatorId> {
        self.bindings.iter().map(|b| b.id).collect()
    }

    pub fn assign(&mut self, id: ElevatorId, destination: Floor) {
        if let Some(b) = self.get_mut(id) {
            b.assigned_destination = Some(destination);
        }
    }

    pub fn is_assigned(&self, id: ElevatorId, destination: Floor) -> bool {
        self.get(id)
            .is_some_and(|b| b.assigned_destination == Some(destination))
    }

    /// True when the car is committed to a different destination more than
    /// `range` floors away and another car could take the trip instead.
    pub fn is_assigned_to_other(&self, id: ElevatorId, destination: Floor, range: i32) -> bool {
        if self.bindings.len() <= 1 {
            return false;
        }
        let Some(assigned) = self.get(id).and_then(|b| b.assigned_destination) else {
            return false;
        };
        assigned != destination
            && i64::from(assigned.abs_diff(destination)) > i64::from(range)
    }

    /// Record a pickup: where the car is called and where the trip ends.
    pub fn record_pickup(&mut self, id: ElevatorId, call_floor: Floor, destination: Floor) {
        if let Some(b) = self.get_mut(id) {
            b.destination_floor = Some(destination);
            b.call_floor = Some(call_floor);
        }
    }

    /// Apply an arrival. Returns false when an earlier arrival is still latched.
    pub fn arrive(&mut self, id: ElevatorId, floor: Floor, direction: Direction) -> bool {
        let Some(b) = self.get_mut(id) else {
            return false;
        };
        if b.arrival.is_some() {
            return false;
        }
        if b.call_floor == Some(floor) {
            b.arrival = Some(Arrival { floor, direction });
            b.call_floor = None;
        }
        if b.assigned_destination == Some(floor) {
            b.assigned_destination = None;
        }
        true
    }

    pub fn clear_arrival(&mut self, id: ElevatorId) {
        if let Some(b) = self.get_mut(id) {
            b.arrival = None;
        }
    }

    /// Elevator whose latched arrival is at `origin` on a trip to `destination`.
    pub fn arrived_for(&self, origin: Floor, destination: Floor) -> Option<ElevatorId> {
        self.bindings
            .iter()
            .find(|b| {
                b.arrival.is_some_and(|a| a.floor == origin)
                    && b.destination_floor == Some(destination)
            })
            .map(|b| b.id)
    }
}
