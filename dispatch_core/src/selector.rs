//! Closest-elevator selection for destination dispatch.

use dispatch_traits::{Availability, Direction, ElevatorRegistry, Floor};

use crate::assignment::AssignmentMap;
use crate::util::floor_distance;

/// Outcome of a selection scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Selection {
    /// Index into the controller's binding list.
    Found(usize),
    /// No elevators are bound.
    NoElevators,
    /// Every bound elevator is in a service mode or error state.
    AllUnavailable,
    /// Usable elevators exist but none qualified.
    NoneQualified,
}

impl Selection {
    pub fn index(self) -> Option<usize> {
        match self {
            Selection::Found(i) => Some(i),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct Best {
    idx: usize,
    distance: u32,
    busy: bool,
}

impl Best {
    /// Distance decides; a busy incumbent also yields to any available car.
    fn yields_to(self, distance: u32, busy: bool) -> bool {
        distance < self.distance || (self.busy && !busy)
    }
}

/// Pick the bound elevator best placed to serve `origin -> destination`.
///
/// Scans in binding order. Elevators that do not stop at `destination`, have
/// no car for `origin`, have vanished from the registry, or are committed to a
/// destination more than `range` floors away are skipped. Equal distances
/// keep the first car found.
pub fn find_closest_elevator(
    bindings: &AssignmentMap,
    registry: &dyn ElevatorRegistry,
    origin: Floor,
    destination: Floor,
    range: i32,
) -> Selection {
    let count = bindings.len();
    if count == 0 {
        return Selection::NoElevators;
    }
    let direction = Direction::of_trip(origin, destination);
    let mut best: Option<Best> = None;
    let mut errors = 0usize;

    for (idx, binding) in bindings.iter().enumerate() {
        let Some(elevator) = registry.elevator(binding.id) else {
            continue;
        };
        if !elevator.services_floor(destination, true) {
            continue;
        }
        let Some(car) = elevator.car_for_floor(origin) else {
            continue;
        };
        let busy = match elevator.availability_for(origin, direction, true) {
            Availability::Available => false,
            Availability::Busy => true,
            Availability::Unusable => {
                errors += 1;
                tracing::debug!(elevator = binding.id, "unusable for call");
                continue;
            }
        };
        if bindings.is_assigned_to_other(binding.id, destination, range) {
            tracing::debug!(elevator = binding.id, destination, "committed elsewhere");
            continue;
        }
        let distance = floor_distance(car.floor, origin);
        if best.is_none_or(|b| b.yields_to(distance, busy)) {
            tracing::debug!(elevator = binding.id, car = car.number, distance, busy, "closest so far");
            best = Some(Best {
                idx,
                distance,
                busy,
            });
        }
    }

    match best {
        Some(b) => Selection::Found(b.idx),
        None if errors == count => Selection::AllUnavailable,
        None => Selection::NoneQualified,
    }
}

#[cfg(test)]
mod tests {
    use super::Best;

    #[test]
    fn busy_incumbent_yields_to_any_available_car() {
        let busy = Best {
            idx: 0,
            distance: 1,
            busy: true,
        };
        assert!(busy.yields_to(9, false));
        assert!(!busy.yields_to(9, true));
        assert!(busy.yields_to(0, true));
    }

    #[test]
    fn ties_keep_first_found() {
        let free = Best {
            idx: 0,
            distance: 3,
            busy: false,
        };
        assert!(!free.yields_to(3, false));
        assert!(!free.yields_to(3, true));
        assert!(free.yields_to(2, true));
    }
}
