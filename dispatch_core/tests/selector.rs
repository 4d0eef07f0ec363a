//! Closest-elevator selection against hand-scripted elevators.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use dispatch_core::{ControllerCfg, DispatchController, Selection};
use dispatch_traits::{
    Availability, CarInfo, ControllerId, Direction, ElevatorHandle, ElevatorId, ElevatorRegistry,
    Floor, FloorInfo, FloorRegistry, RouteKind,
};
use rstest::rstest;

/// Elevator with a fixed floor and availability; serves every floor in 1..=30.
struct Scripted {
    id: ElevatorId,
    floor: Floor,
    availability: Availability,
    owner: Mutex<Option<ControllerId>>,
}

impl ElevatorHandle for Scripted {
    fn id(&self) -> ElevatorId {
        self.id
    }
    fn cars(&self) -> Vec<CarInfo> {
        vec![CarInfo {
            number: 1,
            floor: self.floor,
            bottom_floor: 1,
            top_floor: 30,
        }]
    }
    fn car_for_floor(&self, floor: Floor) -> Option<CarInfo> {
        (1..=30).contains(&floor).then(|| self.cars()[0])
    }
    fn services_floor(&self, floor: Floor, _exact: bool) -> bool {
        (1..=30).contains(&floor)
    }
    fn availability_for(&self, _o: Floor, _d: Direction, _x: bool) -> Availability {
        self.availability
    }
    fn add_route(
        &self,
        _floor: Floor,
        _direction: Direction,
        _kind: RouteKind,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        Ok(())
    }
    fn enable_fire_service_phase1(&self, _on: bool) -> bool {
        false
    }
    fn controller(&self) -> Option<ControllerId> {
        *self.owner.lock().unwrap()
    }
    fn set_controller(&self, controller: Option<ControllerId>) {
        *self.owner.lock().unwrap() = controller;
    }
}

#[derive(Default)]
struct Registry {
    elevators: BTreeMap<ElevatorId, Arc<Scripted>>,
}

impl ElevatorRegistry for Registry {
    fn elevator(&self, id: ElevatorId) -> Option<Arc<dyn ElevatorHandle>> {
        self.elevators
            .get(&id)
            .map(|e| -> Arc<dyn ElevatorHandle> { e.clone() })
    }
}

impl FloorRegistry for Registry {
    fn floor(&self, number: Floor) -> Option<FloorInfo> {
        (1..=30).contains(&number).then(|| FloorInfo {
            number,
            id: number.to_string(),
        })
    }
}

use Availability::{Available as A, Busy as B, Unusable as U};

fn pick(cars: &[(Floor, Availability)], origin: Floor, destination: Floor) -> Selection {
    let mut reg = Registry::default();
    for (i, (floor, availability)) in cars.iter().enumerate() {
        let id = i32::try_from(i).unwrap() + 1;
        reg.elevators.insert(
            id,
            Arc::new(Scripted {
                id,
                floor: *floor,
                availability: *availability,
                owner: Mutex::new(None),
            }),
        );
    }
    let reg = Arc::new(reg);
    let mut c = DispatchController::new(ControllerCfg::default(), reg.clone(), reg);
    for i in 1..=cars.len() {
        c.add_elevator(i32::try_from(i).unwrap()).unwrap();
    }
    c.find_closest_elevator(origin, destination)
}

#[rstest]
#[case::nearest_wins(&[(9, A), (4, A), (6, A)], Selection::Found(1))]
#[case::tie_keeps_first(&[(3, A), (7, A)], Selection::Found(0))]
#[case::available_beats_nearer_busy(&[(5, B), (20, A)], Selection::Found(1))]
#[case::farther_busy_keeps_busy_incumbent(&[(6, B), (12, B)], Selection::Found(0))]
#[case::nearer_busy_beats_available(&[(20, A), (5, B)], Selection::Found(1))]
#[case::unusable_skipped(&[(5, U), (9, B)], Selection::Found(1))]
#[case::all_unusable(&[(5, U), (9, U)], Selection::AllUnavailable)]
#[case::none_bound(&[], Selection::NoElevators)]
fn selection_rules(#[case] cars: &[(Floor, Availability)], #[case] expected: Selection) {
    assert_eq!(pick(cars, 5, 15), expected);
}

#[test]
fn committed_cars_do_not_count_as_unavailable() {
    let mut reg = Registry::default();
    for id in [1, 2] {
        reg.elevators.insert(
            id,
            Arc::new(Scripted {
                id,
                floor: 1,
                availability: if id == 1 { A } else { U },
                owner: Mutex::new(None),
            }),
        );
    }
    let reg = Arc::new(reg);
    let mut c = DispatchController::new(ControllerCfg::default(), reg.clone(), reg);
    c.add_elevator(1).unwrap();
    c.add_elevator(2).unwrap();
    c.assign_elevator(1, 30);
    assert_eq!(c.find_closest_elevator(2, 10), Selection::NoneQualified);
}
