use dispatch_building::{Building, BuildingError, ElevatorSpec, ServiceMode};
use dispatch_traits::{
    Availability, Direction, ElevatorHandle, ElevatorRegistry, FloorRegistry, RouteKind,
};
use rstest::{fixture, rstest};

fn spec(id: i32, start: i32) -> ElevatorSpec {
    ElevatorSpec {
        id,
        start_floor: start,
        serves: (1, 10),
        skip: Vec::new(),
        cars: 1,
    }
}

#[fixture]
fn building() -> Building {
    let b = Building::with_floors(1, 10);
    b.add_elevator(spec(1, 1)).expect("install 1");
    b.add_elevator(spec(2, 6)).expect("install 2");
    b
}

#[rstest]
fn lookups_resolve_until_removed(building: Building) {
    assert!(building.elevator(1).is_some());
    let held = building.elevator(2).expect("handle");
    assert!(building.remove_elevator(2).is_some());
    assert!(building.elevator(2).is_none());
    // A handle obtained earlier still answers.
    assert_eq!(held.id(), 2);
}

#[rstest]
fn duplicate_and_out_of_building_elevators_are_rejected(building: Building) {
    assert_eq!(
        building.add_elevator(spec(1, 1)).err(),
        Some(BuildingError::DuplicateElevator(1))
    );
    let tall = ElevatorSpec {
        serves: (1, 12),
        ..spec(3, 1)
    };
    assert_eq!(
        building.add_elevator(tall).err(),
        Some(BuildingError::UnknownFloor(12))
    );
}

#[rstest]
fn floors_resolve_with_labels() {
    let b = Building::new();
    b.add_floor(0, "L");
    assert_eq!(b.floor(0).map(|f| f.id), Some("L".to_string()));
    assert!(b.remove_floor(0));
    assert!(b.floor(0).is_none());
}

#[rstest]
fn step_delivers_arrivals_in_id_order(building: Building) {
    let e1 = building.elevator(1).unwrap();
    let e2 = building.elevator(2).unwrap();
    e1.add_route(1, Direction::Up, RouteKind::PickupCall).unwrap();
    e2.add_route(6, Direction::Down, RouteKind::PickupCall).unwrap();

    let arrivals = building.step();
    let ids: Vec<i32> = arrivals.iter().map(|a| a.elevator).collect();
    assert_eq!(ids, vec![1, 2]);
    assert!(building.step().is_empty());
}

#[rstest]
fn add_route_fails_when_out_of_service(building: Building) {
    let sim = building.sim_elevator(1).unwrap();
    sim.set_mode(ServiceMode::Independent);
    let handle = building.elevator(1).unwrap();
    let err = handle
        .add_route(4, Direction::Up, RouteKind::Direct)
        .expect_err("independent service refuses routes");
    assert!(err.to_string().contains("out of service"));
    assert_eq!(
        handle.availability_for(4, Direction::Up, true),
        Availability::Unusable
    );
}

#[rstest]
fn busy_while_routes_are_queued(building: Building) {
    let handle = building.elevator(1).unwrap();
    assert_eq!(
        handle.availability_for(3, Direction::Up, true),
        Availability::Available
    );
    handle.add_route(8, Direction::Up, RouteKind::Direct).unwrap();
    assert_eq!(
        handle.availability_for(3, Direction::Up, true),
        Availability::Busy
    );
    // Non-exclusive calls on the way are still welcome.
    assert_eq!(
        handle.availability_for(3, Direction::Up, false),
        Availability::Available
    );
}

#[rstest]
fn issued_log_records_every_command(building: Building) {
    let handle = building.elevator(1).unwrap();
    handle.add_route(4, Direction::Up, RouteKind::PickupCall).unwrap();
    handle.add_route(4, Direction::Up, RouteKind::PickupCall).unwrap();
    let log = building.issued_routes(1).unwrap();
    assert_eq!(log.len(), 2);
    assert_eq!(building.sim_elevator(1).unwrap().queued().len(), 1);
    assert_eq!(
        building.issued_routes(9).err(),
        Some(BuildingError::UnknownElevator(9))
    );
}
