//! Request intake: rejection reasons in check order, merging and the passenger cap.

use std::sync::Arc;

use dispatch_building::{Building, ElevatorSpec};
use dispatch_core::{ControllerCfg, DispatchController, DispatchError, RouteRejection};
use rstest::rstest;

fn spec(id: i32, serves: (i32, i32), skip: Vec<i32>) -> ElevatorSpec {
    ElevatorSpec {
        id,
        start_floor: serves.0,
        serves,
        skip,
        cars: 1,
    }
}

/// Floors 1..=12; elevator 1 serves 1..=10 but skips 5, elevator 2 serves 1..=3.
fn setup(dd: bool, ids: &[i32], max_passengers: u32) -> (Arc<Building>, DispatchController) {
    let b = Building::with_floors(1, 12);
    b.add_elevator(spec(1, (1, 10), vec![5])).unwrap();
    b.add_elevator(spec(2, (1, 3), Vec::new())).unwrap();
    let b = Arc::new(b);
    let c = DispatchController::builder()
        .with_config(ControllerCfg {
            number: 4,
            destination_dispatch: dd,
            max_passengers,
            ..ControllerCfg::default()
        })
        .with_elevator_registry(b.clone())
        .with_floor_registry(b.clone())
        .with_elevators(ids.iter().copied())
        .try_build()
        .unwrap();
    (b, c)
}

#[rstest]
#[case::disabled(false, 5, 5, RouteRejection::DestinationDispatchDisabled)]
#[case::disabled_beats_same_floor(false, 1, 2, RouteRejection::DestinationDispatchDisabled)]
#[case::same(true, 5, 5, RouteRejection::SameFloor)]
#[case::bad_origin(true, 0, 4, RouteRejection::InvalidFloor(0))]
#[case::bad_destination(true, 4, 40, RouteRejection::InvalidFloor(40))]
#[case::express_origin(true, 5, 2, RouteRejection::NoServicingElevator(5))]
#[case::above_shaft(true, 2, 12, RouteRejection::NoServicingElevator(12))]
fn rejections_follow_check_order(
    #[case] dd: bool,
    #[case] origin: i32,
    #[case] destination: i32,
    #[case] expected: RouteRejection,
) {
    let (_b, mut c) = setup(dd, &[1, 2], 5);
    assert_eq!(
        c.request_route(None, origin, destination),
        Err(DispatchError::Rejected(expected))
    );
    assert!(c.routes().is_empty());
}

#[test]
fn deleted_elevators_leave_no_valid_elevator() {
    let (b, mut c) = setup(true, &[1], 5);
    b.remove_elevator(1);
    assert_eq!(
        c.request_route(None, 1, 4),
        Err(DispatchError::Rejected(RouteRejection::NoValidElevators))
    );
}

#[test]
fn serviced_floor_needs_a_stop_on_a_bound_elevator() {
    let (_b, c) = setup(true, &[2], 5);
    assert!(c.is_serviced_floor(3));
    assert!(!c.is_serviced_floor(4));
    assert_eq!(c.floor_range(), Some((1, 3)));
}

#[test]
fn duplicates_merge_up_to_the_cap_for_a_single_car() {
    let (_b, mut c) = setup(true, &[1], 3);
    for _ in 0..7 {
        c.request_route(None, 1, 8).unwrap();
    }
    let routes: Vec<_> = c.routes().iter().map(|r| r.requests).collect();
    assert_eq!(routes, vec![3]);
}

#[test]
fn full_route_overflows_when_several_cars_are_bound() {
    let (_b, mut c) = setup(true, &[1, 2], 2);
    for _ in 0..5 {
        c.request_route(None, 1, 3).unwrap();
    }
    let routes: Vec<_> = c.routes().iter().map(|r| r.requests).collect();
    assert_eq!(routes, vec![2, 2, 1]);
}

#[test]
fn remove_route_is_idempotent() {
    let (_b, mut c) = setup(true, &[1], 5);
    c.request_route(None, 1, 8).unwrap();
    c.request_route(None, 8, 1).unwrap();
    assert!(c.remove_route(1, 8));
    assert!(!c.remove_route(1, 8));
    assert_eq!(c.routes().len(), 1);
}

#[test]
fn request_after_pickup_opens_a_fresh_route() {
    let (_b, mut c) = setup(true, &[1], 5);
    c.request_route(None, 1, 8).unwrap();
    c.tick();
    c.request_route(None, 1, 8).unwrap();
    let flags: Vec<_> = c.routes().iter().map(|r| (r.processed, r.requests)).collect();
    assert_eq!(flags, vec![(true, 1), (false, 1)]);
}
