#![no_main]
use std::sync::Arc;

use dispatch_building::{Building, ElevatorSpec};
use dispatch_core::{ControllerCfg, DispatchController};
use dispatch_traits::{Direction, ElevatorRegistry, FloorRegistry};
use libfuzzer_sys::arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;

#[derive(Debug, Arbitrary)]
enum Op {
    Request { origin: i8, destination: i8 },
    Remove { origin: i8, destination: i8 },
    Arrive { elevator: u8, floor: i8, up: bool },
    Tick,
    Step,
    Unbind { elevator: u8 },
    SetRange(i8),
    SetCap(u8),
}

fuzz_target!(|ops: Vec<Op>| {
    let building = Arc::new(Building::with_floors(-2, 12));
    for (id, start) in [(1, 0), (2, 6), (3, 12)] {
        let spec = ElevatorSpec {
            id,
            start_floor: start,
            serves: (-2, 12),
            skip: vec![3],
            cars: 1,
        };
        if building.add_elevator(spec).is_err() {
            return;
        }
    }
    let cfg = ControllerCfg {
        destination_dispatch: true,
        ..ControllerCfg::default()
    };
    let elevators: Arc<dyn ElevatorRegistry> = building.clone();
    let floors: Arc<dyn FloorRegistry> = building.clone();
    let Ok(mut c) = DispatchController::builder()
        .with_config(cfg)
        .with_elevator_registry(elevators)
        .with_floor_registry(floors)
        .with_elevators([1, 2, 3])
        .try_build()
    else {
        return;
    };

    for op in ops.into_iter().take(256) {
        match op {
            Op::Request { origin, destination } => {
                let _ = c.request_route(None, origin.into(), destination.into());
            }
            Op::Remove { origin, destination } => {
                c.remove_route(origin.into(), destination.into());
            }
            Op::Arrive { elevator, floor, up } => {
                let dir = if up { Direction::Up } else { Direction::Down };
                c.elevator_arrived(elevator.into(), floor.into(), dir);
            }
            Op::Tick => {
                c.tick();
            }
            Op::Step => {
                for ev in building.step() {
                    c.elevator_arrived(ev.elevator, ev.floor, ev.direction);
                }
            }
            Op::Unbind { elevator } => {
                let _ = c.remove_elevator(elevator.into());
            }
            Op::SetRange(r) => c.set_range(r.into()),
            Op::SetCap(n) => c.set_max_passengers(u32::from(n).max(1)),
        }
        // Lowering the cap later may leave older routes above it.
        for r in c.routes().iter() {
            assert_ne!(r.origin, r.destination);
            assert!(r.requests >= 1);
        }
    }
});
