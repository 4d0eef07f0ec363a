use std::sync::Arc;

use criterion::{BatchSize, Criterion, black_box, criterion_group, criterion_main};
use dispatch_building::{Building, ElevatorSpec};
use dispatch_core::{ControllerCfg, DispatchController};
use dispatch_traits::{Direction, ElevatorHandle, RouteKind};

const TOP: i32 = 120;

// Pool of `n` cars spread over the building, every third one busy.
fn pool(n: i32) -> (Arc<Building>, DispatchController) {
    let b = Building::with_floors(1, TOP);
    for id in 1..=n {
        let e = b
            .add_elevator(ElevatorSpec {
                id,
                start_floor: 1 + (id * 37) % TOP,
                serves: (1, TOP),
                skip: Vec::new(),
                cars: 1,
            })
            .unwrap();
        if id % 3 == 0 {
            e.add_route(TOP, Direction::Up, RouteKind::Direct).unwrap();
        }
    }
    let b = Arc::new(b);
    let c = DispatchController::builder()
        .with_config(ControllerCfg {
            destination_dispatch: true,
            ..ControllerCfg::default()
        })
        .with_elevator_registry(b.clone())
        .with_floor_registry(b.clone())
        .with_elevators(1..=n)
        .try_build()
        .unwrap();
    (b, c)
}

fn bench_find_closest(c: &mut Criterion) {
    for n in [8, 64, 256] {
        let (_b, ctl) = pool(n);
        c.bench_function(&format!("find_closest_{n}"), |bch| {
            bch.iter(|| black_box(ctl.find_closest_elevator(black_box(40), black_box(90))))
        });
    }
}

fn bench_tick(c: &mut Criterion) {
    c.bench_function("tick_32_routes_64_cars", |bch| {
        bch.iter_batched(
            || {
                let (b, mut ctl) = pool(64);
                for i in 0..32 {
                    let o = 1 + (i * 7) % TOP;
                    let d = 1 + (i * 13 + 50) % TOP;
                    let _ = ctl.request_route(None, o, d);
                }
                (b, ctl)
            },
            |(_b, mut ctl)| black_box(ctl.tick()),
            BatchSize::SmallInput,
        )
    });
}

criterion_group!(benches, bench_find_closest, bench_tick);
criterion_main!(benches);
