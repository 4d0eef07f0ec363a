//! Scheduler thread lifecycle and arrival delivery.
//!
//! Verifies that:
//! - ticks run at the configured cadence and stop when the scheduler drops
//! - arrivals sent through the channel are applied before the next tick
//! - other threads can drive the shared controller between ticks

use std::sync::Arc;
use std::time::{Duration, Instant};

use dispatch_building::{Building, ElevatorSpec};
use dispatch_core::scheduler::{self, Scheduler};
use dispatch_core::{ControllerCfg, DispatchController, SchedulerCfg};
use dispatch_traits::clock::MonotonicClock;
use dispatch_traits::ArrivalEvent;

fn shared() -> (Arc<Building>, scheduler::SharedController) {
    let b = Building::with_floors(1, 10);
    b.add_elevator(ElevatorSpec {
        id: 1,
        start_floor: 1,
        serves: (1, 10),
        skip: Vec::new(),
        cars: 1,
    })
    .unwrap();
    let b = Arc::new(b);
    let c = DispatchController::builder()
        .with_config(ControllerCfg {
            destination_dispatch: true,
            ..ControllerCfg::default()
        })
        .with_elevator_registry(b.clone())
        .with_floor_registry(b.clone())
        .with_elevators([1])
        .try_build()
        .unwrap();
    (b, scheduler::shared(c))
}

fn wait_for(deadline: Duration, mut f: impl FnMut() -> bool) -> bool {
    let start = Instant::now();
    while start.elapsed() < deadline {
        if f() {
            return true;
        }
        std::thread::sleep(Duration::from_millis(5));
    }
    f()
}

#[test]
fn ticks_stop_after_drop() {
    let (_b, c) = shared();
    let s = Scheduler::spawn(c, SchedulerCfg { tick_ms: 10 }, MonotonicClock::new());
    assert!(wait_for(Duration::from_secs(2), || s.tick_count() >= 3));
    drop(s);
    // Drop joined the thread; reaching here without hanging is the check.
}

#[test]
fn drop_is_prompt_with_a_long_period() {
    let (_b, c) = shared();
    let s = Scheduler::spawn(c, SchedulerCfg { tick_ms: 60_000 }, MonotonicClock::new());
    assert!(wait_for(Duration::from_secs(2), || s.tick_count() >= 1));
    let start = Instant::now();
    drop(s);
    assert!(start.elapsed() < Duration::from_secs(2));
}

#[test]
fn arrivals_flow_through_the_channel() {
    let (b, c) = shared();
    let s = Scheduler::spawn(c.clone(), SchedulerCfg { tick_ms: 5 }, MonotonicClock::new());

    scheduler::lock(&c).request_route(None, 1, 8).unwrap();
    assert!(wait_for(Duration::from_secs(2), || {
        !b.issued_routes(1).unwrap().is_empty()
    }));

    let tx = s.arrival_sender();
    tx.send(ArrivalEvent {
        elevator: 1,
        floor: 1,
        direction: dispatch_traits::Direction::Up,
    })
    .unwrap();
    assert!(wait_for(Duration::from_secs(2), || {
        b.issued_routes(1).unwrap().iter().any(|r| r.floor == 8)
    }));
    assert!(wait_for(Duration::from_secs(2), || scheduler::lock(&c)
        .routes()
        .is_empty()));
    drop(s);
}

#[test]
fn multiple_schedulers_dont_leak_threads() {
    for _ in 0..10 {
        let (_b, c) = shared();
        let s = Scheduler::spawn(c, SchedulerCfg { tick_ms: 1 }, MonotonicClock::new());
        std::thread::sleep(Duration::from_millis(5));
        drop(s);
    }
}
