//! Scripted dispatch runs: stepped (deterministic) and real-time.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;

use dispatch_config::TripRequest;
use dispatch_core::scheduler::{self, Scheduler, SharedController};
use dispatch_core::{DispatchController, DispatchError, SchedulerCfg, TickOutcome};
use dispatch_traits::clock::{Clock, MonotonicClock, next_deadline};
use dispatch_traits::{
    ArrivalEvent, CallStation, ControllerId, ElevatorRegistry, StationId,
};
use serde_json::json;

use crate::plant::Plant;

#[derive(Debug, Default, Clone, Copy)]
pub struct ControllerStats {
    pub accepted: u64,
    pub rejected: u64,
    pub pickups: u64,
    pub onward: u64,
    pub completed: u64,
    pub pending: u64,
}

impl ControllerStats {
    fn add_tick(&mut self, out: TickOutcome) {
        self.pickups += out.pickups as u64;
        self.onward += out.onward as u64;
    }
}

#[derive(Debug, Default)]
pub struct Summary {
    pub ticks: u64,
    pub controllers: BTreeMap<ControllerId, ControllerStats>,
    /// Rejection reason -> count.
    pub rejections: BTreeMap<String, u64>,
    pub indicators: BTreeMap<i32, Option<i32>>,
}

impl Summary {
    fn stats(&mut self, number: ControllerId) -> &mut ControllerStats {
        self.controllers.entry(number).or_default()
    }

    fn reject(&mut self, number: ControllerId, reason: String) {
        self.stats(number).rejected += 1;
        *self.rejections.entry(reason).or_default() += 1;
    }

    pub fn accepted(&self) -> u64 {
        self.controllers.values().map(|s| s.accepted).sum()
    }

    pub fn rejected(&self) -> u64 {
        self.controllers.values().map(|s| s.rejected).sum()
    }

    pub fn to_json(&self) -> serde_json::Value {
        let controllers: Vec<_> = self
            .controllers
            .iter()
            .map(|(n, s)| {
                json!({
                    "number": n,
                    "accepted": s.accepted,
                    "rejected": s.rejected,
                    "pickups": s.pickups,
                    "onward": s.onward,
                    "completed": s.completed,
                    "pending": s.pending,
                })
            })
            .collect();
        let indicators: BTreeMap<String, Option<i32>> = self
            .indicators
            .iter()
            .map(|(k, v)| (k.to_string(), *v))
            .collect();
        json!({
            "ticks": self.ticks,
            "accepted": self.accepted(),
            "rejected": self.rejected(),
            "rejections": self.rejections,
            "controllers": controllers,
            "indicators": indicators,
        })
    }

    pub fn print_human(&self) {
        println!(
            "Ran {} ticks: {} requests accepted, {} rejected",
            self.ticks,
            self.accepted(),
            self.rejected()
        );
        for (n, s) in &self.controllers {
            println!(
                "  controller {n}: pickups={} onward={} completed={} pending={}",
                s.pickups, s.onward, s.completed, s.pending
            );
        }
        for (reason, count) in &self.rejections {
            println!("  rejected x{count}: {reason}");
        }
    }
}

fn rejection_reason(err: &DispatchError) -> String {
    match err {
        DispatchError::Rejected(r) => r.to_string(),
        other => other.to_string(),
    }
}

/// Route an arrival to the controller that owns the elevator.
fn owner_of(registry: &dyn ElevatorRegistry, ev: &ArrivalEvent) -> Option<ControllerId> {
    registry
        .elevator(ev.elevator)
        .and_then(|e| e.controller())
}

fn submit(plant: &mut Plant, summary: &mut Summary, r: &TripRequest) {
    if plant.controller_mut(r.controller).is_none() {
        summary.reject(r.controller, format!("unknown controller {}", r.controller));
        return;
    }
    let kiosk = plant.kiosk(r.station, r.controller);
    let Some(c) = plant.controller_mut(r.controller) else {
        return;
    };
    match c.request_route(Some(&kiosk), r.origin, r.destination) {
        Ok(()) => summary.stats(r.controller).accepted += 1,
        Err(e) => summary.reject(r.controller, rejection_reason(&e)),
    }
}

/// Deterministic run: each tick submits due requests, ticks every
/// controller, then steps the building and delivers its arrivals.
pub fn run_stepped(mut plant: Plant, requests: &[TripRequest], ticks: u64) -> Summary {
    let mut summary = Summary {
        ticks,
        ..Summary::default()
    };
    for c in &plant.controllers {
        summary.stats(c.number());
    }
    let mut due = requests.iter().peekable();

    for t in 0..ticks {
        while let Some(r) = due.next_if(|r| r.tick <= t) {
            submit(&mut plant, &mut summary, r);
        }
        for c in &mut plant.controllers {
            let out = c.tick();
            summary.stats(c.number()).add_tick(out);
        }
        for ev in plant.building.step() {
            let Some(owner) = owner_of(&*plant.building, &ev) else {
                continue;
            };
            let Some(c) = plant.controller_mut(owner) else {
                continue;
            };
            let completed = c.is_elevator_assigned(ev.elevator, ev.floor);
            c.elevator_arrived(ev.elevator, ev.floor, ev.direction);
            if completed && !c.is_elevator_assigned(ev.elevator, ev.floor) {
                summary.stats(owner).completed += 1;
            }
        }
    }

    finish(&mut summary, &plant.controllers);
    summary.indicators = plant.indicators();
    summary
}

fn finish(summary: &mut Summary, controllers: &[DispatchController]) {
    for c in controllers {
        summary.stats(c.number()).pending = c.routes().len() as u64;
    }
}

/// Real-time run: one scheduler thread per controller; the building steps on
/// this thread at the same cadence and feeds arrivals through the channels.
pub fn run_realtime(
    mut plant: Plant,
    requests: &[TripRequest],
    ticks: u64,
    cfg: SchedulerCfg,
    shutdown: &Arc<AtomicBool>,
) -> Summary {
    let mut summary = Summary::default();
    // Kiosks are registered before the controllers move into shared handles.
    let stations: BTreeMap<StationId, Arc<dyn CallStation>> = requests
        .iter()
        .map(|r| (r.station, plant.kiosk(r.station, r.controller)))
        .collect();
    let (building, controllers, kiosks) = plant.into_parts();

    let shared: BTreeMap<ControllerId, SharedController> = controllers
        .into_iter()
        .map(|c| (c.number(), scheduler::shared(c)))
        .collect();
    for n in shared.keys() {
        summary.stats(*n);
    }
    let schedulers: BTreeMap<ControllerId, Scheduler> = shared
        .iter()
        .map(|(n, c)| (*n, Scheduler::spawn(c.clone(), cfg, MonotonicClock::new())))
        .collect();

    let clock = MonotonicClock::new();
    let period = dispatch_core::util::tick_period(cfg.tick_ms);
    let started = Instant::now();
    let mut deadline = clock.now();
    let mut due = requests.iter().peekable();
    let mut t = 0;
    while t < ticks && !shutdown.load(Ordering::Relaxed) {
        while let Some(r) = due.next_if(|r| r.tick <= t) {
            let Some(c) = shared.get(&r.controller) else {
                summary.reject(r.controller, format!("unknown controller {}", r.controller));
                continue;
            };
            let kiosk = stations.get(&r.station);
            match scheduler::lock(c).request_route(kiosk, r.origin, r.destination) {
                Ok(()) => summary.stats(r.controller).accepted += 1,
                Err(e) => summary.reject(r.controller, rejection_reason(&e)),
            }
        }
        for ev in building.step() {
            let Some(owner) = owner_of(&*building, &ev) else {
                continue;
            };
            let (Some(c), Some(s)) = (shared.get(&owner), schedulers.get(&owner)) else {
                continue;
            };
            if scheduler::lock(c).is_elevator_assigned(ev.elevator, ev.floor) {
                summary.stats(owner).completed += 1;
            }
            if s.arrival_sender().send(ev).is_err() {
                tracing::warn!(controller = owner, "scheduler gone; arrival dropped");
            }
        }
        t += 1;
        deadline = next_deadline(deadline, period, clock.now());
        clock.sleep_until(deadline);
    }
    if shutdown.load(Ordering::Relaxed) {
        tracing::info!(tick = t, "interrupted");
    }

    for (n, s) in &schedulers {
        tracing::debug!(controller = n, ticks = s.tick_count(), "scheduler stopping");
    }
    drop(schedulers);
    summary.ticks = t;
    for (n, c) in &shared {
        summary.stats(*n).pending = scheduler::lock(c).routes().len() as u64;
    }
    summary.indicators = crate::plant::indicators(&kiosks);
    tracing::debug!(elapsed_ms = started.elapsed().as_millis() as u64, "realtime run done");
    summary
}
