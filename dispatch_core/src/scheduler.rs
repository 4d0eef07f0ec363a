//! Periodic dispatch scheduling.
//!
//! Spawns one thread per controller that applies queued arrivals and runs
//! `tick()` at a fixed cadence. Arrivals and ticks take the same mutex, so
//! the binding and route tables only ever have one writer.
//!
//! Each `Scheduler` owns exactly one thread, stopped and joined on drop. A
//! tick in progress always runs to completion.
use crossbeam_channel as xch;
use dispatch_traits::ArrivalEvent;
use dispatch_traits::clock::{Clock, next_deadline};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use crate::config::SchedulerCfg;
use crate::controller::DispatchController;

pub type SharedController = Arc<Mutex<DispatchController>>;

/// Longest uninterrupted sleep; bounds how long shutdown can wait.
const SLEEP_SLICE: Duration = Duration::from_millis(20);

pub fn shared(controller: DispatchController) -> SharedController {
    Arc::new(Mutex::new(controller))
}

/// Lock a shared controller, recovering from a poisoned mutex.
pub fn lock(controller: &SharedController) -> MutexGuard<'_, DispatchController> {
    controller.lock().unwrap_or_else(|e: PoisonError<_>| {
        tracing::warn!("controller mutex poisoned; recovering");
        e.into_inner()
    })
}

pub struct Scheduler {
    tx: xch::Sender<ArrivalEvent>,
    ticks: Arc<AtomicU64>,
    shutdown: Arc<AtomicBool>,
    join_handle: Option<std::thread::JoinHandle<()>>,
}

impl Scheduler {
    pub fn spawn<C: Clock + Send + 'static>(
        controller: SharedController,
        cfg: SchedulerCfg,
        clock: C,
    ) -> Self {
        let (tx, rx) = xch::unbounded::<ArrivalEvent>();
        let shutdown = Arc::new(AtomicBool::new(false));
        let shutdown_clone = shutdown.clone();
        let ticks = Arc::new(AtomicU64::new(0));
        let ticks_clone = ticks.clone();
        let period = crate::util::tick_period(cfg.tick_ms);

        let join_handle = std::thread::spawn(move || {
            let mut deadline = clock.now();
            loop {
                if shutdown_clone.load(Ordering::Relaxed) {
                    tracing::debug!("scheduler thread received shutdown signal");
                    break;
                }

                {
                    let mut c = lock(&controller);
                    for ev in rx.try_iter() {
                        c.elevator_arrived(ev.elevator, ev.floor, ev.direction);
                    }
                    let out = c.tick();
                    let n = ticks_clone.fetch_add(1, Ordering::Relaxed) + 1;
                    tracing::trace!(
                        controller = c.number(),
                        tick = n,
                        pickups = out.pickups,
                        onward = out.onward,
                        "scheduled tick"
                    );
                }

                deadline = next_deadline(deadline, period, clock.now());
                while !shutdown_clone.load(Ordering::Relaxed) {
                    let now = clock.now();
                    if now >= deadline {
                        break;
                    }
                    clock.sleep((deadline - now).min(SLEEP_SLICE));
                }
            }
            tracing::trace!("scheduler thread exiting cleanly");
        });

        Self {
            tx,
            ticks,
            shutdown,
            join_handle: Some(join_handle),
        }
    }

    /// Sender for the elevator subsystem; arrivals apply before the next tick.
    pub fn arrival_sender(&self) -> xch::Sender<ArrivalEvent> {
        self.tx.clone()
    }

    /// Ticks completed so far.
    pub fn tick_count(&self) -> u64 {
        self.ticks.load(Ordering::Relaxed)
    }
}

impl Drop for Scheduler {
    fn drop(&mut self) {
        self.shutdown.store(true, Ordering::Relaxed);
        if let Some(handle) = self.join_handle.take() {
            match handle.join() {
                Ok(()) => {
                    tracing::trace!("scheduler thread joined successfully");
                }
                Err(e) => {
                    tracing::warn!(?e, "scheduler thread panicked during shutdown");
                }
            }
        }
    }
}
