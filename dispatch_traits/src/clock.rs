use std::thread;
use std::time::{Duration, Instant};

/// Monotonic time source that paces the dispatch tick.
///
/// - now(): current monotonic Instant
/// - sleep(): block for a duration (test clocks may only advance virtual time)
/// - sleep_until(): block until a deadline, returning immediately if it has passed
pub trait Clock {
    fn now(&self) -> Instant;
    fn sleep(&self, d: Duration);

    fn sleep_until(&self, deadline: Instant) {
        let now = self.now();
        if deadline > now {
            self.sleep(deadline - now);
        }
    }

    /// Milliseconds elapsed since `epoch`, saturating at 0 on underflow.
    fn ms_since(&self, epoch: Instant) -> u64 {
        let dur = self.now().saturating_duration_since(epoch);
        u64::try_from(dur.as_millis()).unwrap_or(u64::MAX)
    }
}

/// Next tick deadline after `prev`.
///
/// Keeps a fixed cadence from `prev`; if the caller has fallen more than one
/// period behind, the schedule restarts from `now` instead of bursting.
#[inline]
pub fn next_deadline(prev: Instant, period: Duration, now: Instant) -> Instant {
    let next = prev + period;
    if next + period < now { now } else { next }
}

/// Real-time clock backed by `std::time::Instant`.
#[derive(Debug, Default, Clone, Copy)]
pub struct MonotonicClock;

impl MonotonicClock {
    #[inline]
    pub fn new() -> Self {
        Self
    }
}

impl Clock for MonotonicClock {
    #[inline]
    fn now(&self) -> Instant {
        Instant::now()
    }

    #[inline]
    fn sleep(&self, d: Duration) {
        if d.is_zero() {
            return;
        }
        thread::sleep(d);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    /// Virtual clock: sleeping advances time without blocking.
    #[derive(Debug, Clone)]
    struct ManualClock {
        origin: Instant,
        offset: Arc<Mutex<Duration>>,
    }

    impl ManualClock {
        fn new() -> Self {
            Self {
                origin: Instant::now(),
                offset: Arc::new(Mutex::new(Duration::ZERO)),
            }
        }
    }

    impl Clock for ManualClock {
        fn now(&self) -> Instant {
            let off = self.offset.lock().map(|g| *g).unwrap_or(Duration::ZERO);
            self.origin + off
        }

        fn sleep(&self, d: Duration) {
            if let Ok(mut off) = self.offset.lock() {
                *off = off.saturating_add(d);
            }
        }
    }

    #[test]
    fn sleep_until_advances_to_deadline() {
        let clock = ManualClock::new();
        let start = clock.now();
        clock.sleep_until(start + Duration::from_millis(250));
        assert_eq!(clock.ms_since(start), 250);
        // Past deadlines do not move time backwards or forwards.
        clock.sleep_until(start);
        assert_eq!(clock.ms_since(start), 250);
    }

    #[test]
    fn next_deadline_keeps_cadence_and_resyncs_when_far_behind() {
        let t0 = Instant::now();
        let p = Duration::from_millis(100);
        assert_eq!(next_deadline(t0, p, t0 + Duration::from_millis(40)), t0 + p);
        let late = t0 + Duration::from_millis(500);
        assert_eq!(next_deadline(t0, p, late), late);
    }
}
