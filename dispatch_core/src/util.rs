//! Common time/period helpers for dispatch_core.

use std::time::Duration;

/// Shortest tick the scheduler will run at.
pub const MIN_TICK_MS: u64 = 1;

/// Tick period for a configured `tick_ms`, clamped to at least 1 ms.
#[inline]
pub fn tick_period(tick_ms: u64) -> Duration {
    Duration::from_millis(tick_ms.max(MIN_TICK_MS))
}

/// Floor distance, saturating instead of overflowing on extreme inputs.
#[inline]
pub fn floor_distance(a: i32, b: i32) -> u32 {
    a.abs_diff(b)
}
