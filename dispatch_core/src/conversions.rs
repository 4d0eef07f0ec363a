//! `From` implementations bridging `dispatch_config` types to `dispatch_core` types.

use crate::config::{ControllerCfg, SchedulerCfg};

// ── ControllerCfg ────────────────────────────────────────────────────────────

impl From<&dispatch_config::ControllerToml> for ControllerCfg {
    fn from(c: &dispatch_config::ControllerToml) -> Self {
        Self {
            number: c.number,
            range: c.range,
            max_passengers: c.max_passengers,
            destination_dispatch: c.destination_dispatch,
            hybrid: c.hybrid,
        }
    }
}

// ── SchedulerCfg ─────────────────────────────────────────────────────────────

impl From<&dispatch_config::SchedulerToml> for SchedulerCfg {
    fn from(c: &dispatch_config::SchedulerToml) -> Self {
        Self { tick_ms: c.tick_ms }
    }
}
