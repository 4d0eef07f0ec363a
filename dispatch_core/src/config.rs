//! Configuration types for the dispatch engine.
//!
//! These are the runtime structs used by `DispatchController` and `Scheduler`.
//! They are separate from the TOML-deserialized config in `dispatch_config`.

use dispatch_traits::ControllerId;

/// Per-controller dispatch policy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControllerCfg {
    /// Controller number; stamped onto every bound elevator.
    pub number: ControllerId,
    /// Max distance (floors) between a car's committed destination and a new
    /// destination before the car counts as committed elsewhere. Default: 5.
    pub range: i32,
    /// Requests merged into one route before a second route is opened. Default: 5.
    pub max_passengers: u32,
    /// Accept destination-dispatch trips.
    pub destination_dispatch: bool,
    /// Run conventional hall-call processing alongside destination dispatch.
    pub hybrid: bool,
}

impl Default for ControllerCfg {
    fn default() -> Self {
        Self {
            number: 1,
            range: 5,
            max_passengers: 5,
            destination_dispatch: false,
            hybrid: false,
        }
    }
}

/// Tick cadence for the scheduler thread.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SchedulerCfg {
    pub tick_ms: u64,
}

impl Default for SchedulerCfg {
    fn default() -> Self {
        Self { tick_ms: 1000 }
    }
}
