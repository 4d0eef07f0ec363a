#![cfg_attr(all(not(debug_assertions), not(test)), deny(warnings))]
#![cfg_attr(
    all(not(debug_assertions), not(test)),
    deny(clippy::all, clippy::pedantic, clippy::nursery)
)]
#![allow(clippy::module_name_repetitions, clippy::missing_errors_doc)]
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
//! Destination-dispatch engine (building-agnostic).
//!
//! All elevator and floor access goes through the `dispatch_traits`
//! registries; the controller holds identifiers, never the entities.
//!
//! ## Architecture
//!
//! - **Routes**: pending trips in arrival order (`route` module)
//! - **Bindings**: per-elevator arrival and assignment state (`assignment` module)
//! - **Selection**: closest usable car for a trip (`selector` module)
//! - **Controller**: request intake, the tick pass, dispatch commands (`controller` module)
//! - **Scheduling**: fixed-cadence tick thread with an arrival channel (`scheduler` module)

pub mod assignment;
pub mod builder;
pub mod collab_error;
pub mod config;
pub mod controller;
pub mod conversions;
pub mod error;
pub mod mocks;
pub mod route;
pub mod scheduler;
pub mod selector;
pub mod util;

pub use assignment::{Arrival, AssignmentMap, ElevatorBinding};
pub use builder::ControllerBuilder;
pub use config::{ControllerCfg, SchedulerCfg};
pub use controller::{DispatchController, TickOutcome, route_kind};
pub use error::{BuildError, DispatchError, DispatchResult, Result, RouteRejection};
pub use route::{Admission, Route, RouteTable};
pub use scheduler::{Scheduler, SharedController};
pub use selector::Selection;
