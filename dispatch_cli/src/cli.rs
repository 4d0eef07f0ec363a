//! CLI argument definitions and shared statics.

use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;
use std::sync::OnceLock;

pub static FILE_GUARD: OnceLock<tracing_appender::non_blocking::WorkerGuard> = OnceLock::new();
/// Whether the user asked for JSON output (controls structured error output).
pub static JSON_MODE: OnceLock<bool> = OnceLock::new();

#[derive(Parser, Debug)]
#[command(name = "dispatch", version, about = "Elevator destination-dispatch CLI")]
pub struct Cli {
    /// Path to building config TOML
    #[arg(long, value_name = "FILE", default_value = "etc/dispatch.toml")]
    pub config: PathBuf,

    /// Print results and errors as JSON instead of text
    #[arg(long, action = ArgAction::SetTrue)]
    pub json: bool,

    /// Console log level (error|warn|info|debug|trace); overrides [logging].level
    #[arg(long = "log-level", value_name = "LEVEL")]
    pub log_level: Option<String>,

    /// Command to execute
    #[command(subcommand)]
    pub cmd: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Replay scripted trip requests against the configured building
    Simulate {
        /// Trip CSV with headers tick,station,controller,origin,destination
        #[arg(long, value_name = "FILE")]
        requests: PathBuf,
        /// Number of dispatch ticks to run
        #[arg(long, value_name = "N", default_value_t = 100)]
        ticks: u64,
        /// Run scheduler threads at the configured tick period instead of stepping
        #[arg(
            long,
            action = ArgAction::SetTrue,
            long_help = "Run one scheduler thread per controller at [scheduler].tick_ms and step the building on the same cadence.\n\nStops after --ticks ticks or on Ctrl-C. Results can differ slightly between runs because arrivals and ticks race, exactly as they would in a live building."
        )]
        realtime: bool,
    },
    /// Validate a single trip request against one controller
    Request {
        /// Controller number
        #[arg(long)]
        controller: i32,
        /// Origin floor
        #[arg(long, allow_hyphen_values = true)]
        origin: i32,
        /// Destination floor
        #[arg(long, allow_hyphen_values = true)]
        destination: i32,
    },
    /// Load the config and bind every controller's elevators
    SelfCheck,
}
