mod cli;
mod error_fmt;
mod plant;
mod simulate;

use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use clap::Parser;
use dispatch_core::SchedulerCfg;
use eyre::WrapErr;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer, Registry, fmt};

use crate::cli::{Cli, Commands, FILE_GUARD, JSON_MODE};
use crate::error_fmt::{exit_code_for_error, format_error_json, humanize};

fn main() {
    let cli = Cli::parse();
    let _ = JSON_MODE.set(cli.json);

    if let Err(e) = run(cli) {
        if JSON_MODE.get().copied().unwrap_or(false) {
            eprintln!("{}", format_error_json(&e));
        } else {
            eprintln!("{}", humanize(&e));
        }
        std::process::exit(exit_code_for_error(&e));
    }
}

fn load_config(path: &Path) -> eyre::Result<dispatch_config::Config> {
    let text = std::fs::read_to_string(path)
        .wrap_err_with(|| format!("read config {}", path.display()))?;
    let cfg = dispatch_config::load_toml(&text)
        .wrap_err_with(|| format!("parse config {}", path.display()))?;
    cfg.validate()?;
    Ok(cfg)
}

fn env_filter(level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level))
}

fn init_tracing(json: bool, level: &str, logging: &dispatch_config::Logging) -> eyre::Result<()> {
    let mut layers: Vec<Box<dyn Layer<Registry> + Send + Sync>> = Vec::new();

    // Console logs go to stderr so stdout stays clean for results.
    let console = if json {
        fmt::layer()
            .json()
            .with_writer(std::io::stderr)
            .with_filter(env_filter(level))
            .boxed()
    } else {
        fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(false)
            .with_filter(env_filter(level))
            .boxed()
    };
    layers.push(console);

    if let Some(file) = logging.file.as_deref() {
        let path = Path::new(file);
        let dir = path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        let name = path
            .file_name()
            .ok_or_else(|| eyre::eyre!("logging.file must name a file: {file}"))?;
        let appender = match logging.rotation.as_deref() {
            Some("daily") => tracing_appender::rolling::daily(dir, name),
            Some("hourly") => tracing_appender::rolling::hourly(dir, name),
            _ => tracing_appender::rolling::never(dir, name),
        };
        let (writer, guard) = tracing_appender::non_blocking(appender);
        let _ = FILE_GUARD.set(guard);
        let file_level = logging.level.as_deref().unwrap_or(level);
        layers.push(
            fmt::layer()
                .json()
                .with_ansi(false)
                .with_writer(writer)
                .with_filter(env_filter(file_level))
                .boxed(),
        );
    }

    tracing_subscriber::registry().with(layers).try_init()?;
    Ok(())
}

fn run(cli: Cli) -> eyre::Result<()> {
    if !cli.json {
        color_eyre::install()?;
    }
    let cfg = load_config(&cli.config)?;
    let level = cli
        .log_level
        .clone()
        .or_else(|| cfg.logging.level.clone())
        .unwrap_or_else(|| "warn".to_string());
    init_tracing(cli.json, &level, &cfg.logging)?;

    match cli.cmd {
        Commands::Simulate {
            requests,
            ticks,
            realtime,
        } => {
            let trips = dispatch_config::load_requests_csv(&requests)?;
            let plant = plant::assemble(&cfg)?;
            tracing::info!(trips = trips.len(), ticks, realtime, "simulation starting");
            let summary = if realtime {
                let shutdown = Arc::new(AtomicBool::new(false));
                let flag = shutdown.clone();
                if let Err(e) = ctrlc::set_handler(move || flag.store(true, Ordering::Relaxed)) {
                    tracing::warn!(error = %e, "failed to install Ctrl-C handler");
                }
                let sched = SchedulerCfg::from(&cfg.scheduler);
                simulate::run_realtime(plant, &trips, ticks, sched, &shutdown)
            } else {
                simulate::run_stepped(plant, &trips, ticks)
            };
            if cli.json {
                println!("{}", summary.to_json());
            } else {
                summary.print_human();
            }
        }
        Commands::Request {
            controller,
            origin,
            destination,
        } => {
            let mut plant = plant::assemble(&cfg)?;
            let c = plant
                .controller_mut(controller)
                .ok_or_else(|| eyre::eyre!("unknown controller {controller}"))?;
            c.request_route(None, origin, destination)
                .map_err(eyre::Report::new)?;
            if cli.json {
                println!(
                    "{}",
                    serde_json::json!({
                        "status": "accepted",
                        "controller": controller,
                        "origin": origin,
                        "destination": destination,
                        "pending": c.pending_routes().count(),
                    })
                );
            } else {
                println!("accepted: controller {controller} route {origin} -> {destination}");
            }
        }
        Commands::SelfCheck => {
            let plant = plant::assemble(&cfg)?;
            let elevators = plant.building.elevator_ids().len();
            let controllers = plant.controllers.len();
            if cli.json {
                println!(
                    "{}",
                    serde_json::json!({
                        "status": "ok",
                        "controllers": controllers,
                        "elevators": elevators,
                    })
                );
            } else {
                println!("OK: {controllers} controllers, {elevators} elevators");
            }
        }
    }
    Ok(())
}
