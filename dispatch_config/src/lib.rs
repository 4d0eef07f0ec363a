#![cfg_attr(all(not(debug_assertions), not(test)), deny(warnings))]
#![cfg_attr(
    all(not(debug_assertions), not(test)),
    deny(clippy::all, clippy::pedantic, clippy::nursery)
)]
#![allow(clippy::module_name_repetitions, clippy::missing_errors_doc)]
//! Config schemas and scripted-trip parsing for the dispatch system.
//!
//! - `Config` and sub-structs are deserialized from TOML and validated.
//! - The trip CSV loader enforces exact headers and reports the first bad row.
use serde::Deserialize;
use serde::de::Deserializer;
use std::collections::{BTreeMap, BTreeSet};

/// Scripted trip request.
///
/// Expected headers:
/// tick,station,controller,origin,destination
///
/// Example:
/// tick,station,controller,origin,destination
/// 0,1,1,1,8
/// 3,2,1,12,1
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
pub struct TripRequest {
    pub tick: u64,
    pub station: i32,
    pub controller: i32,
    pub origin: i32,
    pub destination: i32,
}

#[derive(Debug, Deserialize, Clone)]
pub struct FloorName {
    pub floor: i32,
    pub id: String,
}

#[derive(Debug, Deserialize)]
pub struct BuildingCfg {
    pub bottom_floor: i32,
    pub top_floor: i32,
    /// Optional display labels; unnamed floors use their number.
    #[serde(default)]
    pub floor_names: Vec<FloorName>,
}

#[derive(Debug, Deserialize)]
pub struct ElevatorToml {
    pub id: i32,
    pub start_floor: i32,
    /// Inclusive served range. Accepts either:
    /// - a tuple: [1, 20]
    /// - a table: { from = 1, to = 20 }
    #[serde(deserialize_with = "de_serves")]
    pub serves: (i32, i32),
    /// Express floors inside `serves` where the elevator does not stop.
    #[serde(default)]
    pub skip: Vec<i32>,
    /// Number of stacked cars (2 = double-deck).
    #[serde(default = "default_cars")]
    pub cars: u32,
}

fn default_cars() -> u32 {
    1
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ControllerToml {
    pub number: i32,
    pub elevators: Vec<i32>,
    pub destination_dispatch: bool,
    /// Run classic hall-call processing alongside destination dispatch.
    pub hybrid: bool,
    /// Max distance between committed and requested destinations before a car
    /// counts as busy elsewhere.
    pub range: i32,
    pub max_passengers: u32,
}

impl Default for ControllerToml {
    fn default() -> Self {
        Self {
            number: 0,
            elevators: Vec::new(),
            destination_dispatch: false,
            hybrid: false,
            range: 5,
            max_passengers: 5,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct SchedulerToml {
    /// Dispatch tick period.
    pub tick_ms: u64,
}

impl Default for SchedulerToml {
    fn default() -> Self {
        Self { tick_ms: 1000 }
    }
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct Logging {
    pub file: Option<String>,  // path to .log (JSON lines)
    pub level: Option<String>, // "info","debug"
    /// Log rotation policy: "never" | "daily" | "hourly" (default: never)
    pub rotation: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct Config {
    pub building: BuildingCfg,
    pub elevators: Vec<ElevatorToml>,
    #[serde(default)]
    pub controllers: Vec<ControllerToml>,
    #[serde(default)]
    pub scheduler: SchedulerToml,
    #[serde(default)]
    pub logging: Logging,
}

pub fn load_toml(s: &str) -> Result<Config, toml::de::Error> {
    toml::from_str::<Config>(s)
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ServesToml {
    Tuple((i32, i32)),
    Table { from: i32, to: i32 },
}

fn de_serves<'de, D>(deserializer: D) -> Result<(i32, i32), D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match ServesToml::deserialize(deserializer)? {
        ServesToml::Tuple(pair) => pair,
        ServesToml::Table { from, to } => (from, to),
    })
}

impl ElevatorToml {
    /// Floors this elevator stops at (for its first car).
    pub fn stops(&self) -> BTreeSet<i32> {
        let (lo, hi) = self.serves;
        (lo..=hi).filter(|f| !self.skip.contains(f)).collect()
    }
}

impl BuildingCfg {
    /// Floor labels keyed by floor number, falling back to the number itself.
    pub fn labels(&self) -> BTreeMap<i32, String> {
        let mut out: BTreeMap<i32, String> = (self.bottom_floor..=self.top_floor)
            .map(|f| (f, f.to_string()))
            .collect();
        for n in &self.floor_names {
            out.insert(n.floor, n.id.clone());
        }
        out
    }
}

pub fn load_requests_csv(path: &std::path::Path) -> eyre::Result<Vec<TripRequest>> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_path(path)
        .map_err(|e| eyre::eyre!("open requests CSV {:?}: {}", path, e))?;

    // Enforce exact headers
    let headers = rdr
        .headers()
        .map_err(|e| eyre::eyre!("read CSV headers {:?}: {}", path, e))?
        .clone();
    let expected = ["tick", "station", "controller", "origin", "destination"];
    let actual: Vec<String> = headers.iter().map(|s| s.to_string()).collect();
    if actual != expected {
        eyre::bail!(
            "requests CSV must have headers 'tick,station,controller,origin,destination', got: {}",
            actual.join(",")
        );
    }

    let mut rows = Vec::new();
    for (idx, rec) in rdr.deserialize::<TripRequest>().enumerate() {
        match rec {
            Ok(row) => rows.push(row),
            Err(e) => {
                eyre::bail!("invalid CSV row {}: {}", idx + 2, e);
            }
        }
    }
    // Stable by tick so file order breaks ties.
    rows.sort_by_key(|r| r.tick);
    Ok(rows)
}

/// Tallest building `validate` accepts, counted in floors.
pub const MAX_FLOORS: i64 = 1000;

impl Config {
    pub fn validate(&self) -> eyre::Result<()> {
        // Building
        let (bottom, top) = (self.building.bottom_floor, self.building.top_floor);
        if bottom > top {
            eyre::bail!("building.bottom_floor must be <= building.top_floor");
        }
        if i64::from(top) - i64::from(bottom) + 1 > MAX_FLOORS {
            eyre::bail!("building must have at most {} floors", MAX_FLOORS);
        }
        for n in &self.building.floor_names {
            if !(bottom..=top).contains(&n.floor) {
                eyre::bail!("building.floor_names: floor {} is outside the building", n.floor);
            }
            if n.id.trim().is_empty() {
                eyre::bail!("building.floor_names: floor {} has an empty id", n.floor);
            }
        }

        // Elevators
        if self.elevators.is_empty() {
            eyre::bail!("elevators must list at least one elevator");
        }
        let mut ids = BTreeSet::new();
        for e in &self.elevators {
            if e.id <= 0 {
                eyre::bail!("elevators.id must be > 0");
            }
            if !ids.insert(e.id) {
                eyre::bail!("elevators.id {} is duplicated", e.id);
            }
            let (lo, hi) = e.serves;
            if lo >= hi {
                eyre::bail!("elevators[{}].serves must span at least two floors", e.id);
            }
            if e.cars == 0 || e.cars > 4 {
                eyre::bail!("elevators[{}].cars must be in [1, 4]", e.id);
            }
            let Some(top_car_hi) = i32::try_from(e.cars - 1)
                .ok()
                .and_then(|extra| hi.checked_add(extra))
            else {
                eyre::bail!("elevators[{}].serves is outside the building", e.id);
            };
            if lo < bottom || top_car_hi > top {
                eyre::bail!("elevators[{}].serves is outside the building", e.id);
            }
            if !(lo..=hi).contains(&e.start_floor) {
                eyre::bail!("elevators[{}].start_floor must be inside serves", e.id);
            }
            for s in &e.skip {
                if !(lo..=hi).contains(s) {
                    eyre::bail!("elevators[{}].skip floor {} is outside serves", e.id, s);
                }
                if *s == e.start_floor {
                    eyre::bail!("elevators[{}].start_floor cannot be a skipped floor", e.id);
                }
            }
            if e.stops().len() < 2 {
                eyre::bail!("elevators[{}] must stop at two or more floors", e.id);
            }
        }

        // Controllers
        let mut numbers = BTreeSet::new();
        let mut owner: BTreeMap<i32, i32> = BTreeMap::new();
        for c in &self.controllers {
            if c.number <= 0 {
                eyre::bail!("controllers.number must be > 0");
            }
            if !numbers.insert(c.number) {
                eyre::bail!("controllers.number {} is duplicated", c.number);
            }
            if c.range < 0 {
                eyre::bail!("controllers[{}].range must be >= 0", c.number);
            }
            if c.max_passengers == 0 {
                eyre::bail!("controllers[{}].max_passengers must be >= 1", c.number);
            }
            for id in &c.elevators {
                if !ids.contains(id) {
                    eyre::bail!("controllers[{}] references unknown elevator {}", c.number, id);
                }
                if let Some(prev) = owner.insert(*id, c.number) {
                    eyre::bail!(
                        "elevator {} is assigned to controllers {} and {}",
                        id,
                        prev,
                        c.number
                    );
                }
            }
        }

        // Scheduler
        if self.scheduler.tick_ms == 0 {
            eyre::bail!("scheduler.tick_ms must be >= 1");
        }
        if self.scheduler.tick_ms > 60 * 1000 {
            eyre::bail!("scheduler.tick_ms is unreasonably large (>60s)");
        }

        // Logging
        if let Some(r) = self.logging.rotation.as_deref()
            && !matches!(r, "never" | "daily" | "hourly")
        {
            eyre::bail!("logging.rotation must be one of never|daily|hourly");
        }

        Ok(())
    }
}
