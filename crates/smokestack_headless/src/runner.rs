//! Headless scenario runner implementation.
//!
//! Drives a [`CityState`] through a scenario frame by frame, applying at
//! most one scripted command per frame, and aggregates the result into a
//! serializable summary.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use smokestack_core::catalog::BuildingKind;
use smokestack_core::city::CityState;

use crate::scenario::Scenario;

/// Aggregated result of a scenario run.
///
/// Balance and pollution are rendered as `f64` for readability; the
/// conversion happens here at the presentation boundary, never inside the
/// simulation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunSummary {
    /// Scenario name.
    pub scenario: String,
    /// Frames simulated.
    pub frames: u64,
    /// Simulated time in milliseconds.
    pub simulated_ms: u64,
    /// Final resource balance.
    pub balance: f64,
    /// Final pollution level.
    pub pollution: f64,
    /// Workers unassigned after the final allocation pass.
    pub workers_available: u32,
    /// Total workers supplied by housing.
    pub workers_total: u32,
    /// Building counts by kind name.
    pub buildings: BTreeMap<String, u32>,
    /// Identifiers of researched technologies, in list order.
    pub researched: Vec<String>,
    /// Successful placements during the run.
    pub buildings_placed: u64,
    /// Production payouts fired during the run.
    pub payouts: u64,
    /// Final deterministic state hash.
    pub state_hash: u64,
}

/// Run a scenario to completion.
#[must_use]
pub fn run(scenario: &Scenario) -> RunSummary {
    let mut city = scenario.start.build();
    let mut buildings_placed = 0u64;
    let mut payouts = 0u64;

    for frame in 0..scenario.frames {
        let command = scenario.command_for_frame(frame);
        let events = city.tick(scenario.dt_ms, command);
        if events.built.is_some() {
            buildings_placed += 1;
        }
        payouts += events.payouts.len() as u64;
    }

    tracing::info!(
        scenario = %scenario.name,
        frames = scenario.frames,
        placed = buildings_placed,
        payouts,
        "scenario complete"
    );

    summarize(&city, scenario, buildings_placed, payouts)
}

/// Build the summary from a finished city.
fn summarize(
    city: &CityState,
    scenario: &Scenario,
    buildings_placed: u64,
    payouts: u64,
) -> RunSummary {
    let mut buildings = BTreeMap::new();
    for building in city.buildings() {
        *buildings.entry(building.kind.name().to_string()).or_insert(0u32) += 1;
    }

    let researched = (0..city.tech().len())
        .filter(|&i| city.tech().is_researched(i))
        .filter_map(|i| city.tech().get(i))
        .map(|t| t.id.clone())
        .collect();

    RunSummary {
        scenario: scenario.name.clone(),
        frames: scenario.frames,
        simulated_ms: city.now_ms(),
        balance: city.balance().to_num::<f64>(),
        pollution: city.pollution().to_num::<f64>(),
        workers_available: city.workers().available,
        workers_total: city.workers().total,
        buildings,
        researched,
        buildings_placed,
        payouts,
        state_hash: city.state_hash(),
    }
}

/// Look up the count of one building kind in a run summary.
#[must_use]
pub fn building_count(summary: &RunSummary, kind: BuildingKind) -> u32 {
    summary.buildings.get(kind.name()).copied().unwrap_or(0)
}
