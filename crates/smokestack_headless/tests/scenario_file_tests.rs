//! Scenario file loading and end-to-end run tests.

use std::io::Write;

use smokestack_core::catalog::BuildingKind;
use smokestack_headless::runner::{self, building_count};
use smokestack_headless::scenario::{Scenario, ScenarioError};

#[test]
fn shipped_boomtown_file_matches_builtin() {
    let path = concat!(env!("CARGO_MANIFEST_DIR"), "/scenarios/boomtown.ron");
    let from_file = Scenario::load(path).unwrap();
    let builtin = Scenario::boomtown();

    assert_eq!(from_file.name, builtin.name);
    assert_eq!(from_file.dt_ms, builtin.dt_ms);
    assert_eq!(from_file.frames, builtin.frames);
    assert_eq!(from_file.commands, builtin.commands);

    // Both must drive the simulation to the identical final state
    let a = runner::run(&from_file);
    let b = runner::run(&builtin);
    assert_eq!(a.state_hash, b.state_hash);
}

#[test]
fn scenario_round_trips_through_temp_file() {
    let scenario = Scenario::boomtown();
    let ron = ron::ser::to_string(&scenario).unwrap();

    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(ron.as_bytes()).unwrap();

    let restored = Scenario::load(file.path()).unwrap();
    assert_eq!(restored.commands, scenario.commands);
}

#[test]
fn truncated_run_still_places_buildings() {
    let mut scenario = Scenario::boomtown();
    // Stop before the research frame: placements land, research never fires
    scenario.frames = 600;

    let summary = runner::run(&scenario);
    assert_eq!(building_count(&summary, BuildingKind::House), 6);
    assert_eq!(building_count(&summary, BuildingKind::Railroad), 3);
    assert!(summary.researched.is_empty());
}

#[test]
fn missing_scenario_file_reports_not_found() {
    let err = Scenario::load("/no/such/file.ron").unwrap_err();
    assert!(matches!(err, ScenarioError::FileNotFound(_)));
    assert!(err.to_string().contains("/no/such/file.ron"));
}

#[test]
fn scenario_replay_is_deterministic() {
    use smokestack_core::city::CityState;
    use smokestack_test_utils::determinism::verify_determinism;

    let scenario = Scenario::boomtown();
    let result = verify_determinism(
        3,
        600,
        || scenario.start.build(),
        |city, frame| {
            city.tick(scenario.dt_ms, scenario.command_for_frame(frame));
        },
        CityState::state_hash,
    );
    result.assert_deterministic();
}
