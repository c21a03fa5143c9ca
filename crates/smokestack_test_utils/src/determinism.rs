//! Determinism testing utilities.
//!
//! Provides a harness for verifying that the simulation produces identical
//! results given identical inputs.
//!
//! # Testing Strategy
//!
//! Sources of non-determinism include:
//!
//! - **Floating-point math**: Different CPUs can produce different results.
//!   The core uses fixed-point arithmetic throughout.
//!
//! - **HashMap iteration order**: Rust's default hasher is randomized.
//!   Simulation state iterates vectors in placement order; hash sets are
//!   only ever queried, never iterated for effects.
//!
//! - **Wall-clock time**: The core never reads a clock; callers advance the
//!   simulation clock explicitly.

use smokestack_core::city::{CityState, Command};

/// Result of a determinism test.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeterminismResult {
    /// Whether all runs produced identical results.
    pub is_deterministic: bool,
    /// Hashes from each run.
    pub hashes: Vec<u64>,
    /// Number of frames simulated.
    pub frames: u64,
}

impl DeterminismResult {
    /// Get all unique hashes (should be 1 for a deterministic simulation).
    #[must_use]
    pub fn unique_hashes(&self) -> Vec<u64> {
        let mut unique: Vec<u64> = self.hashes.clone();
        unique.sort_unstable();
        unique.dedup();
        unique
    }

    /// Assert that the simulation was deterministic, with a detailed error
    /// message.
    ///
    /// # Panics
    ///
    /// Panics if the simulation produced different hashes across runs.
    pub fn assert_deterministic(&self) {
        if !self.is_deterministic {
            let unique = self.unique_hashes();
            panic!(
                "Simulation is non-deterministic!\n\
                 Runs: {}\n\
                 Frames: {}\n\
                 Unique hashes: {} (expected 1)\n\
                 All hashes: {:?}",
                self.hashes.len(),
                self.frames,
                unique.len(),
                self.hashes
            );
        }
    }
}

/// Run a simulation multiple times and verify determinism.
///
/// # Arguments
///
/// * `runs` - Number of times to run the simulation
/// * `frames` - Number of frames to simulate per run
/// * `setup` - Function to create initial simulation state
/// * `step` - Function to advance simulation by one frame
/// * `hash` - Function to compute state hash
pub fn verify_determinism<S, Setup, Step, HashFn>(
    runs: usize,
    frames: u64,
    setup: Setup,
    step: Step,
    hash: HashFn,
) -> DeterminismResult
where
    Setup: Fn() -> S,
    Step: Fn(&mut S, u64),
    HashFn: Fn(&S) -> u64,
{
    let mut hashes = Vec::with_capacity(runs);

    for _ in 0..runs {
        let mut state = setup();

        for frame in 0..frames {
            step(&mut state, frame);
        }

        hashes.push(hash(&state));
    }

    let is_deterministic = hashes.windows(2).all(|w| w[0] == w[1]);

    DeterminismResult {
        is_deterministic,
        hashes,
        frames,
    }
}

/// Replay a command script against a fresh standard city.
///
/// Commands are applied one per frame at a fixed 16 ms step, mirroring the
/// one-command-per-frame ordering guarantee; remaining frames tick with no
/// input.
#[must_use]
pub fn replay_script(script: &[Command], frames: u64) -> CityState {
    let mut city = CityState::new();
    for frame in 0..frames {
        let command = script.get(frame as usize).copied();
        city.tick(16, command);
    }
    city
}

/// Verify that replaying the same script twice produces identical hashes.
#[must_use]
pub fn verify_script_determinism(script: &[Command], frames: u64) -> bool {
    let a = replay_script(script, frames);
    let b = replay_script(script, frames);
    a.state_hash() == b.state_hash()
}

/// Compare two replays frame-by-frame, finding the first divergence.
///
/// Returns `None` if the replays never diverge, `Some(frame)` otherwise.
#[must_use]
pub fn find_first_divergence(script: &[Command], frames: u64) -> Option<u64> {
    let mut a = CityState::new();
    let mut b = CityState::new();

    if a.state_hash() != b.state_hash() {
        return Some(0);
    }

    for frame in 0..frames {
        let command = script.get(frame as usize).copied();
        a.tick(16, command);
        b.tick(16, command);

        if a.state_hash() != b.state_hash() {
            return Some(frame + 1);
        }
    }

    None
}

/// Verify that a snapshot round-trip preserves state exactly.
#[must_use]
pub fn verify_snapshot_determinism(script: &[Command], frames: u64) -> bool {
    let city = replay_script(script, frames);
    let Ok(bytes) = city.serialize() else {
        return false;
    };
    let Ok(restored) = CityState::deserialize(&bytes) else {
        return false;
    };
    restored.state_hash() == city.state_hash()
}

/// Proptest strategies for determinism testing.
///
/// These strategies generate random but reproducible command scripts for
/// property-based testing of simulation determinism.
pub mod strategies {
    use proptest::prelude::*;
    use smokestack_core::catalog::BuildingKind;
    use smokestack_core::city::Command;

    /// Generate any of the five building kinds.
    pub fn arb_building_kind() -> impl Strategy<Value = BuildingKind> {
        prop_oneof![
            Just(BuildingKind::House),
            Just(BuildingKind::Farm),
            Just(BuildingKind::Mine),
            Just(BuildingKind::Factory),
            Just(BuildingKind::Railroad),
        ]
    }

    /// Generate a selection command.
    pub fn arb_select_command() -> impl Strategy<Value = Command> {
        arb_building_kind().prop_map(Command::SelectBuilding)
    }

    /// Generate a placement command anywhere on (and slightly off) the
    /// 800x600 screen, including invalid clicks.
    pub fn arb_place_command() -> impl Strategy<Value = Command> {
        (-40i32..840, -40i32..640).prop_map(|(px, py)| Command::Place { px, py })
    }

    /// Generate a research command, including out-of-range indices.
    pub fn arb_research_command() -> impl Strategy<Value = Command> {
        (0usize..10).prop_map(Command::Research)
    }

    /// Generate any player command.
    pub fn arb_command() -> impl Strategy<Value = Command> {
        prop_oneof![
            arb_select_command(),
            arb_place_command(),
            arb_research_command(),
            Just(Command::ToggleResearchMenu),
        ]
    }

    /// Generate a command script.
    pub fn arb_command_script(max_len: usize) -> impl Strategy<Value = Vec<Command>> {
        proptest::collection::vec(arb_command(), 0..max_len)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use smokestack_core::catalog::BuildingKind;
    use smokestack_core::math::Fixed;

    use crate::fixtures::{factory_town, fixed};

    // =========================================================================
    // Basic determinism tests
    // =========================================================================

    #[test]
    fn test_verify_determinism_simple() {
        let result = verify_determinism(3, 100, || 0u64, |n, _| *n += 1, |n| *n);

        assert!(result.is_deterministic);
        assert_eq!(result.hashes, vec![100, 100, 100]);
    }

    #[test]
    fn test_empty_script_determinism() {
        assert!(verify_script_determinism(&[], 120));
    }

    #[test]
    fn test_build_script_determinism() {
        let script = vec![
            Command::SelectBuilding(BuildingKind::House),
            Command::Place { px: 100, py: 100 },
            Command::SelectBuilding(BuildingKind::Railroad),
            Command::Place { px: 200, py: 100 },
            Command::Place { px: 220, py: 100 },
            Command::Research(6),
        ];
        assert!(verify_script_determinism(&script, 700));
        assert!(find_first_divergence(&script, 700).is_none());
    }

    #[test]
    fn test_long_idle_run_determinism() {
        let result = verify_determinism(
            3,
            2_000,
            factory_town,
            |city, _| {
                city.tick(16, None);
            },
            CityState::state_hash,
        );
        result.assert_deterministic();
    }

    #[test]
    fn test_snapshot_round_trip_after_script() {
        let script = vec![
            Command::Place { px: 0, py: 0 },
            Command::SelectBuilding(BuildingKind::Mine),
            Command::Place { px: 100, py: 300 },
        ];
        assert!(verify_snapshot_determinism(&script, 650));
    }

    // =========================================================================
    // Invariants under replay
    // =========================================================================

    #[test]
    fn test_labor_conservation_through_replay() {
        let script = vec![
            Command::Place { px: 0, py: 0 },
            Command::Place { px: 20, py: 0 },
            Command::SelectBuilding(BuildingKind::Factory),
            Command::Place { px: 100, py: 100 },
            Command::SelectBuilding(BuildingKind::Mine),
            Command::Place { px: 200, py: 200 },
        ];
        let city = replay_script(&script, 400);

        let assigned: u32 = city
            .buildings()
            .iter()
            .filter(|b| b.kind.is_production() && b.active)
            .map(|b| city.tunables().worker_requirement(b.kind))
            .sum();
        let pool = city.workers();
        assert_eq!(pool.available + assigned, pool.total);

        let house_count = city
            .buildings()
            .iter()
            .filter(|b| b.kind == BuildingKind::House)
            .count() as u32;
        assert_eq!(pool.total, house_count * city.tunables().house_capacity);
    }

    #[test]
    fn test_occupancy_matches_footprints() {
        let mut city = factory_town();
        city.tick(16, None);

        // Occupied cell count equals the sum of placed footprint cell counts
        let expected: u32 = city
            .buildings()
            .iter()
            .map(|b| city.catalog().footprint(b.kind).cell_count())
            .sum();
        let occupied = (0..40)
            .flat_map(|x| (0..30).map(move |y| (x, y)))
            .filter(|&(x, y)| city.grid().is_occupied(x, y) == Some(true))
            .count() as u32;
        assert_eq!(occupied, expected);
    }

    #[test]
    fn test_balance_only_rises_while_idle() {
        let mut city = factory_town();
        let mut previous = city.balance();
        for _ in 0..700 {
            city.tick(16, None);
            assert!(city.balance() >= previous);
            previous = city.balance();
        }
        assert!(city.balance() > fixed(0));
    }

    // =========================================================================
    // Property-based tests using proptest
    // =========================================================================

    proptest! {
        /// Any random command script must replay to an identical state hash.
        #[test]
        fn prop_random_scripts_are_deterministic(
            script in strategies::arb_command_script(30),
        ) {
            prop_assert!(verify_script_determinism(&script, 60));
        }

        /// Snapshot round-trips preserve state for any script.
        #[test]
        fn prop_snapshot_round_trip_is_exact(
            script in strategies::arb_command_script(15),
            frames in 1u64..120,
        ) {
            prop_assert!(verify_snapshot_determinism(&script, frames));
        }

        /// Pollution never decreases, whatever the player does.
        #[test]
        fn prop_pollution_is_monotone(
            script in strategies::arb_command_script(20),
        ) {
            let mut city = CityState::new();
            let mut previous = Fixed::ZERO;
            for frame in 0..60usize {
                city.tick(16, script.get(frame).copied());
                prop_assert!(city.pollution() >= previous);
                previous = city.pollution();
            }
        }

        /// The labor conservation invariant holds after any script.
        #[test]
        fn prop_labor_conservation(
            script in strategies::arb_command_script(25),
        ) {
            let city = replay_script(&script, 30);
            let assigned: u32 = city
                .buildings()
                .iter()
                .filter(|b| b.kind.is_production() && b.active)
                .map(|b| city.tunables().worker_requirement(b.kind))
                .sum();
            prop_assert_eq!(city.workers().available + assigned, city.workers().total);
        }
    }
}
