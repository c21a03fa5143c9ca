//! Scenario loading and configuration.
//!
//! Scenarios define the starting condition and the scripted player input for
//! a headless run: which frame each command lands on, the timestep, and how
//! long to run.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use smokestack_core::catalog::BuildingKind;
use smokestack_core::city::{CityState, Command};
use smokestack_core::math::Fixed;

/// Error type for scenario operations.
#[derive(Error, Debug)]
pub enum ScenarioError {
    /// File not found.
    #[error("Scenario file not found: {0}")]
    FileNotFound(String),
    /// Failed to read file.
    #[error("Failed to read scenario file: {0}")]
    ReadError(#[from] std::io::Error),
    /// Failed to parse RON.
    #[error("Failed to parse scenario: {0}")]
    ParseError(#[from] ron::error::SpannedError),
}

/// Starting condition for a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum Start {
    /// The standard founded settlement (farm + four houses, 200 on hand).
    #[default]
    Standard,
    /// An empty board with an explicit starting balance.
    Empty {
        /// Starting resource balance (whole units).
        balance: i64,
    },
}

impl Start {
    /// Build the initial city state.
    #[must_use]
    pub fn build(self) -> CityState {
        match self {
            Start::Standard => CityState::new(),
            Start::Empty { balance } => CityState::empty(Fixed::from_num(balance)),
        }
    }
}

/// A command scheduled for a specific frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduledCommand {
    /// Frame the command is applied on (0-based).
    pub frame: u64,
    /// The command itself.
    pub command: Command,
}

/// A complete scenario configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Scenario {
    /// Scenario name.
    pub name: String,
    /// Human-readable description.
    pub description: String,
    /// Frame duration on the simulation clock.
    pub dt_ms: u64,
    /// Total frames to run.
    pub frames: u64,
    /// Starting condition.
    #[serde(default)]
    pub start: Start,
    /// Scripted commands, sorted by frame. At most one command applies per
    /// frame; extra commands scheduled on the same frame are dropped.
    #[serde(default)]
    pub commands: Vec<ScheduledCommand>,
}

impl Default for Scenario {
    fn default() -> Self {
        Self::boomtown()
    }
}

impl Scenario {
    /// Load a scenario from a RON file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ScenarioError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ScenarioError::FileNotFound(path.display().to_string()));
        }
        let contents = std::fs::read_to_string(path)?;
        let scenario: Scenario = ron::from_str(&contents)?;
        Ok(scenario)
    }

    /// Load from a RON string (useful for embedded scenarios).
    pub fn from_ron_str(ron: &str) -> Result<Self, ScenarioError> {
        let scenario: Scenario = ron::from_str(ron)?;
        Ok(scenario)
    }

    /// The built-in demo: grow the founding settlement into a rail-served
    /// farm town over two simulated minutes, then research housing tech
    /// from the proceeds.
    #[must_use]
    pub fn boomtown() -> Self {
        Self {
            name: "Boomtown".to_string(),
            description: "Grow the founding settlement into a rail-served farm town".to_string(),
            dt_ms: 16,
            frames: 7_500, // two simulated minutes at 60 Hz
            start: Start::Standard,
            commands: vec![
                // More housing first: capacity gates everything else
                ScheduledCommand {
                    frame: 0,
                    command: Command::SelectBuilding(BuildingKind::House),
                },
                ScheduledCommand {
                    frame: 1,
                    command: Command::Place { px: 400, py: 280 },
                },
                ScheduledCommand {
                    frame: 2,
                    command: Command::Place { px: 400, py: 300 },
                },
                // Rail service along the farm's southern edge for the bonus
                ScheduledCommand {
                    frame: 240,
                    command: Command::SelectBuilding(BuildingKind::Railroad),
                },
                ScheduledCommand {
                    frame: 241,
                    command: Command::Place { px: 460, py: 320 },
                },
                ScheduledCommand {
                    frame: 242,
                    command: Command::Place { px: 480, py: 320 },
                },
                ScheduledCommand {
                    frame: 243,
                    command: Command::Place { px: 500, py: 320 },
                },
                // Farm proceeds eventually cover the cheapest housing tech
                ScheduledCommand {
                    frame: 7_000,
                    command: Command::Research(6),
                },
            ],
        }
    }

    /// The command scheduled for a frame, if any.
    #[must_use]
    pub fn command_for_frame(&self, frame: u64) -> Option<Command> {
        self.commands
            .iter()
            .find(|c| c.frame == frame)
            .map(|c| c.command)
    }
}
