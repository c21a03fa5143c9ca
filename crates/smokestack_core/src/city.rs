//! The aggregate city state and frame loop.
//!
//! [`CityState`] owns all simulation state and advances it one frame at a
//! time. Each frame runs in a fixed order:
//!
//! 1. Apply at most one queued player command (placement or research)
//! 2. Recompute labor allocation
//! 3. Accrue pollution
//! 4. Evaluate each production timer
//! 5. Hand state to the caller via accessors and [`TickEvents`]
//!
//! Every command either applies fully in the frame it is issued or is fully
//! declined with zero state change; validation always precedes mutation, so
//! there is no partial-update state to recover from.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};

use crate::catalog::{Building, BuildingCatalog, BuildingKind};
use crate::error::{CityError, Result};
use crate::grid::{pixel_to_cell, GridIndex};
use crate::labor::{self, Tunables, WorkerPool};
use crate::math::{fixed_serde, Fixed};
use crate::pollution::PollutionAccumulator;
use crate::production::{ProductionClock, ProductionEvent};
use crate::tech::TechTree;

/// Commands the simulation accepts from the presentation/input layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Command {
    /// Set the building kind used by subsequent placements.
    SelectBuilding(BuildingKind),
    /// Place the selected building at a pixel position.
    Place {
        /// Click position, horizontal pixels.
        px: i32,
        /// Click position, vertical pixels.
        py: i32,
    },
    /// Research the technology at a 0-based index into the fixed list.
    Research(usize),
    /// Flip the research-menu flag. While open, placement is suppressed.
    ToggleResearchMenu,
}

/// Events generated during one frame, for presentation-layer feedback.
#[derive(Debug, Clone, Default)]
pub struct TickEvents {
    /// Kind built this frame, if a placement command succeeded.
    pub built: Option<BuildingKind>,
    /// Whether any production category paid out this frame.
    pub produced: bool,
    /// Per-category payouts this frame.
    pub payouts: Vec<ProductionEvent>,
}

/// The complete simulation state.
///
/// Owns the grid, catalog, building list, technology tree, and tunables
/// exclusively; the railroad and labor analyses run as pure functions over
/// borrowed views of this state, recomputed on demand.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CityState {
    /// Simulation clock in milliseconds, advanced by [`tick`](Self::tick).
    now_ms: u64,
    /// Resource balance; fractional because of railroad bonuses.
    #[serde(with = "fixed_serde")]
    balance: Fixed,
    /// Pollution level; non-decreasing.
    #[serde(with = "fixed_serde")]
    pollution: Fixed,
    /// Occupancy matrix.
    grid: GridIndex,
    /// Building specs and live costs.
    catalog: BuildingCatalog,
    /// All placed buildings, in placement order.
    buildings: Vec<Building>,
    /// Live global tunables, mutated only by technology effects.
    tunables: Tunables,
    /// Technology research state.
    tech: TechTree,
    /// Production timers.
    clock: ProductionClock,
    /// Pollution timer.
    pollution_clock: PollutionAccumulator,
    /// Worker pool snapshot from the latest allocation pass.
    workers: WorkerPool,
    /// Kind used by subsequent placement commands.
    selected: BuildingKind,
    /// Kinds available for placement. The gate exists structurally; the
    /// standard game unlocks all five from the start.
    unlocked: Vec<BuildingKind>,
    /// Whether the research menu is open (placement suppressed).
    research_menu_open: bool,
}

impl CityState {
    /// The standard starting settlement.
    ///
    /// Begins with 475 resources, then founds one farm at (23, 14) and four
    /// houses at (21, 14), (22, 14), (21, 15), (22, 15). Founding placements
    /// pay base cost and do not escalate prices, leaving 200 on hand and
    /// every kind at its base price. The initial allocation pass activates
    /// the farm: 4 houses supply exactly its 20-worker requirement.
    #[must_use]
    pub fn new() -> Self {
        let mut city = Self::empty(Fixed::from_num(475));
        city.found(BuildingKind::Farm, (23, 14));
        for cell in [(21, 14), (22, 14), (21, 15), (22, 15)] {
            city.found(BuildingKind::House, cell);
        }
        city.workers = labor::reallocate(&mut city.buildings, &city.tunables);
        city
    }

    /// An empty board with the given starting balance.
    ///
    /// Entry point for scripted scenarios and tests that need full control
    /// over the layout.
    #[must_use]
    pub fn empty(balance: Fixed) -> Self {
        Self {
            now_ms: 0,
            balance,
            pollution: Fixed::ZERO,
            grid: GridIndex::new(),
            catalog: BuildingCatalog::standard(),
            buildings: Vec::new(),
            tunables: Tunables::default(),
            tech: TechTree::standard(),
            clock: ProductionClock::new(),
            pollution_clock: PollutionAccumulator::new(),
            workers: WorkerPool::default(),
            selected: BuildingKind::House,
            unlocked: BuildingKind::ALL.to_vec(),
            research_menu_open: false,
        }
    }

    /// Founding placement: pays base cost, skips escalation and validation.
    fn found(&mut self, kind: BuildingKind, cell: (u32, u32)) {
        let footprint = *self.catalog.footprint(kind);
        self.buildings.push(Building::new(kind, cell));
        self.grid.occupy(cell.0, cell.1, &footprint);
        self.balance -= Fixed::from_num(self.catalog.base_cost(kind));
    }

    /// Advance the simulation by one frame.
    ///
    /// `dt_ms` is the frame duration on the simulation clock (design target
    /// 60 Hz, ~16 ms). At most one command is applied per frame, before any
    /// accrual runs.
    pub fn tick(&mut self, dt_ms: u64, command: Option<Command>) -> TickEvents {
        self.now_ms += dt_ms;

        let built = command.and_then(|c| self.apply_command(c));

        self.workers = labor::reallocate(&mut self.buildings, &self.tunables);

        let factory_count = self
            .buildings
            .iter()
            .filter(|b| b.kind == BuildingKind::Factory)
            .count() as u32;
        self.pollution += self.pollution_clock.accrue(self.now_ms, factory_count);

        let payouts = self
            .clock
            .advance(self.now_ms, &self.buildings, &self.catalog, &self.tunables);
        for event in &payouts {
            self.balance += event.amount;
        }

        TickEvents {
            built,
            produced: !payouts.is_empty(),
            payouts,
        }
    }

    /// Apply a single command. Returns the kind built, if any, for the
    /// presentation layer's build feedback.
    fn apply_command(&mut self, command: Command) -> Option<BuildingKind> {
        match command {
            Command::SelectBuilding(kind) => {
                self.selected = kind;
                None
            }
            Command::Place { px, py } => {
                if self.research_menu_open {
                    return None;
                }
                self.place_at_pixel(px, py).then_some(self.selected)
            }
            Command::Research(index) => {
                self.research(index);
                None
            }
            Command::ToggleResearchMenu => {
                self.research_menu_open = !self.research_menu_open;
                None
            }
        }
    }

    /// Place the selected kind at a pixel position.
    pub fn place_at_pixel(&mut self, px: i32, py: i32) -> bool {
        let Some((x, y)) = pixel_to_cell(px, py) else {
            return false;
        };
        self.try_place(x, y, self.selected)
    }

    /// Attempt to place a building with its footprint anchored at (x, y).
    ///
    /// Preconditions, first failure wins: the kind must be unlocked, the
    /// balance must cover its current cost, and the footprint must fit on
    /// unoccupied in-bounds cells. Failure declines silently with zero state
    /// change. Success appends the building (inactive until the allocation
    /// pass), occupies the grid, deducts the current cost, escalates the
    /// price, and reruns labor allocation.
    pub fn try_place(&mut self, x: u32, y: u32, kind: BuildingKind) -> bool {
        if !self.unlocked.contains(&kind) {
            return false;
        }
        let cost = self.catalog.current_cost(kind);
        if self.balance < Fixed::from_num(cost) {
            return false;
        }
        let footprint = *self.catalog.footprint(kind);
        if !self.grid.is_space_available(x, y, &footprint) {
            return false;
        }

        self.buildings.push(Building::new(kind, (x, y)));
        self.grid.occupy(x, y, &footprint);
        self.balance -= Fixed::from_num(cost);

        let railroad_count = self
            .buildings
            .iter()
            .filter(|b| b.kind == BuildingKind::Railroad)
            .count() as u32;
        self.catalog.escalate(kind, railroad_count);

        self.workers = labor::reallocate(&mut self.buildings, &self.tunables);
        tracing::debug!(kind = kind.name(), x, y, cost, "building placed");
        true
    }

    /// Attempt to research the technology at a 0-based index.
    ///
    /// Delegates to the tech tree's guarded transition and reruns labor
    /// allocation on success, since requirement and capacity changes can
    /// instantly change which buildings are active.
    pub fn research(&mut self, index: usize) -> bool {
        let researched = self
            .tech
            .research(index, &mut self.balance, &mut self.tunables);
        if researched {
            self.workers = labor::reallocate(&mut self.buildings, &self.tunables);
        }
        researched
    }

    /// Set the kind used by subsequent placements.
    pub fn select_building(&mut self, kind: BuildingKind) {
        self.selected = kind;
    }

    /// Flip the research-menu flag.
    pub fn toggle_research_menu(&mut self) {
        self.research_menu_open = !self.research_menu_open;
    }

    /// Current resource balance.
    #[must_use]
    pub const fn balance(&self) -> Fixed {
        self.balance
    }

    /// Current pollution level.
    #[must_use]
    pub const fn pollution(&self) -> Fixed {
        self.pollution
    }

    /// Worker pool snapshot from the latest allocation pass.
    #[must_use]
    pub const fn workers(&self) -> WorkerPool {
        self.workers
    }

    /// All placed buildings, in placement order.
    #[must_use]
    pub fn buildings(&self) -> &[Building] {
        &self.buildings
    }

    /// Kind used by subsequent placement commands.
    #[must_use]
    pub const fn selected_building(&self) -> BuildingKind {
        self.selected
    }

    /// Building specs and live costs.
    #[must_use]
    pub const fn catalog(&self) -> &BuildingCatalog {
        &self.catalog
    }

    /// Occupancy matrix.
    #[must_use]
    pub const fn grid(&self) -> &GridIndex {
        &self.grid
    }

    /// Technology research state.
    #[must_use]
    pub const fn tech(&self) -> &TechTree {
        &self.tech
    }

    /// Live global tunables.
    #[must_use]
    pub const fn tunables(&self) -> &Tunables {
        &self.tunables
    }

    /// Whether the research menu is open.
    #[must_use]
    pub const fn research_menu_open(&self) -> bool {
        self.research_menu_open
    }

    /// Simulation clock in milliseconds.
    #[must_use]
    pub const fn now_ms(&self) -> u64 {
        self.now_ms
    }

    /// Whether a kind is available for placement.
    #[must_use]
    pub fn is_unlocked(&self, kind: BuildingKind) -> bool {
        self.unlocked.contains(&kind)
    }

    /// Calculate a hash of the current simulation state.
    ///
    /// Two cities with identical state produce identical hashes; used by
    /// determinism tests and snapshot verification.
    #[must_use]
    pub fn state_hash(&self) -> u64 {
        let mut hasher = DefaultHasher::new();

        self.now_ms.hash(&mut hasher);
        self.balance.to_bits().hash(&mut hasher);
        self.pollution.to_bits().hash(&mut hasher);

        self.buildings.len().hash(&mut hasher);
        for building in &self.buildings {
            building.kind.index().hash(&mut hasher);
            building.cell.hash(&mut hasher);
            building.active.hash(&mut hasher);
        }

        for kind in BuildingKind::ALL {
            self.catalog.current_cost(kind).hash(&mut hasher);
        }

        for index in 0..self.tech.len() {
            self.tech.is_researched(index).hash(&mut hasher);
        }

        self.tunables.factory_rate.hash(&mut hasher);
        self.tunables.farm_rate.hash(&mut hasher);
        self.tunables.mine_rate.hash(&mut hasher);
        self.tunables.factory_workers.hash(&mut hasher);
        self.tunables.farm_workers.hash(&mut hasher);
        self.tunables.mine_workers.hash(&mut hasher);
        self.tunables.house_capacity.hash(&mut hasher);

        self.workers.total.hash(&mut hasher);
        self.workers.available.hash(&mut hasher);
        self.selected.index().hash(&mut hasher);
        self.research_menu_open.hash(&mut hasher);

        hasher.finish()
    }

    /// Serialize the city state for snapshot or replay purposes.
    pub fn serialize(&self) -> Result<Vec<u8>> {
        bincode::serialize(self).map_err(|e| CityError::Snapshot(e.to_string()))
    }

    /// Restore city state from a snapshot.
    pub fn deserialize(data: &[u8]) -> Result<Self> {
        bincode::deserialize(data).map_err(|e| CityError::Snapshot(e.to_string()))
    }
}

impl Default for CityState {
    fn default() -> Self {
        Self::new()
    }
}
