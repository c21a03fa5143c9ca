//! Building kinds, static specs, and live escalating costs.
//!
//! Each building kind has an immutable spec (footprint, base cost, base
//! yield) and one mutable piece of live state: the current cost, which rises
//! with every placement of that kind. Specs are plain data and can be
//! round-tripped through RON for data-driven tweaking.

use serde::{Deserialize, Serialize};

use crate::error::{CityError, Result};
use crate::grid::{Footprint, CELL_SIZE};

/// The five placeable building kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BuildingKind {
    /// Houses supply worker capacity.
    House,
    /// Farms produce resources on the slow production interval.
    Farm,
    /// Mines produce resources on the slow production interval.
    Mine,
    /// Factories produce resources on the fast interval and emit pollution.
    Factory,
    /// Railroads form the bonus network; they produce nothing themselves.
    Railroad,
}

impl BuildingKind {
    /// All kinds in a stable order (also the catalog storage order).
    pub const ALL: [BuildingKind; 5] = [
        BuildingKind::House,
        BuildingKind::Farm,
        BuildingKind::Mine,
        BuildingKind::Factory,
        BuildingKind::Railroad,
    ];

    /// Stable index into per-kind storage.
    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            BuildingKind::House => 0,
            BuildingKind::Farm => 1,
            BuildingKind::Mine => 2,
            BuildingKind::Factory => 3,
            BuildingKind::Railroad => 4,
        }
    }

    /// Lowercase display name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            BuildingKind::House => "house",
            BuildingKind::Farm => "farm",
            BuildingKind::Mine => "mine",
            BuildingKind::Factory => "factory",
            BuildingKind::Railroad => "railroad",
        }
    }

    /// Whether this kind consumes workers and produces resources.
    #[must_use]
    pub const fn is_production(self) -> bool {
        matches!(
            self,
            BuildingKind::Farm | BuildingKind::Mine | BuildingKind::Factory
        )
    }
}

/// Immutable per-kind building definition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildingSpec {
    /// Grid footprint, anchored at the building's top-left cell.
    pub footprint: Footprint,
    /// Price of the first building of this kind.
    pub base_cost: u64,
    /// Railroad-bonus constant. This stays fixed even when technology raises
    /// the live production rate; zero for non-producing kinds.
    pub base_yield: u32,
}

impl BuildingSpec {
    /// Create a new building spec.
    #[must_use]
    pub const fn new(footprint: Footprint, base_cost: u64, base_yield: u32) -> Self {
        Self {
            footprint,
            base_cost,
            base_yield,
        }
    }
}

/// Static specs plus the live current cost per kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildingCatalog {
    /// Immutable specs, indexed by [`BuildingKind::index`].
    specs: [BuildingSpec; 5],
    /// Live escalating price per kind, same indexing.
    current_costs: [u64; 5],
}

impl BuildingCatalog {
    /// Catalog with the standard specs: house 1x1/$50, farm 2x2/$75,
    /// mine 2x2/$150, factory 2x2/$200, railroad 1x1/$25.
    #[must_use]
    pub fn standard() -> Self {
        let specs = [
            BuildingSpec::new(Footprint::new(1, 1), 50, 0), // house
            BuildingSpec::new(Footprint::new(2, 2), 75, 20), // farm
            BuildingSpec::new(Footprint::new(2, 2), 150, 20), // mine
            BuildingSpec::new(Footprint::new(2, 2), 200, 10), // factory
            BuildingSpec::new(Footprint::new(1, 1), 25, 0), // railroad
        ];
        Self::from_specs(specs)
    }

    /// Build a catalog from explicit specs; current costs start at base.
    #[must_use]
    pub fn from_specs(specs: [BuildingSpec; 5]) -> Self {
        let current_costs = [
            specs[0].base_cost,
            specs[1].base_cost,
            specs[2].base_cost,
            specs[3].base_cost,
            specs[4].base_cost,
        ];
        Self {
            specs,
            current_costs,
        }
    }

    /// Parse a spec table from a RON string.
    pub fn from_ron_str(ron: &str) -> Result<Self> {
        let specs: [BuildingSpec; 5] =
            ron::from_str(ron).map_err(|e| CityError::DataParse(e.to_string()))?;
        Ok(Self::from_specs(specs))
    }

    /// Spec for a kind.
    #[must_use]
    pub fn spec(&self, kind: BuildingKind) -> &BuildingSpec {
        &self.specs[kind.index()]
    }

    /// Footprint for a kind.
    #[must_use]
    pub fn footprint(&self, kind: BuildingKind) -> &Footprint {
        &self.specs[kind.index()].footprint
    }

    /// Price of the first building of a kind.
    #[must_use]
    pub fn base_cost(&self, kind: BuildingKind) -> u64 {
        self.specs[kind.index()].base_cost
    }

    /// Live price of the next building of a kind.
    #[must_use]
    pub fn current_cost(&self, kind: BuildingKind) -> u64 {
        self.current_costs[kind.index()]
    }

    /// Apply the escalating-price rule after a successful placement.
    ///
    /// Railroads ramp super-linearly: the price rises by the number of
    /// railroads now placed (including the one just placed). Every other
    /// kind rises by a flat unit. There is no cap.
    pub fn escalate(&mut self, kind: BuildingKind, railroad_count: u32) {
        let step = match kind {
            BuildingKind::Railroad => u64::from(railroad_count),
            _ => 1,
        };
        self.current_costs[kind.index()] += step;
    }
}

impl Default for BuildingCatalog {
    fn default() -> Self {
        Self::standard()
    }
}

/// A placed building.
///
/// Buildings are created only through successful placement and are never
/// removed or relocated. The `active` flag is derived by the labor
/// allocator on every pass, never persisted as player intent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Building {
    /// What was built.
    pub kind: BuildingKind,
    /// Top-left cell of the footprint.
    pub cell: (u32, u32),
    /// Whether workers are currently assigned (recomputed every pass).
    pub active: bool,
}

impl Building {
    /// Create a new, not-yet-activated building.
    #[must_use]
    pub const fn new(kind: BuildingKind, cell: (u32, u32)) -> Self {
        Self {
            kind,
            cell,
            active: false,
        }
    }

    /// Pixel position of the top-left corner, for the presentation layer.
    #[must_use]
    pub fn pixel_pos(&self) -> (i32, i32) {
        (self.cell.0 as i32 * CELL_SIZE, self.cell.1 as i32 * CELL_SIZE)
    }
}
