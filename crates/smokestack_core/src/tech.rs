//! Technology research state machine.
//!
//! Each technology moves once, irreversibly, from unresearched to
//! researched. Research price scales with the *global* number of
//! technologies already researched - `base_cost x 2^count` - so research
//! order reprices every remaining technology. Effects are data, not
//! closures: a tagged mutation of exactly one tunable, applied one-shot at
//! research time.

use serde::{Deserialize, Serialize};

use crate::error::{CityError, Result};
use crate::labor::Tunables;
use crate::math::Fixed;

/// The global tunable a technology effect mutates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TunableTarget {
    /// Factory payout per interval.
    FactoryRate,
    /// Farm payout per interval.
    FarmRate,
    /// Mine payout per interval.
    MineRate,
    /// Workers required per factory.
    FactoryWorkers,
    /// Workers required per farm.
    FarmWorkers,
    /// Workers required per mine.
    MineWorkers,
    /// Workers supplied per house.
    HouseCapacity,
}

/// One-shot mutation of a single tunable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TechEffect {
    /// Replace the tunable's value.
    Set {
        /// Tunable to replace.
        target: TunableTarget,
        /// New value.
        value: u32,
    },
    /// Raise the tunable's value.
    Add {
        /// Tunable to raise.
        target: TunableTarget,
        /// Increment.
        amount: u32,
    },
}

impl TechEffect {
    /// Apply this effect to the live tunables.
    pub fn apply(&self, tunables: &mut Tunables) {
        let (target, value) = match *self {
            TechEffect::Set { target, value } => (target, value),
            TechEffect::Add { target, amount } => {
                (target, Self::current(target, tunables) + amount)
            }
        };
        match target {
            TunableTarget::FactoryRate => tunables.factory_rate = value,
            TunableTarget::FarmRate => tunables.farm_rate = value,
            TunableTarget::MineRate => tunables.mine_rate = value,
            TunableTarget::FactoryWorkers => tunables.factory_workers = value,
            TunableTarget::FarmWorkers => tunables.farm_workers = value,
            TunableTarget::MineWorkers => tunables.mine_workers = value,
            TunableTarget::HouseCapacity => tunables.house_capacity = value,
        }
    }

    fn current(target: TunableTarget, tunables: &Tunables) -> u32 {
        match target {
            TunableTarget::FactoryRate => tunables.factory_rate,
            TunableTarget::FarmRate => tunables.farm_rate,
            TunableTarget::MineRate => tunables.mine_rate,
            TunableTarget::FactoryWorkers => tunables.factory_workers,
            TunableTarget::FarmWorkers => tunables.farm_workers,
            TunableTarget::MineWorkers => tunables.mine_workers,
            TunableTarget::HouseCapacity => tunables.house_capacity,
        }
    }
}

/// A researchable technology definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Technology {
    /// Unique identifier.
    pub id: String,
    /// Price before global scaling.
    pub base_cost: u64,
    /// Menu text surfaced to the presentation layer.
    pub description: String,
    /// The one-shot mutation granted by researching.
    pub effect: TechEffect,
}

impl Technology {
    /// Create a new technology definition.
    #[must_use]
    pub fn new(
        id: impl Into<String>,
        base_cost: u64,
        description: impl Into<String>,
        effect: TechEffect,
    ) -> Self {
        Self {
            id: id.into(),
            base_cost,
            description: description.into(),
            effect,
        }
    }
}

/// The ordered technology list and per-technology research flags.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TechTree {
    /// Fixed, ordered technology definitions.
    techs: Vec<Technology>,
    /// Researched flag per technology, same indexing.
    researched: Vec<bool>,
}

impl TechTree {
    /// Build a tree from explicit definitions.
    #[must_use]
    pub fn new(techs: Vec<Technology>) -> Self {
        let researched = vec![false; techs.len()];
        Self { techs, researched }
    }

    /// The standard industrial-era technology list, in menu order.
    #[must_use]
    pub fn standard() -> Self {
        Self::new(vec![
            Technology::new(
                "bessemer_steel_process",
                350,
                "Increases factory production to 15 resources",
                TechEffect::Set {
                    target: TunableTarget::FactoryRate,
                    value: 15,
                },
            ),
            Technology::new(
                "factory_efficiency",
                300,
                "Reduces factory worker requirement to 8",
                TechEffect::Set {
                    target: TunableTarget::FactoryWorkers,
                    value: 8,
                },
            ),
            Technology::new(
                "mccormicks_reaper",
                300,
                "Reduces farm worker requirement to 15",
                TechEffect::Set {
                    target: TunableTarget::FarmWorkers,
                    value: 15,
                },
            ),
            Technology::new(
                "advanced_farming",
                250,
                "Increases farm production to 30 resources",
                TechEffect::Set {
                    target: TunableTarget::FarmRate,
                    value: 30,
                },
            ),
            Technology::new(
                "dynamite",
                275,
                "Reduces mine worker requirement to 12",
                TechEffect::Set {
                    target: TunableTarget::MineWorkers,
                    value: 12,
                },
            ),
            Technology::new(
                "deep_mining",
                250,
                "Increases mine production to 30 resources",
                TechEffect::Set {
                    target: TunableTarget::MineRate,
                    value: 30,
                },
            ),
            Technology::new(
                "urban_housing",
                200,
                "Increases house worker capacity to 7",
                TechEffect::Add {
                    target: TunableTarget::HouseCapacity,
                    amount: 2,
                },
            ),
            Technology::new(
                "modern_medicine",
                400,
                "Increases house worker capacity to 8",
                TechEffect::Add {
                    target: TunableTarget::HouseCapacity,
                    amount: 3,
                },
            ),
        ])
    }

    /// Parse technology definitions from a RON string.
    pub fn from_ron_str(ron: &str) -> Result<Self> {
        let techs: Vec<Technology> =
            ron::from_str(ron).map_err(|e| CityError::DataParse(e.to_string()))?;
        Ok(Self::new(techs))
    }

    /// Number of technologies in the tree.
    #[must_use]
    pub fn len(&self) -> usize {
        self.techs.len()
    }

    /// Whether the tree is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.techs.is_empty()
    }

    /// Technology definition by index.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&Technology> {
        self.techs.get(index)
    }

    /// How many technologies have been researched so far.
    #[must_use]
    pub fn researched_count(&self) -> usize {
        self.researched.iter().filter(|&&r| r).count()
    }

    /// Whether the technology at `index` has been researched.
    /// Out-of-range indices read as unresearched.
    #[must_use]
    pub fn is_researched(&self, index: usize) -> bool {
        self.researched.get(index).copied().unwrap_or(false)
    }

    /// Live research price: `base_cost x 2^(researched count)`.
    ///
    /// `None` for out-of-range indices.
    #[must_use]
    pub fn cost(&self, index: usize) -> Option<u64> {
        let tech = self.techs.get(index)?;
        Some(tech.base_cost << self.researched_count())
    }

    /// Attempt to research the technology at `index`.
    ///
    /// Silently declines (returning `false`, no state change) when the index
    /// is out of range, the technology is already researched, or the balance
    /// cannot cover the live cost. On success: deducts the cost, applies the
    /// effect to `tunables`, and marks the technology researched -
    /// irreversibly. The caller must rerun labor allocation afterwards,
    /// since requirement or capacity changes can flip building activation.
    pub fn research(&mut self, index: usize, balance: &mut Fixed, tunables: &mut Tunables) -> bool {
        if self.is_researched(index) {
            return false;
        }
        let Some(cost) = self.cost(index) else {
            return false;
        };
        let price = Fixed::from_num(cost);
        if *balance < price {
            return false;
        }

        *balance -= price;
        self.techs[index].effect.apply(tunables);
        self.researched[index] = true;
        tracing::debug!(tech = %self.techs[index].id, cost, "technology researched");
        true
    }
}

impl Default for TechTree {
    fn default() -> Self {
        Self::standard()
    }
}
