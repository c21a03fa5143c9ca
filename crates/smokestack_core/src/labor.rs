//! Worker pool and labor allocation.
//!
//! Housing capacity creates the worker pool; production buildings draw from
//! it greedily in placement order. The pass is non-backtracking: a building
//! skipped for lack of workers is never revisited, though a later building
//! with a smaller requirement can still activate.

use serde::{Deserialize, Serialize};

use crate::catalog::{Building, BuildingKind};

/// Live global tunables mutated by technology effects.
///
/// These were free-floating module state in earlier designs; holding them in
/// one struct owned by the city makes technology effects plain data applied
/// to a value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tunables {
    /// Resources paid per factory per production interval.
    pub factory_rate: u32,
    /// Resources paid per farm per production interval.
    pub farm_rate: u32,
    /// Resources paid per mine per production interval.
    pub mine_rate: u32,
    /// Workers required to activate a factory.
    pub factory_workers: u32,
    /// Workers required to activate a farm.
    pub farm_workers: u32,
    /// Workers required to activate a mine.
    pub mine_workers: u32,
    /// Workers supplied per house.
    pub house_capacity: u32,
}

impl Default for Tunables {
    fn default() -> Self {
        Self {
            factory_rate: 10,
            farm_rate: 20,
            mine_rate: 20,
            factory_workers: 10,
            farm_workers: 20,
            mine_workers: 15,
            house_capacity: 5,
        }
    }
}

impl Tunables {
    /// Live production rate for a kind; zero for non-producing kinds.
    #[must_use]
    pub fn rate(&self, kind: BuildingKind) -> u32 {
        match kind {
            BuildingKind::Factory => self.factory_rate,
            BuildingKind::Farm => self.farm_rate,
            BuildingKind::Mine => self.mine_rate,
            BuildingKind::House | BuildingKind::Railroad => 0,
        }
    }

    /// Worker requirement for a kind; zero for non-producing kinds.
    #[must_use]
    pub fn worker_requirement(&self, kind: BuildingKind) -> u32 {
        match kind {
            BuildingKind::Factory => self.factory_workers,
            BuildingKind::Farm => self.farm_workers,
            BuildingKind::Mine => self.mine_workers,
            BuildingKind::House | BuildingKind::Railroad => 0,
        }
    }
}

/// Snapshot of the worker pool after an allocation pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct WorkerPool {
    /// Total workers supplied by housing.
    pub total: u32,
    /// Workers left unassigned after the greedy pass.
    pub available: u32,
}

/// Recompute every building's activation from scratch.
///
/// Total workers = house count x house capacity. Production buildings are
/// reset to inactive, then activated greedily in insertion order while
/// workers remain. Houses and railroads are always active for rendering and
/// carry no worker cost beyond houses supplying capacity.
///
/// Must run after every placement, after every successful research, and once
/// per simulation frame.
pub fn reallocate(buildings: &mut [Building], tunables: &Tunables) -> WorkerPool {
    let house_count = buildings
        .iter()
        .filter(|b| b.kind == BuildingKind::House)
        .count() as u32;
    let total = house_count * tunables.house_capacity;
    let mut available = total;

    for building in buildings.iter_mut() {
        if building.kind.is_production() {
            building.active = false;
        } else {
            building.active = true;
        }
    }

    for building in buildings.iter_mut() {
        if !building.kind.is_production() {
            continue;
        }
        let requirement = tunables.worker_requirement(building.kind);
        if available >= requirement {
            available -= requirement;
            building.active = true;
        }
    }

    WorkerPool { total, available }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn house() -> Building {
        Building::new(BuildingKind::House, (0, 0))
    }

    #[test]
    fn test_total_from_housing() {
        let tunables = Tunables::default();
        let mut buildings = vec![house(), house(), house()];
        let pool = reallocate(&mut buildings, &tunables);
        assert_eq!(pool.total, 15);
        assert_eq!(pool.available, 15);
    }

    #[test]
    fn test_greedy_activation_in_placement_order() {
        let tunables = Tunables::default();
        // 4 houses = 20 workers; the farm placed first claims all 20,
        // leaving the mine (15) inactive.
        let mut buildings = vec![
            house(),
            house(),
            house(),
            house(),
            Building::new(BuildingKind::Farm, (2, 0)),
            Building::new(BuildingKind::Mine, (4, 0)),
        ];
        let pool = reallocate(&mut buildings, &tunables);
        assert!(buildings[4].active);
        assert!(!buildings[5].active);
        assert_eq!(pool.available, 0);
    }

    #[test]
    fn test_earlier_equal_requirement_wins() {
        let tunables = Tunables::default();
        // 20 workers, two farms at 20 each: only the first activates.
        let mut buildings = vec![
            house(),
            house(),
            house(),
            house(),
            Building::new(BuildingKind::Farm, (2, 0)),
            Building::new(BuildingKind::Farm, (4, 0)),
        ];
        reallocate(&mut buildings, &tunables);
        assert!(buildings[4].active);
        assert!(!buildings[5].active);
    }

    #[test]
    fn test_skipped_building_never_revisited() {
        let tunables = Tunables::default();
        // 25 workers: farm (20) activates, mine (15) is skipped with 5 left,
        // then a factory (10) is also skipped. Non-backtracking means the
        // mine stays inactive even though skipping the farm would have
        // fit mine + factory.
        let mut buildings = vec![
            house(),
            house(),
            house(),
            house(),
            house(),
            Building::new(BuildingKind::Farm, (2, 0)),
            Building::new(BuildingKind::Mine, (4, 0)),
            Building::new(BuildingKind::Factory, (6, 0)),
        ];
        let pool = reallocate(&mut buildings, &tunables);
        assert!(buildings[5].active);
        assert!(!buildings[6].active);
        assert!(!buildings[7].active);
        assert_eq!(pool.available, 5);
    }

    #[test]
    fn test_later_smaller_requirement_still_activates() {
        let tunables = Tunables::default();
        // 15 workers: farm (20) skipped, factory (10) after it activates.
        let mut buildings = vec![
            house(),
            house(),
            house(),
            Building::new(BuildingKind::Farm, (2, 0)),
            Building::new(BuildingKind::Factory, (4, 0)),
        ];
        let pool = reallocate(&mut buildings, &tunables);
        assert!(!buildings[3].active);
        assert!(buildings[4].active);
        assert_eq!(pool.available, 5);
    }

    #[test]
    fn test_labor_conservation() {
        let tunables = Tunables::default();
        let mut buildings = vec![
            house(),
            house(),
            house(),
            house(),
            house(),
            house(),
            Building::new(BuildingKind::Factory, (2, 0)),
            Building::new(BuildingKind::Farm, (4, 0)),
            Building::new(BuildingKind::Mine, (6, 0)),
            Building::new(BuildingKind::Railroad, (8, 0)),
        ];
        let pool = reallocate(&mut buildings, &tunables);

        let assigned: u32 = buildings
            .iter()
            .filter(|b| b.kind.is_production() && b.active)
            .map(|b| tunables.worker_requirement(b.kind))
            .sum();
        assert_eq!(pool.available + assigned, pool.total);
        assert_eq!(pool.total, 30);
    }

    #[test]
    fn test_houses_and_railroads_always_active() {
        let tunables = Tunables::default();
        let mut buildings = vec![house(), Building::new(BuildingKind::Railroad, (2, 0))];
        reallocate(&mut buildings, &tunables);
        assert!(buildings[0].active);
        assert!(buildings[1].active);
    }

    #[test]
    fn test_allocation_resets_previous_pass() {
        let mut tunables = Tunables::default();
        // 20 workers activate the farm...
        let mut buildings = vec![
            house(),
            house(),
            house(),
            house(),
            Building::new(BuildingKind::Farm, (2, 0)),
        ];
        reallocate(&mut buildings, &tunables);
        assert!(buildings[4].active);

        // ...but a capacity drop deactivates it on the next pass.
        tunables.house_capacity = 4;
        let pool = reallocate(&mut buildings, &tunables);
        assert!(!buildings[4].active);
        assert_eq!(pool.total, 16);
        assert_eq!(pool.available, 16);
    }
}
