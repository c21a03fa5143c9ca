//! Time-gated resource production.
//!
//! Each production category runs its own fixed-interval timer against the
//! simulation clock. When an interval elapses, every currently active
//! building of that kind pays out its live rate plus a railroad-proximity
//! bonus. The timer resets to the current time whether or not anything
//! fired, so an interval with zero active buildings still resets and pays
//! nothing.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::catalog::{Building, BuildingCatalog, BuildingKind};
use crate::labor::Tunables;
use crate::math::Fixed;
use crate::rail;

/// Factory payout interval in simulation milliseconds.
pub const FACTORY_INTERVAL_MS: u64 = 5_000;

/// Farm payout interval in simulation milliseconds.
pub const FARM_INTERVAL_MS: u64 = 10_000;

/// Mine payout interval in simulation milliseconds.
pub const MINE_INTERVAL_MS: u64 = 10_000;

/// A production category firing with at least one active building.
///
/// Used by the orchestrator to credit the balance and by the presentation
/// layer as its "resource produced" signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProductionEvent {
    /// Which category fired.
    pub kind: BuildingKind,
    /// How many active buildings paid out.
    pub buildings: u32,
    /// Total resources credited.
    pub amount: Fixed,
}

/// Independent per-category production timers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ProductionClock {
    /// Last factory payout evaluation, simulation ms.
    last_factory_ms: u64,
    /// Last farm payout evaluation, simulation ms.
    last_farm_ms: u64,
    /// Last mine payout evaluation, simulation ms.
    last_mine_ms: u64,
}

impl ProductionClock {
    /// Clock with all timers anchored at simulation time zero.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Evaluate every category timer at `now_ms`.
    ///
    /// Returns one event per category that fired with at least one active
    /// building. The railroad component is recomputed once per evaluation
    /// in which any timer is due; the bonus per adjacent building is
    /// `base_yield x component_size / 100`, using the kind's immutable base
    /// yield even when technology has raised the live rate.
    pub fn advance(
        &mut self,
        now_ms: u64,
        buildings: &[Building],
        catalog: &BuildingCatalog,
        tunables: &Tunables,
    ) -> Vec<ProductionEvent> {
        let factory_due = now_ms - self.last_factory_ms >= FACTORY_INTERVAL_MS;
        let farm_due = now_ms - self.last_farm_ms >= FARM_INTERVAL_MS;
        let mine_due = now_ms - self.last_mine_ms >= MINE_INTERVAL_MS;

        let mut events = Vec::new();
        if !(factory_due || farm_due || mine_due) {
            return events;
        }

        let network = rail::connected_cells(buildings, catalog);

        if factory_due {
            events.extend(payout(BuildingKind::Factory, buildings, catalog, tunables, &network));
            self.last_factory_ms = now_ms;
        }
        if farm_due {
            events.extend(payout(BuildingKind::Farm, buildings, catalog, tunables, &network));
            self.last_farm_ms = now_ms;
        }
        if mine_due {
            events.extend(payout(BuildingKind::Mine, buildings, catalog, tunables, &network));
            self.last_mine_ms = now_ms;
        }

        events
    }
}

/// Pay out one category. `None` when no building of the kind is active.
fn payout(
    kind: BuildingKind,
    buildings: &[Building],
    catalog: &BuildingCatalog,
    tunables: &Tunables,
    network: &HashSet<(u32, u32)>,
) -> Option<ProductionEvent> {
    let rate = Fixed::from_num(tunables.rate(kind));
    let base_yield = Fixed::from_num(catalog.spec(kind).base_yield);
    let component_size = Fixed::from_num(network.len() as u32);

    let mut amount = Fixed::ZERO;
    let mut count = 0u32;
    for building in buildings.iter().filter(|b| b.kind == kind && b.active) {
        let bonus = if rail::is_adjacent_to_network(building, catalog, network) {
            base_yield * component_size / Fixed::from_num(100)
        } else {
            Fixed::ZERO
        };
        amount += rate + bonus;
        count += 1;
    }

    (count > 0).then_some(ProductionEvent {
        kind,
        buildings: count,
        amount,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn active(kind: BuildingKind, cell: (u32, u32)) -> Building {
        let mut b = Building::new(kind, cell);
        b.active = true;
        b
    }

    fn rail_at(x: u32, y: u32) -> Building {
        let mut b = Building::new(BuildingKind::Railroad, (x, y));
        b.active = true;
        b
    }

    #[test]
    fn test_nothing_fires_before_interval() {
        let catalog = BuildingCatalog::standard();
        let tunables = Tunables::default();
        let buildings = vec![active(BuildingKind::Factory, (0, 0))];
        let mut clock = ProductionClock::new();

        assert!(clock.advance(4_999, &buildings, &catalog, &tunables).is_empty());
        let events = clock.advance(5_000, &buildings, &catalog, &tunables);
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].kind, BuildingKind::Factory);
        assert_eq!(events[0].amount, Fixed::from_num(10));
    }

    #[test]
    fn test_intervals_are_independent() {
        let catalog = BuildingCatalog::standard();
        let tunables = Tunables::default();
        let buildings = vec![
            active(BuildingKind::Factory, (0, 0)),
            active(BuildingKind::Farm, (4, 0)),
            active(BuildingKind::Mine, (8, 0)),
        ];
        let mut clock = ProductionClock::new();

        // At 5s only the factory fires
        let events = clock.advance(5_000, &buildings, &catalog, &tunables);
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].kind, BuildingKind::Factory);

        // At 10s the factory fires again alongside farm and mine
        let events = clock.advance(10_000, &buildings, &catalog, &tunables);
        let kinds: Vec<_> = events.iter().map(|e| e.kind).collect();
        assert_eq!(
            kinds,
            vec![BuildingKind::Factory, BuildingKind::Farm, BuildingKind::Mine]
        );
        assert_eq!(events[1].amount, Fixed::from_num(20));
        assert_eq!(events[2].amount, Fixed::from_num(20));
    }

    #[test]
    fn test_inactive_buildings_pay_nothing() {
        let catalog = BuildingCatalog::standard();
        let tunables = Tunables::default();
        let buildings = vec![Building::new(BuildingKind::Factory, (0, 0))];
        let mut clock = ProductionClock::new();

        assert!(clock.advance(5_000, &buildings, &catalog, &tunables).is_empty());
    }

    #[test]
    fn test_timer_resets_even_with_no_active_buildings() {
        let catalog = BuildingCatalog::standard();
        let tunables = Tunables::default();
        let mut buildings = vec![Building::new(BuildingKind::Factory, (0, 0))];
        let mut clock = ProductionClock::new();

        // Interval elapses with the factory idle: no payout, timer resets
        assert!(clock.advance(6_000, &buildings, &catalog, &tunables).is_empty());

        buildings[0].active = true;
        // Only 4s since the reset: still nothing
        assert!(clock.advance(10_000, &buildings, &catalog, &tunables).is_empty());
        // A full interval after the reset: fires
        let events = clock.advance(11_000, &buildings, &catalog, &tunables);
        assert_eq!(events.len(), 1);
    }

    #[test]
    fn test_railroad_bonus_uses_base_yield_and_component_size() {
        let catalog = BuildingCatalog::standard();
        let mut tunables = Tunables::default();
        // Technology has raised the live factory rate; the bonus must still
        // use the immutable base yield of 10.
        tunables.factory_rate = 15;

        // Factory at (0,0) is 2x2; railroad snake hugging its right edge
        let buildings = vec![
            active(BuildingKind::Factory, (0, 0)),
            rail_at(2, 0),
            rail_at(2, 1),
            rail_at(2, 2),
        ];
        let mut clock = ProductionClock::new();
        let events = clock.advance(5_000, &buildings, &catalog, &tunables);

        let expected = Fixed::from_num(15)
            + Fixed::from_num(10) * Fixed::from_num(3) / Fixed::from_num(100);
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].amount, expected);
    }

    #[test]
    fn test_no_bonus_when_not_adjacent() {
        let catalog = BuildingCatalog::standard();
        let tunables = Tunables::default();
        let buildings = vec![
            active(BuildingKind::Factory, (0, 0)),
            rail_at(10, 10),
            rail_at(11, 10),
        ];
        let mut clock = ProductionClock::new();
        let events = clock.advance(5_000, &buildings, &catalog, &tunables);
        assert_eq!(events[0].amount, Fixed::from_num(10));
    }

    #[test]
    fn test_multiple_active_buildings_sum() {
        let catalog = BuildingCatalog::standard();
        let tunables = Tunables::default();
        let buildings = vec![
            active(BuildingKind::Farm, (0, 0)),
            active(BuildingKind::Farm, (4, 0)),
            active(BuildingKind::Farm, (8, 0)),
        ];
        let mut clock = ProductionClock::new();
        let events = clock.advance(10_000, &buildings, &catalog, &tunables);
        assert_eq!(events[0].buildings, 3);
        assert_eq!(events[0].amount, Fixed::from_num(60));
    }
}
