//! Railroad network connectivity analysis.
//!
//! The railroad bonus is driven by one connected component: a flood fill
//! seeded from the first-placed railroad, expanding through 4-directional
//! adjacency across railroad cells. Railroads disconnected from that seed
//! component are excluded from the bonus even though they are still
//! railroads - this is deliberate, and the production numbers depend on it.
//!
//! Both queries are pure functions over a borrowed building slice; no graph
//! is cached across ticks.

use std::collections::HashSet;

use crate::catalog::{Building, BuildingCatalog, BuildingKind};

/// 4-directional neighborhood (no diagonals).
const NEIGHBORS: [(i64, i64); 4] = [(0, 1), (0, -1), (1, 0), (-1, 0)];

/// Cells of the connected railroad component.
///
/// Empty when no railroad exists. Otherwise the flood fill is seeded from
/// the first railroad in building-list (placement) order, so which
/// component "wins" is stable across recomputation.
#[must_use]
pub fn connected_cells(
    buildings: &[Building],
    catalog: &BuildingCatalog,
) -> HashSet<(u32, u32)> {
    let rail_cells: HashSet<(u32, u32)> = buildings
        .iter()
        .filter(|b| b.kind == BuildingKind::Railroad)
        .flat_map(|b| catalog.footprint(b.kind).cells(b.cell.0, b.cell.1))
        .collect();

    let Some(seed) = buildings
        .iter()
        .find(|b| b.kind == BuildingKind::Railroad)
        .map(|b| b.cell)
    else {
        return HashSet::new();
    };

    let mut visited = HashSet::new();
    let mut to_visit = vec![seed];

    while let Some((x, y)) = to_visit.pop() {
        if !visited.insert((x, y)) {
            continue;
        }
        for (dx, dy) in NEIGHBORS {
            let nx = i64::from(x) + dx;
            let ny = i64::from(y) + dy;
            if nx < 0 || ny < 0 {
                continue;
            }
            let neighbor = (nx as u32, ny as u32);
            if rail_cells.contains(&neighbor) && !visited.contains(&neighbor) {
                to_visit.push(neighbor);
            }
        }
    }

    visited
}

/// Whether any cell bordering the building's footprint (4-directionally)
/// lies in the connected railroad component.
#[must_use]
pub fn is_adjacent_to_network(
    building: &Building,
    catalog: &BuildingCatalog,
    network: &HashSet<(u32, u32)>,
) -> bool {
    let footprint = catalog.footprint(building.kind);
    for (cx, cy) in footprint.cells(building.cell.0, building.cell.1) {
        for (dx, dy) in NEIGHBORS {
            let nx = i64::from(cx) + dx;
            let ny = i64::from(cy) + dy;
            if nx < 0 || ny < 0 {
                continue;
            }
            if network.contains(&(nx as u32, ny as u32)) {
                return true;
            }
        }
    }
    false
}
