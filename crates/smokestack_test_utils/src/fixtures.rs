//! Test fixtures and helpers.
//!
//! Pre-built city layouts and fixed-point helpers for consistent testing.

use fixed::types::I32F32;

use smokestack_core::catalog::BuildingKind;
use smokestack_core::city::CityState;

/// Create a fixed-point number from an integer.
#[must_use]
pub fn fixed(n: i32) -> I32F32 {
    I32F32::from_num(n)
}

/// Create a fixed-point number from a float (for tests only).
///
/// Note: In real simulation code, never use floats.
/// This is only for convenient test setup.
#[must_use]
pub fn fixed_f(n: f64) -> I32F32 {
    I32F32::from_num(n)
}

/// An empty board with a large balance, for layouts that need room to build.
#[must_use]
pub fn rich_city() -> CityState {
    CityState::empty(fixed(100_000))
}

/// A powered factory town: enough houses for one factory, the factory,
/// and a 3-cell railroad snake hugging its right edge.
///
/// Placement order: houses, factory, railroads - so the factory activates
/// on the first allocation pass.
#[must_use]
pub fn factory_town() -> CityState {
    let mut city = rich_city();
    assert!(city.try_place(10, 10, BuildingKind::House));
    assert!(city.try_place(11, 10, BuildingKind::House));
    assert!(city.try_place(0, 0, BuildingKind::Factory));
    assert!(city.try_place(2, 0, BuildingKind::Railroad));
    assert!(city.try_place(2, 1, BuildingKind::Railroad));
    assert!(city.try_place(2, 2, BuildingKind::Railroad));
    city
}
