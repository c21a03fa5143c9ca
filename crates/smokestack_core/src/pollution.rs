//! Continuous pollution accrual.
//!
//! Pollution grows every frame in proportion to the factory count and the
//! elapsed time. Built-but-idle factories pollute exactly like active ones.
//! Pollution never decreases and has no cap.

use serde::{Deserialize, Serialize};

use crate::math::{ms_to_seconds, Fixed};

/// Tracks the last pollution update against the simulation clock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PollutionAccumulator {
    /// Last update, simulation ms.
    last_update_ms: u64,
}

impl PollutionAccumulator {
    /// Accumulator anchored at simulation time zero.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Pollution accrued since the last update:
    /// elapsed seconds x factory count.
    ///
    /// Advances the internal stamp to `now_ms` and returns the delta for the
    /// owner to add to its pollution level.
    pub fn accrue(&mut self, now_ms: u64, factory_count: u32) -> Fixed {
        let elapsed = ms_to_seconds(now_ms - self.last_update_ms);
        self.last_update_ms = now_ms;
        elapsed * Fixed::from_num(factory_count)
    }
}
