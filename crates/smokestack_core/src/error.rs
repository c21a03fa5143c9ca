//! Error types for the simulation core.
//!
//! Gameplay commands never error: invalid placement or research silently
//! declines with no state change. Errors exist only at the infrastructure
//! edges - snapshot encoding and data-definition parsing.

use thiserror::Error;

/// Result type alias using [`CityError`].
pub type Result<T> = std::result::Result<T, CityError>;

/// Top-level error type for simulation infrastructure failures.
#[derive(Debug, Error)]
pub enum CityError {
    /// State snapshot could not be encoded or decoded.
    #[error("Failed to encode/decode snapshot: {0}")]
    Snapshot(String),

    /// Data-definition (RON) parsing error.
    #[error("Failed to parse data definition: {0}")]
    DataParse(String),
}
