//! # Smokestack Headless
//!
//! Headless scenario runner for the Smokestack simulation core.
//!
//! Loads a RON scenario (start condition plus a command script keyed by
//! frame number), drives [`smokestack_core::city::CityState`] at a fixed
//! timestep, and summarizes the run as JSON. Designed for CI verification
//! and balance experiments - no graphics, no audio, no input devices.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod runner;
pub mod scenario;
