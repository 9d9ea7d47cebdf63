//! Layer parameter simulation
//!
//! Alongside message playback, each session synthesizes plausible
//! per-layer metrics (signal power, throughput, buffer occupancy, ...) on
//! its own cadence, independent of message content. Values take bounded
//! random-walk steps from a seeded PRNG, so a given seed always produces
//! the same trajectory.
//!
//! # Components
//!
//! - [`catalog`] - the fixed per-layer parameter catalog (base values,
//!   bounds, walk step sizes, criticality thresholds)
//! - [`ParameterState`] - live state of one parameter, including a bounded
//!   history ring used for trend smoothing
//! - [`LayerParameterSimulator`] - the random-walk engine producing
//!   [`ParameterUpdate`] batches per tick
//!
//! # Trend and criticality
//!
//! Each update classifies the parameter's recent trajectory
//! (Increasing/Decreasing/Stable/Fluctuating, from the last few deltas
//! against a small epsilon) and its severity against per-parameter
//! Warning/Error/Critical thresholds.

pub mod catalog;
mod engine;
mod state;

pub use catalog::{ParameterSpec, Thresholds};
pub use engine::LayerParameterSimulator;
pub use state::{Criticality, ParameterState, ParameterUpdate, Trend};
