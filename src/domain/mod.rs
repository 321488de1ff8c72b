//! Core domain types and logic.

pub mod chart;
pub mod convergence;
pub mod descriptive;
pub mod error;
pub mod extreme_events;
pub mod fallback;
pub mod histogram;
pub mod kde;
pub mod ohlcv;
pub mod optimize;
pub mod pareto;
pub mod percentile;
pub mod return_density;
pub mod returns;
pub mod sampling;
pub mod settings;
