//! statplots: statistical illustration charts.
//!
//! Three analyses: how the running sample mean converges (or fails to) under
//! light- and heavy-tailed distributions, a Pareto tail fit with simulated
//! extreme events, and a kernel density estimate of a stock's daily
//! log-returns fetched with source fallback.
//!
//! Hexagonal architecture: domain logic in [`domain`], port traits in [`ports`],
//! concrete implementations in [`adapters`].

pub mod adapters;
pub mod cli;
pub mod domain;
pub mod ports;
