//! Port traits between the domain and the outside world.

pub mod chart_port;
pub mod config_port;
pub mod price_source;
