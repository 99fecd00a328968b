//! Back-office core for the shop admin panel.
//!
//! Order fulfillment rules and category tree materialization, plus the
//! record store boundary and the command handlers that drive them.

pub mod config;
pub mod domain;
pub mod metrics;
pub mod store;
pub mod utils;
