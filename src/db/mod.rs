//! Database access helpers shared across handlers.

pub mod counters;
pub mod stock;
