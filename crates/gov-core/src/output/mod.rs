//! Output
//!
//! Aggregation of finished runs into summary metrics.

pub mod stats;

pub use stats::{aggregate, aggregate_by_key, MetricsCollector};
