//! Shared record types and serialization for the governance simulator.
//!
//! This crate contains pure data structures with no simulation logic.
//! It is a dependency for all other crates in the workspace.

pub mod metrics;
pub mod opinion;
pub mod rows;
pub mod run;

// Re-export opinion types
pub use opinion::{Assignment, NodeId, Opinion, SUPPORT_CUTOFF};

// Re-export run types
pub use run::{ConvergenceReason, RunOutcome, RunRecorder, RunResult, StepRecord};

// Re-export row and metrics types
pub use metrics::MetricsSummary;
pub use rows::{RunRow, StepRow};
