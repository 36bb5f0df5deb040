//! Governance Systems
//!
//! Opinion update rules and the state machine that drives a run.

pub mod process;
pub mod rules;

pub use process::{GovernanceProcess, ProcessConfig, ProcessState};
pub use rules::{clause_repair_update, majority_update, threshold_update, GovernanceRule};
