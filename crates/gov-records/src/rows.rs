//! Tabular Rows
//!
//! Flat records for plotting collaborators: one row per timestep or per run.

use serde::{Deserialize, Serialize};

use crate::run::ConvergenceReason;

/// One timestep of one run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepRow {
    /// Parameter configuration this run belongs to
    pub label: String,
    pub seed: u64,
    pub timestep: u32,
    pub fraction_satisfied: f64,
    pub support_fraction: f64,
    pub mean_opinion: f64,
}

impl StepRow {
    /// Serializes to a single JSON line.
    pub fn to_jsonl(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    pub fn from_jsonl(line: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(line)
    }
}

/// Summary of one run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunRow {
    pub label: String,
    pub seed: u64,
    /// `converged` or `max_steps_reached`
    pub outcome: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub convergence_reason: Option<ConvergenceReason>,
    pub steps: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_to_convergence: Option<u32>,
    pub final_fraction_satisfied: f64,
    pub final_support_fraction: f64,
    pub accepted: bool,
}

impl RunRow {
    pub fn is_converged(&self) -> bool {
        self.outcome == "converged"
    }

    /// Serializes to a single JSON line.
    pub fn to_jsonl(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    pub fn from_jsonl(line: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(line)
    }
}
