//! Metrics Summary
//!
//! Aggregate statistics over repeated runs of one parameter configuration.

use serde::{Deserialize, Serialize};

/// Summary scalars for a group of runs.
///
/// Means are `None` when no run contributes to them: an empty group, or a
/// group in which no run converged for `mean_time_to_convergence`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct MetricsSummary {
    pub runs: usize,
    pub converged: usize,
    pub max_steps_reached: usize,
    pub accepted: usize,
    /// converged / runs
    pub convergence_rate: f64,
    /// accepted / runs
    pub acceptance_rate: f64,
    pub mean_final_fraction_satisfied: Option<f64>,
    /// Averaged over converged runs only
    pub mean_time_to_convergence: Option<f64>,
    pub mean_steps: Option<f64>,
}

impl MetricsSummary {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.runs == 0
    }

    /// Fraction of runs that hit the step ceiling.
    pub fn non_convergence_rate(&self) -> f64 {
        if self.runs == 0 {
            return 0.0;
        }
        self.max_steps_reached as f64 / self.runs as f64
    }
}
