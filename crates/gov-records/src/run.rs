//! Run Records
//!
//! The trajectory of one governance run: a timestep-ordered sequence of
//! records and the terminal state the run ended in.
//!
//! A run is assembled through [`RunRecorder`], which only ever appends.
//! [`RunRecorder::finish`] seals it into a [`RunResult`] with no mutators.

use serde::{Deserialize, Serialize};

use crate::opinion::Assignment;
use crate::rows::{RunRow, StepRow};

/// Why a run converged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConvergenceReason {
    /// The assignment stopped changing
    FixedPoint,
    /// The satisfied fraction crossed the acceptance threshold
    Accepted,
}

/// Terminal state of a governance run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "state")]
pub enum RunOutcome {
    /// Reached a fixed point or accepted early, at the given timestep
    Converged { reason: ConvergenceReason, step: u32 },
    /// Hit the step ceiling without converging. Not a failure.
    MaxStepsReached { steps: u32 },
}

impl RunOutcome {
    pub fn is_converged(&self) -> bool {
        matches!(self, RunOutcome::Converged { .. })
    }

    /// Number of update steps that were applied.
    pub fn steps(&self) -> u32 {
        match self {
            RunOutcome::Converged { step, .. } => *step,
            RunOutcome::MaxStepsReached { steps } => *steps,
        }
    }

    /// Timestep at which the run converged, if it did.
    pub fn time_to_convergence(&self) -> Option<u32> {
        match self {
            RunOutcome::Converged { step, .. } => Some(*step),
            RunOutcome::MaxStepsReached { .. } => None,
        }
    }

    pub fn reason(&self) -> Option<ConvergenceReason> {
        match self {
            RunOutcome::Converged { reason, .. } => Some(*reason),
            RunOutcome::MaxStepsReached { .. } => None,
        }
    }

    /// Short label used in tabular output.
    pub fn label(&self) -> &'static str {
        match self {
            RunOutcome::Converged { .. } => "converged",
            RunOutcome::MaxStepsReached { .. } => "max_steps_reached",
        }
    }
}

/// One timestep of a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepRecord {
    pub timestep: u32,
    pub fraction_satisfied: f64,
    pub assignment: Assignment,
}

/// Append-only builder for a [`RunResult`].
#[derive(Debug, Clone)]
pub struct RunRecorder {
    seed: u64,
    records: Vec<StepRecord>,
}

impl RunRecorder {
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            records: Vec::new(),
        }
    }

    /// Appends a record. Timesteps must be strictly increasing.
    pub fn record(&mut self, record: StepRecord) {
        debug_assert!(
            self.records
                .last()
                .map_or(true, |last| last.timestep < record.timestep),
            "timesteps must increase"
        );
        self.records.push(record);
    }

    pub fn last(&self) -> Option<&StepRecord> {
        self.records.last()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Seals the trajectory.
    pub fn finish(self, outcome: RunOutcome, acceptance_threshold: f64) -> RunResult {
        let accepted = self
            .records
            .last()
            .map_or(false, |r| r.fraction_satisfied >= acceptance_threshold);
        RunResult {
            seed: self.seed,
            records: self.records,
            outcome,
            accepted,
            acceptance_threshold,
        }
    }
}

/// Completed trajectory of one governance run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunResult {
    seed: u64,
    records: Vec<StepRecord>,
    outcome: RunOutcome,
    accepted: bool,
    acceptance_threshold: f64,
}

impl RunResult {
    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn records(&self) -> &[StepRecord] {
        &self.records
    }

    pub fn outcome(&self) -> RunOutcome {
        self.outcome
    }

    /// Whether the final assignment met the acceptance threshold.
    pub fn accepted(&self) -> bool {
        self.accepted
    }

    pub fn acceptance_threshold(&self) -> f64 {
        self.acceptance_threshold
    }

    pub fn is_converged(&self) -> bool {
        self.outcome.is_converged()
    }

    pub fn steps(&self) -> u32 {
        self.outcome.steps()
    }

    pub fn final_record(&self) -> Option<&StepRecord> {
        self.records.last()
    }

    /// Satisfied fraction of the last recorded assignment (0.0 if empty).
    pub fn final_fraction_satisfied(&self) -> f64 {
        self.final_record().map_or(0.0, |r| r.fraction_satisfied)
    }

    /// The sequence of assignments, one per timestep.
    pub fn assignments(&self) -> impl Iterator<Item = &Assignment> {
        self.records.iter().map(|r| &r.assignment)
    }

    /// One tabular row per timestep.
    pub fn step_rows(&self, label: &str) -> Vec<StepRow> {
        self.records
            .iter()
            .map(|r| StepRow {
                label: label.to_string(),
                seed: self.seed,
                timestep: r.timestep,
                fraction_satisfied: r.fraction_satisfied,
                support_fraction: r.assignment.support_fraction(),
                mean_opinion: r.assignment.mean_value(),
            })
            .collect()
    }

    /// A single tabular row summarizing the run.
    pub fn run_row(&self, label: &str) -> RunRow {
        RunRow {
            label: label.to_string(),
            seed: self.seed,
            outcome: self.outcome.label().to_string(),
            convergence_reason: self.outcome.reason(),
            steps: self.outcome.steps(),
            time_to_convergence: self.outcome.time_to_convergence(),
            final_fraction_satisfied: self.final_fraction_satisfied(),
            final_support_fraction: self
                .final_record()
                .map_or(0.0, |r| r.assignment.support_fraction()),
            accepted: self.accepted,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::opinion::Opinion;

    fn record(timestep: u32, fraction: f64) -> StepRecord {
        StepRecord {
            timestep,
            fraction_satisfied: fraction,
            assignment: Assignment::new(vec![Opinion::Binary(true), Opinion::Binary(false)]),
        }
    }

    #[test]
    fn test_outcome_serialization() {
        let converged = RunOutcome::Converged {
            reason: ConvergenceReason::FixedPoint,
            step: 3,
        };
        let json = serde_json::to_string(&converged).unwrap();
        assert_eq!(json, r#"{"state":"converged","reason":"fixed_point","step":3}"#);

        let stalled = RunOutcome::MaxStepsReached { steps: 10 };
        let json = serde_json::to_string(&stalled).unwrap();
        assert_eq!(json, r#"{"state":"max_steps_reached","steps":10}"#);
    }

    #[test]
    fn test_outcome_accessors() {
        let converged = RunOutcome::Converged {
            reason: ConvergenceReason::Accepted,
            step: 2,
        };
        assert!(converged.is_converged());
        assert_eq!(converged.time_to_convergence(), Some(2));
        assert_eq!(converged.reason(), Some(ConvergenceReason::Accepted));

        let stalled = RunOutcome::MaxStepsReached { steps: 5 };
        assert!(!stalled.is_converged());
        assert_eq!(stalled.steps(), 5);
        assert_eq!(stalled.time_to_convergence(), None);
    }

    #[test]
    fn test_recorder_finish_sets_acceptance() {
        let mut recorder = RunRecorder::new(42);
        recorder.record(record(0, 0.4));
        recorder.record(record(1, 0.8));
        let result = recorder.finish(RunOutcome::MaxStepsReached { steps: 1 }, 0.75);

        assert_eq!(result.seed(), 42);
        assert_eq!(result.records().len(), 2);
        assert!(result.accepted());
        assert_eq!(result.final_fraction_satisfied(), 0.8);
    }

    #[test]
    fn test_empty_recorder() {
        let result = RunRecorder::new(1).finish(RunOutcome::MaxStepsReached { steps: 0 }, 0.5);
        assert!(!result.accepted());
        assert_eq!(result.final_fraction_satisfied(), 0.0);
    }

    #[test]
    fn test_rows() {
        let mut recorder = RunRecorder::new(7);
        recorder.record(record(0, 0.5));
        let result = recorder.finish(
            RunOutcome::Converged {
                reason: ConvergenceReason::FixedPoint,
                step: 0,
            },
            1.0,
        );

        let steps = result.step_rows("baseline");
        assert_eq!(steps.len(), 1);
        assert_eq!(steps[0].support_fraction, 0.5);

        let row = result.run_row("baseline");
        assert_eq!(row.outcome, "converged");
        assert_eq!(row.time_to_convergence, Some(0));
        assert!(!row.accepted);
    }
}
