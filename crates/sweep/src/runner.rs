//! Parallel sweep execution.
//!
//! Every (point, seed) job is independent. Jobs run on a rayon pool; a shared
//! cancel flag is checked before each job starts, so cancelling stops new work
//! but lets running jobs finish. A seed whose generated network cannot carry
//! the configured clauses is recorded as invalid and the sweep carries on.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use rayon::prelude::*;
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info, warn};

use gov_core::{aggregate_by_key, run_experiment, GovernanceError, MetricsSummary, RunResult};
use gov_records::{RunRow, StepRow};

use crate::config::ConfigError;
use crate::output::OutputError;
use crate::plan::SweepPlan;

/// Errors that can stop a sweep.
#[derive(Debug, Error)]
pub enum SweepError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("simulation error: {0}")]
    Governance(#[from] GovernanceError),

    #[error("output error: {0}")]
    Output(#[from] OutputError),

    #[error("could not build thread pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

/// One finished job.
#[derive(Debug, Clone)]
pub struct JobResult {
    pub label: String,
    /// Index into the plan's points
    pub point: usize,
    pub seed: u64,
    pub result: RunResult,
}

/// A job rejected for its seed, e.g. a sparse random network whose largest
/// neighbourhood is smaller than the clause size.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InvalidJob {
    pub label: String,
    pub point: usize,
    pub seed: u64,
    pub reason: String,
}

enum JobOutcome {
    Finished(JobResult),
    Invalid(InvalidJob),
}

/// Everything a sweep produced.
#[derive(Debug, Clone, Default)]
pub struct SweepReport {
    /// Finished jobs in plan order
    pub runs: Vec<JobResult>,
    /// Jobs rejected for their seed, in plan order
    pub invalid: Vec<InvalidJob>,
    /// Jobs never started because the sweep was cancelled
    pub skipped: usize,
    pub cancelled: bool,
}

impl SweepReport {
    /// Metrics per point label, in label order.
    pub fn summaries(&self) -> BTreeMap<String, MetricsSummary> {
        aggregate_by_key(self.runs.iter().map(|job| (job.label.clone(), &job.result)))
    }

    pub fn run_rows(&self) -> Vec<RunRow> {
        self.runs
            .iter()
            .map(|job| job.result.run_row(&job.label))
            .collect()
    }

    pub fn step_rows(&self) -> Vec<StepRow> {
        self.runs
            .iter()
            .flat_map(|job| job.result.step_rows(&job.label))
            .collect()
    }
}

pub struct SweepRunner {
    plan: SweepPlan,
    cancel: Arc<AtomicBool>,
    threads: Option<usize>,
}

impl SweepRunner {
    pub fn new(plan: SweepPlan) -> Self {
        Self {
            plan,
            cancel: Arc::new(AtomicBool::new(false)),
            threads: None,
        }
    }

    /// Runs on a dedicated pool of `threads` workers instead of rayon's
    /// global pool.
    pub fn with_threads(mut self, threads: Option<usize>) -> Self {
        self.threads = threads;
        self
    }

    /// Flag that stops the sweep when set. Clone it into whatever decides to
    /// cancel.
    pub fn cancel_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.cancel)
    }

    pub fn plan(&self) -> &SweepPlan {
        &self.plan
    }

    /// Runs every job. Invalid-parameter failures are recorded per job; any
    /// other simulation error aborts the sweep.
    pub fn run(&self) -> Result<SweepReport, SweepError> {
        info!(
            points = self.plan.points().len(),
            seeds = self.plan.seeds().len(),
            jobs = self.plan.job_count(),
            "starting sweep"
        );

        let outcomes = match self.threads {
            Some(threads) => {
                let pool = rayon::ThreadPoolBuilder::new()
                    .num_threads(threads)
                    .build()?;
                pool.install(|| self.run_jobs())?
            }
            None => self.run_jobs()?,
        };

        let mut runs = Vec::new();
        let mut invalid = Vec::new();
        for outcome in outcomes {
            match outcome {
                JobOutcome::Finished(job) => runs.push(job),
                JobOutcome::Invalid(job) => invalid.push(job),
            }
        }
        if !invalid.is_empty() {
            warn!(invalid = invalid.len(), "some seeds produced unusable networks");
        }

        let skipped = self.plan.job_count() - runs.len() - invalid.len();
        let cancelled = self.cancel.load(Ordering::SeqCst);
        if cancelled {
            warn!(finished = runs.len(), skipped, "sweep cancelled");
        } else {
            info!(finished = runs.len(), "sweep finished");
        }

        Ok(SweepReport {
            runs,
            invalid,
            skipped,
            cancelled,
        })
    }

    fn run_jobs(&self) -> Result<Vec<JobOutcome>, GovernanceError> {
        let points = self.plan.points();
        let finished: Vec<Option<JobOutcome>> = self
            .plan
            .jobs()
            .par_iter()
            .map(|&(point, seed)| -> Result<Option<JobOutcome>, GovernanceError> {
                if self.cancel.load(Ordering::SeqCst) {
                    return Ok(None);
                }
                let label = &points[point].label;
                match run_experiment(&points[point].config, seed) {
                    Ok(result) => {
                        debug!(
                            label = %label,
                            seed,
                            outcome = result.outcome().label(),
                            "job finished"
                        );
                        Ok(Some(JobOutcome::Finished(JobResult {
                            label: label.clone(),
                            point,
                            seed,
                            result,
                        })))
                    }
                    Err(e) if e.is_invalid_parameter() => {
                        debug!(label = %label, seed, error = %e, "job rejected");
                        Ok(Some(JobOutcome::Invalid(InvalidJob {
                            label: label.clone(),
                            point,
                            seed,
                            reason: e.to_string(),
                        })))
                    }
                    Err(e) => Err(e),
                }
            })
            .collect::<Result<_, _>>()?;
        Ok(finished.into_iter().flatten().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SweepConfig;
    use gov_core::{GovernanceRule, NetworkSpec};

    fn small_config() -> SweepConfig {
        let mut config = SweepConfig::default();
        config.sweep.seeds = 3;
        config.base.network = NetworkSpec::random(20, 0.2);
        config.base.process.max_steps = 20;
        config.grid.rule = vec![
            GovernanceRule::MajorityUpdate,
            GovernanceRule::GlobalAcceptance,
        ];
        config
    }

    #[test]
    fn test_runs_every_job() {
        let plan = SweepPlan::from_config(&small_config()).unwrap();
        let report = SweepRunner::new(plan).run().unwrap();

        assert_eq!(report.runs.len(), 6);
        assert_eq!(report.skipped, 0);
        assert!(!report.cancelled);

        let summaries = report.summaries();
        assert_eq!(summaries.len(), 2);
        assert!(summaries.values().all(|s| s.runs == 3));
        assert_eq!(report.run_rows().len(), 6);
    }

    #[test]
    fn test_results_independent_of_thread_count() {
        let plan = SweepPlan::from_config(&small_config()).unwrap();
        let serial = SweepRunner::new(plan.clone())
            .with_threads(Some(1))
            .run()
            .unwrap();
        let parallel = SweepRunner::new(plan).with_threads(Some(4)).run().unwrap();

        assert_eq!(serial.run_rows(), parallel.run_rows());
        assert_eq!(serial.step_rows(), parallel.step_rows());
    }

    #[test]
    fn test_cancelled_before_start_skips_everything() {
        let plan = SweepPlan::from_config(&small_config()).unwrap();
        let runner = SweepRunner::new(plan);
        runner.cancel_flag().store(true, Ordering::SeqCst);

        let report = runner.run().unwrap();

        assert!(report.cancelled);
        assert!(report.runs.is_empty());
        assert_eq!(report.skipped, 6);
        assert!(report.summaries().is_empty());
    }

    #[test]
    fn test_sparse_seeds_recorded_as_invalid() {
        let mut config = SweepConfig::default();
        config.sweep.seeds = 20;
        config.base.network.nodes = 6;
        config.grid.edge_probability = vec![0.05];

        let report = SweepRunner::new(SweepPlan::from_config(&config).unwrap())
            .run()
            .unwrap();

        assert_eq!(report.runs.len() + report.invalid.len(), 20);
        assert_eq!(report.skipped, 0);
        assert!(!report.invalid.is_empty());
        assert!(!report.runs.is_empty());
        for job in &report.invalid {
            assert_eq!(job.label, "p=0.05");
            assert!(job.reason.contains("min_size"));
            assert!(report.runs.iter().all(|run| run.seed != job.seed));
        }
    }
}
