//! Run Statistics
//!
//! Collects finished runs and reduces them to a [`MetricsSummary`].
//! Collection has no side effects beyond the collector itself.

use std::borrow::Borrow;
use std::collections::BTreeMap;

use gov_records::{MetricsSummary, RunResult, RunRow};

/// Running totals over a group of runs.
#[derive(Debug, Clone, Default)]
pub struct MetricsCollector {
    pub runs: usize,
    pub converged: usize,
    pub max_steps_reached: usize,
    pub accepted: usize,
    final_fraction_sum: f64,
    convergence_time_sum: f64,
    steps_sum: f64,
}

impl MetricsCollector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_run(&mut self, run: &RunResult) {
        let outcome = run.outcome();
        self.record(
            outcome.time_to_convergence(),
            outcome.steps(),
            run.final_fraction_satisfied(),
            run.accepted(),
        );
    }

    /// Records a run that has already been flattened to a row, e.g. one read
    /// back from disk.
    pub fn record_row(&mut self, row: &RunRow) {
        let time = if row.is_converged() {
            row.time_to_convergence.or(Some(row.steps))
        } else {
            None
        };
        self.record(time, row.steps, row.final_fraction_satisfied, row.accepted);
    }

    fn record(&mut self, time_to_convergence: Option<u32>, steps: u32, fraction: f64, accepted: bool) {
        self.runs += 1;
        match time_to_convergence {
            Some(t) => {
                self.converged += 1;
                self.convergence_time_sum += f64::from(t);
            }
            None => self.max_steps_reached += 1,
        }
        if accepted {
            self.accepted += 1;
        }
        self.final_fraction_sum += fraction;
        self.steps_sum += f64::from(steps);
    }

    pub fn generate_summary(&self) -> MetricsSummary {
        if self.runs == 0 {
            return MetricsSummary::empty();
        }
        let runs = self.runs as f64;
        MetricsSummary {
            runs: self.runs,
            converged: self.converged,
            max_steps_reached: self.max_steps_reached,
            accepted: self.accepted,
            convergence_rate: self.converged as f64 / runs,
            acceptance_rate: self.accepted as f64 / runs,
            mean_final_fraction_satisfied: Some(self.final_fraction_sum / runs),
            mean_time_to_convergence: (self.converged > 0)
                .then(|| self.convergence_time_sum / self.converged as f64),
            mean_steps: Some(self.steps_sum / runs),
        }
    }
}

/// Summarizes a group of runs.
pub fn aggregate<I, R>(runs: I) -> MetricsSummary
where
    I: IntoIterator<Item = R>,
    R: Borrow<RunResult>,
{
    let mut collector = MetricsCollector::new();
    for run in runs {
        collector.record_run(run.borrow());
    }
    collector.generate_summary()
}

/// Summarizes runs grouped by a configuration key, in key order.
pub fn aggregate_by_key<K, I, R>(runs: I) -> BTreeMap<K, MetricsSummary>
where
    K: Ord,
    I: IntoIterator<Item = (K, R)>,
    R: Borrow<RunResult>,
{
    let mut collectors: BTreeMap<K, MetricsCollector> = BTreeMap::new();
    for (key, run) in runs {
        collectors.entry(key).or_default().record_run(run.borrow());
    }
    collectors
        .into_iter()
        .map(|(key, collector)| (key, collector.generate_summary()))
        .collect()
}
