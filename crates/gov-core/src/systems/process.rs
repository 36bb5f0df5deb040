//! Governance Process
//!
//! The state machine that evolves a network's opinions step by step:
//!
//! ```text
//! Initialized ──▶ Running ──┬──▶ Converged (fixed point | accepted)
//!                           └──▶ MaxStepsReached
//! ```
//!
//! Every applied step appends one record. A fixed point is detected when the
//! next assignment equals the current one; nothing is recorded for it.

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use gov_records::{Assignment, ConvergenceReason, RunOutcome, RunRecorder, RunResult, StepRecord};

use crate::components::clause::ClauseSet;
use crate::components::network::Network;
use crate::error::{check_unit_interval, GovernanceError, Result};
use crate::systems::rules::GovernanceRule;

/// Governance process parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProcessConfig {
    pub rule: GovernanceRule,
    /// Fraction of a clause's literals that must match for it to hold
    pub clause_threshold: f64,
    /// Fraction of satisfied clauses at which the decision counts as accepted
    pub acceptance_threshold: f64,
    /// End the run as soon as the acceptance threshold is met
    pub stop_on_acceptance: bool,
    pub max_steps: u32,
}

impl Default for ProcessConfig {
    fn default() -> Self {
        Self {
            rule: GovernanceRule::MajorityUpdate,
            clause_threshold: 0.5,
            acceptance_threshold: 1.0,
            stop_on_acceptance: false,
            max_steps: 100,
        }
    }
}

impl ProcessConfig {
    pub fn validate(&self) -> Result<()> {
        check_unit_interval("clause_threshold", self.clause_threshold)?;
        check_unit_interval("acceptance_threshold", self.acceptance_threshold)?;
        if self.max_steps == 0 {
            return Err(GovernanceError::invalid("max_steps", "must be at least 1"));
        }
        Ok(())
    }

    /// Whether meeting the acceptance threshold ends the run.
    pub fn stops_on_acceptance(&self) -> bool {
        self.stop_on_acceptance || self.rule.stops_on_acceptance()
    }
}

/// Lifecycle of a governance run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProcessState {
    Initialized,
    Running,
    Converged(ConvergenceReason),
    MaxStepsReached,
}

impl ProcessState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, ProcessState::Converged(_) | ProcessState::MaxStepsReached)
    }
}

/// One governance run over a network and its clauses.
#[derive(Debug, Clone)]
pub struct GovernanceProcess {
    network: Network,
    clauses: ClauseSet,
    config: ProcessConfig,
    state: ProcessState,
    timestep: u32,
    recorder: RunRecorder,
}

impl GovernanceProcess {
    /// Creates a process in the `Initialized` state.
    ///
    /// `seed` is carried into the result for provenance; the built-in rules
    /// draw no randomness.
    pub fn new(network: Network, clauses: ClauseSet, config: ProcessConfig, seed: u64) -> Result<Self> {
        config.validate()?;
        clauses.check_network(&network)?;
        Ok(Self {
            network,
            clauses,
            config,
            state: ProcessState::Initialized,
            timestep: 0,
            recorder: RunRecorder::new(seed),
        })
    }

    pub fn state(&self) -> ProcessState {
        self.state
    }

    pub fn timestep(&self) -> u32 {
        self.timestep
    }

    pub fn network(&self) -> &Network {
        &self.network
    }

    pub fn clauses(&self) -> &ClauseSet {
        &self.clauses
    }

    pub fn config(&self) -> &ProcessConfig {
        &self.config
    }

    /// Number of records appended so far.
    pub fn records(&self) -> usize {
        self.recorder.len()
    }

    pub fn current_assignment(&self) -> Assignment {
        self.network.assignment()
    }

    pub fn fraction_satisfied(&self) -> f64 {
        self.clauses
            .fraction_satisfied(&self.network.assignment(), self.config.clause_threshold)
    }

    /// Advances the state machine by one transition and returns the new state.
    /// Terminal states are left untouched.
    pub fn step(&mut self) -> Result<ProcessState> {
        match self.state {
            ProcessState::Initialized => {
                let fraction = self.record();
                self.state = ProcessState::Running;
                self.check_acceptance(fraction);
            }
            ProcessState::Running => {
                let current = self.network.assignment();
                let next = self.config.rule.next_assignment(
                    &self.network,
                    &self.clauses,
                    &current,
                    self.config.clause_threshold,
                );

                if next == current {
                    self.state = ProcessState::Converged(ConvergenceReason::FixedPoint);
                } else {
                    trace!(
                        timestep = self.timestep + 1,
                        changed = current.stance_changes(&next),
                        "applying update"
                    );
                    self.network.apply_assignment(&next)?;
                    self.timestep += 1;
                    let fraction = self.record();
                    self.check_acceptance(fraction);
                    if !self.state.is_terminal() && self.timestep >= self.config.max_steps {
                        self.state = ProcessState::MaxStepsReached;
                    }
                }
            }
            ProcessState::Converged(_) | ProcessState::MaxStepsReached => {}
        }
        Ok(self.state)
    }

    /// Steps until a terminal state and seals the trajectory.
    pub fn run(mut self) -> Result<RunResult> {
        while !self.state.is_terminal() {
            self.step()?;
        }

        let outcome = match self.state {
            ProcessState::Converged(reason) => RunOutcome::Converged {
                reason,
                step: self.timestep,
            },
            _ => RunOutcome::MaxStepsReached {
                steps: self.timestep,
            },
        };
        debug!(
            rule = self.config.rule.name(),
            outcome = outcome.label(),
            steps = self.timestep,
            final_fraction = self.fraction_satisfied(),
            "governance run finished"
        );
        Ok(self.recorder.finish(outcome, self.config.acceptance_threshold))
    }

    fn record(&mut self) -> f64 {
        let assignment = self.network.assignment();
        let fraction = self
            .clauses
            .fraction_satisfied(&assignment, self.config.clause_threshold);
        self.recorder.record(StepRecord {
            timestep: self.timestep,
            fraction_satisfied: fraction,
            assignment,
        });
        fraction
    }

    fn check_acceptance(&mut self, fraction: f64) {
        if self.config.stops_on_acceptance() && fraction >= self.config.acceptance_threshold {
            self.state = ProcessState::Converged(ConvergenceReason::Accepted);
        }
    }
}
