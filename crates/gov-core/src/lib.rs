//! Core simulation logic: decision networks, opinions, clauses, governance.
//!
//! The pipeline runs leaf-first:
//!
//! ```text
//! ┌──────────┐   ┌──────────┐   ┌─────────┐   ┌────────────┐   ┌─────────┐
//! │ network  │──▶│ opinions │──▶│ clauses │──▶│ governance │──▶│ metrics │
//! └──────────┘   └──────────┘   └─────────┘   └────────────┘   └─────────┘
//! ```
//!
//! Every random component takes an explicitly seeded generator; see [`rng`].
//! [`experiment::run_experiment`] strings the stages together for one seed.

pub mod components;
pub mod config;
pub mod decision;
pub mod error;
pub mod experiment;
pub mod output;
pub mod rng;
pub mod setup;
pub mod systems;

pub use components::{Clause, ClauseSet, Edge, Literal, Network, Node, Polarity};
pub use config::{default_config_toml, ExperimentConfig};
pub use decision::{
    coherence, run_decision_process, simulate_decisions, DecisionConfig, DecisionMatrix,
    DecisionOutcome, DecisionRecord, IssueOpinionModel, IssueOpinions, OpinionUpdate,
};
pub use error::{GovernanceError, Result};
pub use experiment::{run_experiment, run_repeated};
pub use output::{aggregate, aggregate_by_key, MetricsCollector};
pub use rng::{seeded_rng, stream_rng, SimRng, Stream};
pub use setup::{
    assign_opinions, build_clauses, generate_network, ClauseSpec, NetworkSpec, OpinionModel,
    PolarityRule, Topology,
};
pub use systems::{GovernanceProcess, GovernanceRule, ProcessConfig, ProcessState};

pub use gov_records::{
    Assignment, ConvergenceReason, MetricsSummary, NodeId, Opinion, RunOutcome, RunRecorder,
    RunResult, RunRow, StepRecord, StepRow,
};
