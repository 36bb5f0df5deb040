//! Experiment pipeline: network, opinions, clauses and governance for one seed.

use tracing::debug;

use gov_records::RunResult;

use crate::config::ExperimentConfig;
use crate::error::Result;
use crate::rng::{stream_rng, Stream};
use crate::setup::{assign_opinions, build_clauses, generate_network};
use crate::systems::GovernanceProcess;

/// Runs the full pipeline for one master seed.
///
/// The configuration is validated before anything is generated. Network and
/// opinions draw from separate streams of `seed`.
pub fn run_experiment(config: &ExperimentConfig, seed: u64) -> Result<RunResult> {
    config.validate()?;

    let mut network = generate_network(&config.network, &mut stream_rng(seed, Stream::Network))?;
    assign_opinions(
        &mut network,
        &config.opinions,
        &mut stream_rng(seed, Stream::Opinions),
    )?;
    let clauses = build_clauses(&network, &config.clauses)?;

    debug!(
        seed,
        nodes = network.node_count(),
        edges = network.edge_count(),
        clauses = clauses.len(),
        "starting governance run"
    );
    GovernanceProcess::new(network, clauses, config.process.clone(), seed)?.run()
}

/// Runs the pipeline once per seed, in order.
pub fn run_repeated(
    config: &ExperimentConfig,
    seeds: impl IntoIterator<Item = u64>,
) -> Result<Vec<RunResult>> {
    seeds
        .into_iter()
        .map(|seed| run_experiment(config, seed))
        .collect()
}
