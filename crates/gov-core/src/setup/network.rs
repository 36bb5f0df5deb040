//! Network Generation
//!
//! Builds decision networks from a topology description and a seeded RNG.

use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::components::network::Network;
use crate::error::{check_unit_interval, GovernanceError, Result};

/// Supported network topologies.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Topology {
    /// Erdős–Rényi: every pair linked independently with `edge_probability`
    Random { edge_probability: f64 },
    /// Every pair linked
    Complete,
    /// Each node linked to its `neighbors` nearest nodes on either side
    Ring { neighbors: usize },
    /// Hierarchy where node `i > 0` reports to `(i - 1) / branching`
    Tree { branching: usize },
    /// Stochastic block model over contiguous, near-equal blocks
    Communities { groups: usize, p_in: f64, p_out: f64 },
}

impl Topology {
    pub fn name(&self) -> &'static str {
        match self {
            Topology::Random { .. } => "random",
            Topology::Complete => "complete",
            Topology::Ring { .. } => "ring",
            Topology::Tree { .. } => "tree",
            Topology::Communities { .. } => "communities",
        }
    }
}

/// Generation parameters for one network.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NetworkSpec {
    pub nodes: usize,
    pub topology: Topology,
}

impl Default for NetworkSpec {
    fn default() -> Self {
        Self {
            nodes: 100,
            topology: Topology::Random {
                edge_probability: 0.05,
            },
        }
    }
}

impl NetworkSpec {
    pub fn random(nodes: usize, edge_probability: f64) -> Self {
        Self {
            nodes,
            topology: Topology::Random { edge_probability },
        }
    }

    pub fn complete(nodes: usize) -> Self {
        Self {
            nodes,
            topology: Topology::Complete,
        }
    }

    /// Checks every parameter without generating anything.
    pub fn validate(&self) -> Result<()> {
        let n = self.nodes;
        if n == 0 {
            return Err(GovernanceError::invalid("nodes", "must be positive"));
        }
        match &self.topology {
            Topology::Random { edge_probability } => {
                check_unit_interval("edge_probability", *edge_probability)
            }
            Topology::Complete => Ok(()),
            Topology::Ring { neighbors } => {
                if 2 * neighbors < n {
                    Ok(())
                } else {
                    Err(GovernanceError::invalid(
                        "neighbors",
                        format!("ring of {} nodes needs 2 * neighbors < nodes, got {}", n, neighbors),
                    ))
                }
            }
            Topology::Tree { branching } => {
                if *branching >= 1 {
                    Ok(())
                } else {
                    Err(GovernanceError::invalid("branching", "must be at least 1"))
                }
            }
            Topology::Communities { groups, p_in, p_out } => {
                if *groups == 0 || *groups > n {
                    return Err(GovernanceError::invalid(
                        "groups",
                        format!("must be in 1..={}, got {}", n, groups),
                    ));
                }
                check_unit_interval("p_in", *p_in)?;
                check_unit_interval("p_out", *p_out)
            }
        }
    }
}

/// Generates a network. Pairs are visited in lexicographic order, so a fixed
/// seed always yields the same network.
pub fn generate_network<R: Rng + ?Sized>(spec: &NetworkSpec, rng: &mut R) -> Result<Network> {
    spec.validate()?;
    let n = spec.nodes;

    let network = match &spec.topology {
        Topology::Random { edge_probability } => {
            let p = *edge_probability;
            let mut pairs = Vec::new();
            for i in 0..n {
                for j in (i + 1)..n {
                    if rng.gen_bool(p) {
                        pairs.push((i, j));
                    }
                }
            }
            Network::from_edges(n, pairs)?
        }
        Topology::Complete => {
            let pairs = (0..n).flat_map(|i| ((i + 1)..n).map(move |j| (i, j)));
            Network::from_edges(n, pairs)?
        }
        Topology::Ring { neighbors } => {
            let k = *neighbors;
            let pairs = (0..n).flat_map(|i| (1..=k).map(move |d| (i, (i + d) % n)));
            Network::from_edges(n, pairs)?
        }
        Topology::Tree { branching } => {
            let b = *branching;
            let mut depth = vec![0u32; n];
            let mut pairs = Vec::with_capacity(n.saturating_sub(1));
            for i in 1..n {
                let parent = (i - 1) / b;
                depth[i] = depth[parent] + 1;
                pairs.push((parent, i));
            }
            Network::from_edges(n, pairs)?.with_groups(depth)?
        }
        Topology::Communities { groups, p_in, p_out } => {
            let g = *groups;
            let block: Vec<u32> = (0..n).map(|i| (i * g / n) as u32).collect();
            let mut pairs = Vec::new();
            for i in 0..n {
                for j in (i + 1)..n {
                    let p = if block[i] == block[j] { *p_in } else { *p_out };
                    if rng.gen_bool(p) {
                        pairs.push((i, j));
                    }
                }
            }
            Network::from_edges(n, pairs)?.with_groups(block)?
        }
    };

    debug!(
        topology = spec.topology.name(),
        nodes = network.node_count(),
        edges = network.edge_count(),
        "generated network"
    );
    Ok(network)
}
