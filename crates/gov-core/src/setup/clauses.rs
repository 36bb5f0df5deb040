//! Clause Derivation
//!
//! Turns network topology into satisfiability-style constraints. Each node
//! anchors one clause over its closed neighbourhood. No randomness is
//! involved: the same network always yields the same clauses.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::components::clause::{Clause, ClauseSet, Literal, Polarity};
use crate::components::network::Network;
use crate::error::{GovernanceError, Result};

/// How literal polarities are chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PolarityRule {
    /// Every member must support
    Support,
    /// Members sharing the anchor's group must support, others oppose
    Community,
}

/// Clause derivation parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClauseSpec {
    /// Smallest closed neighbourhood that forms a clause
    pub min_size: usize,
    pub polarity: PolarityRule,
}

impl Default for ClauseSpec {
    fn default() -> Self {
        Self {
            min_size: 2,
            polarity: PolarityRule::Support,
        }
    }
}

impl ClauseSpec {
    /// Checks the parameters that do not depend on a network.
    pub fn validate(&self) -> Result<()> {
        if self.min_size == 0 {
            return Err(GovernanceError::invalid("min_size", "must be at least 1"));
        }
        Ok(())
    }

    /// Checks `min_size` against the largest neighbourhood the network has.
    pub fn validate_for(&self, network: &Network) -> Result<()> {
        self.validate()?;
        let largest = network.max_degree() + 1;
        if self.min_size > largest {
            return Err(GovernanceError::invalid(
                "min_size",
                format!(
                    "{} exceeds the largest closed neighbourhood ({})",
                    self.min_size, largest
                ),
            ));
        }
        Ok(())
    }
}

/// Builds one clause per node whose closed neighbourhood has at least
/// `min_size` members.
pub fn build_clauses(network: &Network, spec: &ClauseSpec) -> Result<ClauseSet> {
    spec.validate_for(network)?;

    let mut clauses = Vec::new();
    for anchor in network.node_ids() {
        let members = network.closed_neighborhood(anchor);
        if members.len() < spec.min_size {
            continue;
        }
        let anchor_group = network.group(anchor);
        let literals = members
            .into_iter()
            .map(|member| {
                let polarity = match spec.polarity {
                    PolarityRule::Support => Polarity::Support,
                    PolarityRule::Community if network.group(member) == anchor_group => {
                        Polarity::Support
                    }
                    PolarityRule::Community => Polarity::Oppose,
                };
                Literal::new(member, polarity)
            })
            .collect();
        clauses.push(Clause::new(anchor, literals));
    }

    debug!(
        clauses = clauses.len(),
        min_size = spec.min_size,
        "built clauses"
    );
    ClauseSet::new(clauses, network.node_count())
}
