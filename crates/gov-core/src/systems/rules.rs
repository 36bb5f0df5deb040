//! Update Rules
//!
//! Each rule maps the current assignment to the next one. All rules are
//! synchronous: every node decides against the same snapshot, and nodes that
//! keep their stance keep their exact opinion value.

use serde::{Deserialize, Serialize};

use gov_records::{Assignment, NodeId, Opinion};

use crate::components::clause::{required_matches, ClauseSet};
use crate::components::network::Network;

/// The update and acceptance policy applied each step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GovernanceRule {
    /// Adopt the neighbourhood majority
    #[default]
    MajorityUpdate,
    /// Switch to support once enough neighbours support; never revert
    ThresholdAcceptance,
    /// Flip nodes that repair more clauses than they break
    GlobalAcceptance,
}

impl GovernanceRule {
    pub fn name(&self) -> &'static str {
        match self {
            GovernanceRule::MajorityUpdate => "majority_update",
            GovernanceRule::ThresholdAcceptance => "threshold_acceptance",
            GovernanceRule::GlobalAcceptance => "global_acceptance",
        }
    }

    /// Whether reaching the acceptance threshold always ends a run.
    pub fn stops_on_acceptance(&self) -> bool {
        matches!(self, GovernanceRule::GlobalAcceptance)
    }

    /// Computes the assignment for the next timestep.
    pub fn next_assignment(
        &self,
        network: &Network,
        clauses: &ClauseSet,
        current: &Assignment,
        clause_threshold: f64,
    ) -> Assignment {
        match self {
            GovernanceRule::MajorityUpdate => majority_update(network, current),
            GovernanceRule::ThresholdAcceptance => {
                threshold_update(network, current, clause_threshold)
            }
            GovernanceRule::GlobalAcceptance => {
                clause_repair_update(clauses, current, clause_threshold)
            }
        }
    }
}

fn current_opinion(current: &Assignment, node: NodeId) -> Opinion {
    current.get(node).unwrap_or(Opinion::Binary(false))
}

/// Each node adopts the majority stance of its neighbours. Ties and isolated
/// nodes keep their stance.
pub fn majority_update(network: &Network, current: &Assignment) -> Assignment {
    let next = network
        .node_ids()
        .map(|id| {
            let opinion = current_opinion(current, id);
            let neighbors = network.neighbors(id);
            let support = neighbors.iter().filter(|&&n| current.stance(n)).count();
            let oppose = neighbors.len() - support;
            match support.cmp(&oppose) {
                std::cmp::Ordering::Greater => opinion.with_stance(true),
                std::cmp::Ordering::Less => opinion.with_stance(false),
                std::cmp::Ordering::Equal => opinion,
            }
        })
        .collect();
    Assignment::new(next)
}

/// Opposing nodes switch to support once at least `threshold` of their
/// neighbours support. Supporters and isolated nodes never change.
pub fn threshold_update(network: &Network, current: &Assignment, threshold: f64) -> Assignment {
    let next = network
        .node_ids()
        .map(|id| {
            let opinion = current_opinion(current, id);
            let neighbors = network.neighbors(id);
            if opinion.stance() || neighbors.is_empty() {
                return opinion;
            }
            let support = neighbors.iter().filter(|&&n| current.stance(n)).count();
            if support >= required_matches(neighbors.len(), threshold) {
                opinion.with_stance(true)
            } else {
                opinion
            }
        })
        .collect();
    Assignment::new(next)
}

/// Local clause repair.
///
/// For each node, `make` counts the unsatisfied clauses a flip of that node
/// alone would satisfy and `break` the satisfied clauses it would violate.
/// Every node with `make > break` flips.
pub fn clause_repair_update(clauses: &ClauseSet, current: &Assignment, threshold: f64) -> Assignment {
    let n = current.len();
    let mut make = vec![0usize; n];
    let mut brk = vec![0usize; n];

    for clause in clauses.iter() {
        let matches = clause.matches(current);
        let required = clause.required_matches(threshold);
        for literal in clause.literals() {
            let i = literal.node.index();
            if i >= n {
                continue;
            }
            let matched = literal.is_matched(current);
            if matches < required && !matched && matches + 1 >= required {
                make[i] += 1;
            } else if matches >= required && matched && matches - 1 < required {
                brk[i] += 1;
            }
        }
    }

    let next = current
        .opinions()
        .iter()
        .enumerate()
        .map(|(i, opinion)| {
            if make[i] > brk[i] {
                opinion.flipped()
            } else {
                *opinion
            }
        })
        .collect();
    Assignment::new(next)
}
