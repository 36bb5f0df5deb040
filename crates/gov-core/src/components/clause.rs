//! Clauses
//!
//! Satisfiability-style constraints over coalitions of decision-makers. A
//! clause lists the members of a coalition together with the stance each one
//! is required to hold; it is satisfied when enough of them hold it.

use serde::{Deserialize, Serialize};

use gov_records::{Assignment, NodeId};

use crate::components::network::Network;
use crate::error::{GovernanceError, Result};

/// Products this close to an integer are treated as that integer.
const THRESHOLD_EPSILON: f64 = 1e-9;

/// Stance a literal requires.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Polarity {
    Support,
    Oppose,
}

impl Polarity {
    /// Whether a node holding `stance` matches this polarity.
    pub fn matches(self, stance: bool) -> bool {
        match self {
            Polarity::Support => stance,
            Polarity::Oppose => !stance,
        }
    }

    /// The stance that matches this polarity.
    pub fn required_stance(self) -> bool {
        self == Polarity::Support
    }
}

/// One (node, required polarity) pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Literal {
    pub node: NodeId,
    pub polarity: Polarity,
}

impl Literal {
    pub fn new(node: NodeId, polarity: Polarity) -> Self {
        Self { node, polarity }
    }

    pub fn is_matched(&self, assignment: &Assignment) -> bool {
        self.polarity.matches(assignment.stance(self.node))
    }
}

/// Minimum number of matching literals for a clause of `len` literals to be
/// satisfied at `threshold`.
pub fn required_matches(len: usize, threshold: f64) -> usize {
    let exact = threshold * len as f64;
    let nearest = exact.round();
    let raw = if (exact - nearest).abs() < THRESHOLD_EPSILON {
        nearest
    } else {
        exact.ceil()
    };
    if raw <= 0.0 {
        0
    } else {
        (raw as usize).min(len)
    }
}

/// A coalition constraint anchored on one node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Clause {
    anchor: NodeId,
    literals: Vec<Literal>,
}

impl Clause {
    /// Creates a clause; literals are ordered by node id.
    pub fn new(anchor: NodeId, mut literals: Vec<Literal>) -> Self {
        literals.sort_by_key(|l| l.node);
        Self { anchor, literals }
    }

    pub fn anchor(&self) -> NodeId {
        self.anchor
    }

    pub fn literals(&self) -> &[Literal] {
        &self.literals
    }

    pub fn len(&self) -> usize {
        self.literals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.literals.is_empty()
    }

    /// Polarity required of `node`, if the node is in this clause.
    pub fn polarity_of(&self, node: NodeId) -> Option<Polarity> {
        self.literals
            .binary_search_by_key(&node, |l| l.node)
            .ok()
            .map(|i| self.literals[i].polarity)
    }

    /// Number of literals the assignment matches.
    pub fn matches(&self, assignment: &Assignment) -> usize {
        self.literals
            .iter()
            .filter(|l| l.is_matched(assignment))
            .count()
    }

    pub fn required_matches(&self, threshold: f64) -> usize {
        required_matches(self.literals.len(), threshold)
    }

    /// At least `threshold` of the literals match.
    pub fn is_satisfied(&self, assignment: &Assignment, threshold: f64) -> bool {
        self.matches(assignment) >= self.required_matches(threshold)
    }
}

/// All clauses of a network, indexed by member node.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClauseSet {
    clauses: Vec<Clause>,
    #[serde(skip)]
    by_node: Vec<Vec<usize>>,
}

impl ClauseSet {
    /// Indexes clauses over a network of `node_count` nodes.
    ///
    /// Fails if any literal references a node outside `0..node_count`.
    pub fn new(clauses: Vec<Clause>, node_count: usize) -> Result<Self> {
        let mut by_node = vec![Vec::new(); node_count];
        for (ci, clause) in clauses.iter().enumerate() {
            for literal in clause.literals() {
                let slot = by_node.get_mut(literal.node.index()).ok_or_else(|| {
                    GovernanceError::invalid(
                        "clauses",
                        format!("literal references unknown node {}", literal.node),
                    )
                })?;
                slot.push(ci);
            }
        }
        Ok(Self { clauses, by_node })
    }

    pub fn len(&self) -> usize {
        self.clauses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clauses.is_empty()
    }

    pub fn clauses(&self) -> &[Clause] {
        &self.clauses
    }

    pub fn iter(&self) -> impl Iterator<Item = &Clause> {
        self.clauses.iter()
    }

    pub fn get(&self, index: usize) -> Option<&Clause> {
        self.clauses.get(index)
    }

    /// Indices of the clauses a node appears in.
    pub fn clauses_for(&self, node: NodeId) -> &[usize] {
        self.by_node
            .get(node.index())
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn node_count(&self) -> usize {
        self.by_node.len()
    }

    /// Checks that the clause set was built for a network of this size.
    pub fn check_network(&self, network: &Network) -> Result<()> {
        if self.by_node.len() == network.node_count() {
            Ok(())
        } else {
            Err(GovernanceError::invalid(
                "clauses",
                format!(
                    "built for {} nodes, network has {}",
                    self.by_node.len(),
                    network.node_count()
                ),
            ))
        }
    }

    /// Per-clause satisfaction.
    pub fn satisfied_mask(&self, assignment: &Assignment, threshold: f64) -> Vec<bool> {
        self.clauses
            .iter()
            .map(|c| c.is_satisfied(assignment, threshold))
            .collect()
    }

    pub fn satisfied_count(&self, assignment: &Assignment, threshold: f64) -> usize {
        self.clauses
            .iter()
            .filter(|c| c.is_satisfied(assignment, threshold))
            .count()
    }

    /// Satisfied clauses over all clauses; an empty set is vacuously satisfied.
    pub fn fraction_satisfied(&self, assignment: &Assignment, threshold: f64) -> f64 {
        if self.clauses.is_empty() {
            return 1.0;
        }
        self.satisfied_count(assignment, threshold) as f64 / self.clauses.len() as f64
    }
}
