//! Decision Matrix
//!
//! Signed issue-to-issue dependencies. A positive entry `(i, j)` says issues
//! `i` and `j` should be decided alike, a negative one that they should be
//! decided oppositely, zero that they are unrelated.

use serde::Serialize;

use gov_records::NodeId;

use crate::components::network::Network;
use crate::error::{GovernanceError, Result};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DecisionMatrix {
    size: usize,
    /// Row-major weights
    weights: Vec<f64>,
}

impl DecisionMatrix {
    /// Builds a matrix from rows. Every row must have one entry per row, and
    /// every entry must be finite.
    pub fn new(rows: Vec<Vec<f64>>) -> Result<Self> {
        let size = rows.len();
        let mut weights = Vec::with_capacity(size * size);
        for (i, row) in rows.into_iter().enumerate() {
            if row.len() != size {
                return Err(GovernanceError::invalid(
                    "decision_matrix",
                    format!("must be square: row {} has {} entries, expected {}", i, row.len(), size),
                ));
            }
            if let Some(bad) = row.iter().find(|w| !w.is_finite()) {
                return Err(GovernanceError::invalid(
                    "decision_matrix",
                    format!("row {} contains non-finite weight {}", i, bad),
                ));
            }
            weights.extend(row);
        }
        Ok(Self { size, weights })
    }

    /// A matrix with no links.
    pub fn unlinked(size: usize) -> Self {
        Self {
            size,
            weights: vec![0.0; size * size],
        }
    }

    /// Treats each node as an issue and each edge as a symmetric link.
    ///
    /// Issues in the same group (or both unlabelled) are linked with `+1`,
    /// issues in different groups with `-1`.
    pub fn from_network(network: &Network) -> Self {
        let size = network.node_count();
        let mut matrix = Self::unlinked(size);
        for edge in network.edges() {
            let (a, b) = edge.endpoints();
            let weight = if network.group(a) == network.group(b) {
                1.0
            } else {
                -1.0
            };
            matrix.weights[a.index() * size + b.index()] = weight;
            matrix.weights[b.index() * size + a.index()] = weight;
        }
        matrix
    }

    /// Number of issues.
    pub fn size(&self) -> usize {
        self.size
    }

    pub fn get(&self, i: usize, j: usize) -> f64 {
        if i < self.size && j < self.size {
            self.weights[i * self.size + j]
        } else {
            0.0
        }
    }

    pub fn row(&self, i: usize) -> &[f64] {
        let start = i * self.size;
        self.weights.get(start..start + self.size).unwrap_or(&[])
    }

    /// Issues linked from `i`, in ascending order.
    pub fn linked(&self, i: usize) -> impl Iterator<Item = usize> + '_ {
        self.row(i)
            .iter()
            .enumerate()
            .filter(move |&(j, w)| j != i && *w != 0.0)
            .map(|(j, _)| j)
    }

    /// Number of non-zero off-diagonal entries.
    pub fn link_count(&self) -> usize {
        (0..self.size).map(|i| self.linked(i).count()).sum()
    }

    /// Each link once, as `(i, j, weight)` with `i < j`.
    pub fn links(&self) -> Vec<(NodeId, NodeId, f64)> {
        (0..self.size)
            .flat_map(|i| {
                self.linked(i)
                    .filter(move |&j| j > i)
                    .map(move |j| (NodeId(i), NodeId(j), self.get(i, j)))
            })
            .collect()
    }

    pub fn is_symmetric(&self) -> bool {
        (0..self.size).all(|i| (0..i).all(|j| self.get(i, j) == self.get(j, i)))
    }
}

/// Whether the pair of outcomes agrees with the sign of the link between them.
pub(crate) fn link_agrees(weight: f64, a: bool, b: bool) -> bool {
    if weight > 0.0 {
        a == b
    } else {
        a != b
    }
}
