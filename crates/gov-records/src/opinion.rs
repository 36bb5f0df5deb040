//! Opinion Types
//!
//! A decision-maker's stance and the per-timestep assignment of stances
//! across a whole network.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Continuous opinions at or above this value count as support.
pub const SUPPORT_CUTOFF: f64 = 0.5;

/// Dense node identifier, unique within one network (`0..N`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(pub usize);

impl NodeId {
    /// Returns the position of this node in dense per-node vectors.
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "n{}", self.0)
    }
}

/// A node's current stance on the decision.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "value")]
pub enum Opinion {
    /// Support (`true`) or oppose (`false`)
    Binary(bool),
    /// Preference in `[0, 1]`; values at or above [`SUPPORT_CUTOFF`] support
    Continuous(f64),
}

impl Opinion {
    /// Whether this opinion counts as support.
    pub fn stance(&self) -> bool {
        match self {
            Opinion::Binary(b) => *b,
            Opinion::Continuous(v) => *v >= SUPPORT_CUTOFF,
        }
    }

    /// Numeric value in `[0, 1]`; binary opinions map to 0 or 1.
    pub fn value(&self) -> f64 {
        match self {
            Opinion::Binary(true) => 1.0,
            Opinion::Binary(false) => 0.0,
            Opinion::Continuous(v) => *v,
        }
    }

    /// Returns this opinion moved to the given stance.
    ///
    /// Opinions already holding the stance are returned unchanged. A
    /// continuous value is mirrored about the cutoff; the cutoff itself
    /// mirrors onto itself, so it drops to the largest value below it.
    pub fn with_stance(self, stance: bool) -> Self {
        if self.stance() == stance {
            return self;
        }
        match self {
            Opinion::Binary(_) => Opinion::Binary(stance),
            Opinion::Continuous(v) => {
                let mirrored = 1.0 - v;
                if (mirrored >= SUPPORT_CUTOFF) == stance {
                    Opinion::Continuous(mirrored)
                } else if stance {
                    Opinion::Continuous(SUPPORT_CUTOFF)
                } else {
                    Opinion::Continuous(SUPPORT_CUTOFF - f64::EPSILON)
                }
            }
        }
    }

    /// Returns this opinion with its stance reversed.
    pub fn flipped(self) -> Self {
        let stance = self.stance();
        self.with_stance(!stance)
    }
}

/// Opinions of every node at one timestep, indexed by [`NodeId`].
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Assignment(Vec<Opinion>);

impl Assignment {
    pub fn new(opinions: Vec<Opinion>) -> Self {
        Self(opinions)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, node: NodeId) -> Option<Opinion> {
        self.0.get(node.index()).copied()
    }

    /// Stance of a node; nodes outside the assignment count as opposing.
    pub fn stance(&self, node: NodeId) -> bool {
        self.get(node).map(|o| o.stance()).unwrap_or(false)
    }

    pub fn opinions(&self) -> &[Opinion] {
        &self.0
    }

    pub fn into_opinions(self) -> Vec<Opinion> {
        self.0
    }

    /// Number of supporting nodes.
    pub fn support_count(&self) -> usize {
        self.0.iter().filter(|o| o.stance()).count()
    }

    /// Fraction of supporting nodes (0.0 for an empty assignment).
    pub fn support_fraction(&self) -> f64 {
        if self.0.is_empty() {
            return 0.0;
        }
        self.support_count() as f64 / self.0.len() as f64
    }

    /// Mean opinion value in `[0, 1]`.
    pub fn mean_value(&self) -> f64 {
        if self.0.is_empty() {
            return 0.0;
        }
        self.0.iter().map(Opinion::value).sum::<f64>() / self.0.len() as f64
    }

    /// Number of nodes whose stance differs between two assignments.
    pub fn stance_changes(&self, other: &Assignment) -> usize {
        self.0
            .iter()
            .zip(other.0.iter())
            .filter(|(a, b)| a.stance() != b.stance())
            .count()
    }
}
