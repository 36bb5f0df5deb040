//! Core data structures: the decision network and the clauses derived from it.

pub mod clause;
pub mod network;

pub use clause::{required_matches, Clause, ClauseSet, Literal, Polarity};
pub use network::{Edge, Network, Node};
