//! Simulation setup: network generation, opinion seeding, clause derivation.

pub mod clauses;
pub mod network;
pub mod opinions;

pub use clauses::{build_clauses, ClauseSpec, PolarityRule};
pub use network::{generate_network, NetworkSpec, Topology};
pub use opinions::{assign_opinions, OpinionModel};
