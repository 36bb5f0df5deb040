//! Parameter sweeps over the governance simulation.
//!
//! A sweep expands a TOML grid into (configuration, seed) jobs, runs them in
//! parallel and writes one JSON line per run:
//!
//! ```text
//! sweep.toml ──▶ SweepPlan ──▶ SweepRunner (rayon) ──▶ OutputWriter
//!                                                        ├── runs.jsonl
//!                                                        ├── steps.jsonl (optional)
//!                                                        └── summary.json
//! ```

pub mod config;
pub mod output;
pub mod plan;
pub mod runner;

pub use config::{default_sweep_toml, ConfigError, GridConfig, SweepConfig, SweepSettings};
pub use output::{OutputError, OutputReader, OutputWriter};
pub use plan::{SweepPlan, SweepPoint};
pub use runner::{InvalidJob, JobResult, SweepError, SweepReport, SweepRunner};
