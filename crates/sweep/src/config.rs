//! Sweep configuration loading.
//!
//! A sweep file holds a base experiment plus the axes to vary. Every section
//! is optional; an empty axis keeps the base value.

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

use gov_core::{ExperimentConfig, GovernanceRule};

/// Complete sweep configuration.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SweepConfig {
    /// Run settings
    #[serde(default)]
    pub sweep: SweepSettings,
    /// Experiment every grid point starts from
    #[serde(default)]
    pub base: ExperimentConfig,
    /// Axes to vary
    #[serde(default)]
    pub grid: GridConfig,
}

/// How many seeds to run and where output goes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SweepSettings {
    /// Seeds per grid point
    pub seeds: u64,
    /// First seed; point seeds are `base_seed..base_seed + seeds`
    pub base_seed: u64,
    /// Also write one row per timestep
    pub record_steps: bool,
    /// Worker threads (rayon's default when unset)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub threads: Option<usize>,
}

impl Default for SweepSettings {
    fn default() -> Self {
        Self {
            seeds: 10,
            base_seed: 0,
            record_steps: false,
            threads: None,
        }
    }
}

/// Values to sweep. The grid is the cartesian product of all non-empty axes.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GridConfig {
    pub nodes: Vec<usize>,
    /// Replaces the base topology with a random network of each probability
    pub edge_probability: Vec<f64>,
    pub rule: Vec<GovernanceRule>,
    pub clause_threshold: Vec<f64>,
    pub acceptance_threshold: Vec<f64>,
    pub min_size: Vec<usize>,
}

impl GridConfig {
    /// Number of grid points, counting an empty axis as one value.
    pub fn point_count(&self) -> usize {
        [
            self.nodes.len(),
            self.edge_probability.len(),
            self.rule.len(),
            self.clause_threshold.len(),
            self.acceptance_threshold.len(),
            self.min_size.len(),
        ]
        .iter()
        .map(|&n| n.max(1))
        .product()
    }
}

impl SweepConfig {
    /// Loads configuration from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_str(&content)
    }

    /// Parses configuration from a TOML string.
    pub fn from_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Serializes the configuration as TOML.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }
}

/// Errors that can occur during configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("TOML serialize error: {0}")]
    Serialize(#[from] toml::ser::Error),
}

/// Generates a default sweep file.
pub fn default_sweep_toml() -> String {
    r#"# Governance Sweep Configuration

[sweep]
seeds = 10
base_seed = 0
record_steps = false

[base.network]
nodes = 100

[base.network.topology]
kind = "random"
edge_probability = 0.05

[base.opinions]
kind = "beta"
alpha = 2.0
beta = 2.0

[base.clauses]
min_size = 2
polarity = "support"

[base.process]
rule = "majority_update"
clause_threshold = 0.5
acceptance_threshold = 1.0
stop_on_acceptance = false
max_steps = 100

[grid]
edge_probability = [0.02, 0.05, 0.1]
rule = ["majority_update", "threshold_acceptance", "global_acceptance"]
"#
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use gov_core::OpinionModel;

    #[test]
    fn test_default_config() {
        let config = SweepConfig::default();

        assert_eq!(config.sweep.seeds, 10);
        assert_eq!(config.sweep.base_seed, 0);
        assert!(!config.sweep.record_steps);
        assert_eq!(config.grid.point_count(), 1);
    }

    #[test]
    fn test_parse_config_from_toml() {
        let toml = r#"
            [sweep]
            seeds = 3
            threads = 2

            [base.network]
            nodes = 20

            [grid]
            nodes = [10, 20]
            clause_threshold = [0.25, 0.5, 0.75]
        "#;

        let config = SweepConfig::from_str(toml).unwrap();

        assert_eq!(config.sweep.seeds, 3);
        assert_eq!(config.sweep.threads, Some(2));
        assert_eq!(config.base.network.nodes, 20);
        assert_eq!(config.grid.nodes, vec![10, 20]);
        assert_eq!(config.grid.point_count(), 6);
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let toml = r#"
            [grid]
            rule = ["global_acceptance"]
        "#;

        let config = SweepConfig::from_str(toml).unwrap();

        // Specified value
        assert_eq!(config.grid.rule, vec![GovernanceRule::GlobalAcceptance]);
        // Default values
        assert_eq!(config.sweep.seeds, 10);
        assert_eq!(config.base, ExperimentConfig::default());
    }

    #[test]
    fn test_invalid_toml_is_parse_error() {
        let err = SweepConfig::from_str("[grid]\nrule = [\"coin_toss\"]").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_config_to_toml() {
        let config = SweepConfig::default();
        let toml = config.to_toml().unwrap();

        assert!(toml.contains("[sweep]"));
        assert!(toml.contains("[base.process]") || toml.contains("[base]"));
        assert_eq!(SweepConfig::from_str(&toml).unwrap(), config);
    }

    #[test]
    fn test_default_sweep_toml_parses() {
        let config = SweepConfig::from_str(&default_sweep_toml()).unwrap();

        assert_eq!(config.grid.point_count(), 9);
        assert_eq!(
            config.base.opinions,
            OpinionModel::Beta {
                alpha: 2.0,
                beta: 2.0
            }
        );
    }
}
