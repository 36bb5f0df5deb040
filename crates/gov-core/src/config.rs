//! Experiment configuration.
//!
//! One [`ExperimentConfig`] describes a full pipeline run: how the network is
//! generated, how opinions are seeded, how clauses are derived and how the
//! governance process evolves. Every section is optional in TOML and falls
//! back to its defaults.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{GovernanceError, Result};
use crate::setup::{ClauseSpec, NetworkSpec, OpinionModel};
use crate::systems::ProcessConfig;

/// Complete configuration of one experiment.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ExperimentConfig {
    /// Network generation
    #[serde(default)]
    pub network: NetworkSpec,
    /// Initial opinion model
    #[serde(default)]
    pub opinions: OpinionModel,
    /// Clause derivation
    #[serde(default)]
    pub clauses: ClauseSpec,
    /// Governance process
    #[serde(default)]
    pub process: ProcessConfig,
}

impl ExperimentConfig {
    /// Loads configuration from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| GovernanceError::Config(format!("{}: {}", path.display(), e)))?;
        Self::from_str(&content)
    }

    /// Parses configuration from a TOML string.
    pub fn from_str(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| GovernanceError::Config(e.to_string()))
    }

    /// Serializes the configuration as TOML.
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| GovernanceError::Config(e.to_string()))
    }

    /// Checks every section before any state is built.
    ///
    /// Clause sizes are checked against the node count here; the tighter
    /// bound against the generated network's maximum degree is applied when
    /// clauses are built.
    pub fn validate(&self) -> Result<()> {
        self.network.validate()?;
        self.opinions.validate()?;
        self.clauses.validate()?;
        self.process.validate()?;
        if self.clauses.min_size > self.network.nodes {
            return Err(GovernanceError::invalid(
                "min_size",
                format!(
                    "{} exceeds the node count ({})",
                    self.clauses.min_size, self.network.nodes
                ),
            ));
        }
        Ok(())
    }
}

/// Returns a commented default configuration.
pub fn default_config_toml() -> String {
    r#"# Governance Experiment Configuration

[network]
nodes = 100

# kind: random | complete | ring | tree | communities
[network.topology]
kind = "random"
edge_probability = 0.05

# kind: uniform_binary | uniform_continuous | beta | fixed |
#       neighbor_majority | community_aligned
[opinions]
kind = "uniform_binary"
support_probability = 0.5

[clauses]
min_size = 2
# support | community
polarity = "support"

[process]
# majority_update | threshold_acceptance | global_acceptance
rule = "majority_update"
clause_threshold = 0.5
acceptance_threshold = 1.0
stop_on_acceptance = false
max_steps = 100
"#
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::setup::{PolarityRule, Topology};
    use crate::systems::GovernanceRule;

    #[test]
    fn test_default_config() {
        let config = ExperimentConfig::default();

        assert_eq!(config.network.nodes, 100);
        assert_eq!(config.clauses.min_size, 2);
        assert_eq!(config.process.clause_threshold, 0.5);
        assert_eq!(config.process.max_steps, 100);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_config_from_toml() {
        let toml = r#"
            [network]
            nodes = 40

            [network.topology]
            kind = "communities"
            groups = 4
            p_in = 0.5
            p_out = 0.02

            [opinions]
            kind = "beta"
            alpha = 2.0
            beta = 2.0

            [clauses]
            min_size = 3
            polarity = "community"

            [process]
            rule = "global_acceptance"
            acceptance_threshold = 0.9
        "#;

        let config = ExperimentConfig::from_str(toml).unwrap();

        assert_eq!(config.network.nodes, 40);
        assert_eq!(
            config.network.topology,
            Topology::Communities {
                groups: 4,
                p_in: 0.5,
                p_out: 0.02
            }
        );
        assert_eq!(
            config.opinions,
            OpinionModel::Beta {
                alpha: 2.0,
                beta: 2.0
            }
        );
        assert_eq!(config.clauses.polarity, PolarityRule::Community);
        assert_eq!(config.process.rule, GovernanceRule::GlobalAcceptance);
        assert_eq!(config.process.acceptance_threshold, 0.9);
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let toml = r#"
            [process]
            max_steps = 10
        "#;

        let config = ExperimentConfig::from_str(toml).unwrap();

        // Specified value
        assert_eq!(config.process.max_steps, 10);
        // Default values
        assert_eq!(config.process.clause_threshold, 0.5);
        assert_eq!(config.network, NetworkSpec::default());
        assert_eq!(config.opinions, OpinionModel::default());
    }

    #[test]
    fn test_unit_topology_parses() {
        let toml = r#"
            [network]
            nodes = 10
            topology = { kind = "complete" }
        "#;
        let config = ExperimentConfig::from_str(toml).unwrap();
        assert_eq!(config.network.topology, Topology::Complete);
    }

    #[test]
    fn test_unknown_kind_is_config_error() {
        let toml = r#"
            [opinions]
            kind = "telepathy"
        "#;
        let err = ExperimentConfig::from_str(toml).unwrap_err();
        assert!(matches!(err, GovernanceError::Config(_)));
    }

    #[test]
    fn test_config_to_toml() {
        let config = ExperimentConfig::default();
        let toml = config.to_toml().unwrap();

        assert!(toml.contains("[network]"));
        assert!(toml.contains("[process]"));

        let parsed = ExperimentConfig::from_str(&toml).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn test_default_config_toml_parses() {
        let toml = default_config_toml();
        let config = ExperimentConfig::from_str(&toml).unwrap();

        assert_eq!(config, ExperimentConfig::default());
    }

    #[test]
    fn test_validate_rejects_out_of_range() {
        let mut config = ExperimentConfig::default();
        config.process.acceptance_threshold = 2.0;
        assert!(config.validate().unwrap_err().is_invalid_parameter());

        let mut config = ExperimentConfig::default();
        config.network.nodes = 3;
        config.clauses.min_size = 5;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("experiment.toml");
        std::fs::write(&path, default_config_toml()).unwrap();

        let config = ExperimentConfig::from_file(&path).unwrap();
        assert_eq!(config.network.nodes, 100);

        let missing = ExperimentConfig::from_file(&dir.path().join("missing.toml")).unwrap_err();
        assert!(matches!(missing, GovernanceError::Config(_)));
    }
}
