//! Opinion Seeding
//!
//! Assigns initial opinions to every node of a network.

use rand::seq::index::sample;
use rand::Rng;
use rand_distr::{Beta, Distribution};
use serde::{Deserialize, Serialize};
use tracing::debug;

use gov_records::{NodeId, Opinion};

use crate::components::network::Network;
use crate::error::{check_positive, check_unit_interval, GovernanceError, Result};

/// How initial opinions are drawn.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum OpinionModel {
    /// Independent binary stances
    UniformBinary { support_probability: f64 },
    /// Independent continuous values in `[0, 1)`
    UniformContinuous,
    /// Independent continuous values drawn from `Beta(alpha, beta)`
    Beta { alpha: f64, beta: f64 },
    /// Every node holds the same binary stance
    Fixed { support: bool },
    /// A random seed set flips coins; everyone else follows already-assigned
    /// neighbours
    NeighborMajority { seed_fraction: f64 },
    /// Even groups lean towards support, odd groups against
    CommunityAligned { alignment: f64 },
}

impl Default for OpinionModel {
    fn default() -> Self {
        OpinionModel::UniformBinary {
            support_probability: 0.5,
        }
    }
}

impl OpinionModel {
    pub fn name(&self) -> &'static str {
        match self {
            OpinionModel::UniformBinary { .. } => "uniform_binary",
            OpinionModel::UniformContinuous => "uniform_continuous",
            OpinionModel::Beta { .. } => "beta",
            OpinionModel::Fixed { .. } => "fixed",
            OpinionModel::NeighborMajority { .. } => "neighbor_majority",
            OpinionModel::CommunityAligned { .. } => "community_aligned",
        }
    }

    pub fn validate(&self) -> Result<()> {
        match self {
            OpinionModel::UniformBinary {
                support_probability,
            } => check_unit_interval("support_probability", *support_probability),
            OpinionModel::UniformContinuous | OpinionModel::Fixed { .. } => Ok(()),
            OpinionModel::Beta { alpha, beta } => {
                check_positive("alpha", *alpha)?;
                check_positive("beta", *beta)
            }
            OpinionModel::NeighborMajority { seed_fraction } => {
                check_unit_interval("seed_fraction", *seed_fraction)
            }
            OpinionModel::CommunityAligned { alignment } => {
                check_unit_interval("alignment", *alignment)
            }
        }
    }
}

/// Overwrites every node's opinion according to `model`.
pub fn assign_opinions<R: Rng + ?Sized>(
    network: &mut Network,
    model: &OpinionModel,
    rng: &mut R,
) -> Result<()> {
    model.validate()?;
    let n = network.node_count();

    let opinions: Vec<Opinion> = match model {
        OpinionModel::UniformBinary {
            support_probability,
        } => (0..n)
            .map(|_| Opinion::Binary(rng.gen_bool(*support_probability)))
            .collect(),
        OpinionModel::UniformContinuous => {
            (0..n).map(|_| Opinion::Continuous(rng.gen::<f64>())).collect()
        }
        OpinionModel::Beta { alpha, beta } => {
            let dist = Beta::new(*alpha, *beta)
                .map_err(|e| GovernanceError::invalid("beta", e.to_string()))?;
            (0..n).map(|_| Opinion::Continuous(dist.sample(rng))).collect()
        }
        OpinionModel::Fixed { support } => vec![Opinion::Binary(*support); n],
        OpinionModel::NeighborMajority { seed_fraction } => {
            neighbor_majority(network, *seed_fraction, rng)
        }
        OpinionModel::CommunityAligned { alignment } => network
            .nodes()
            .iter()
            .map(|node| {
                let p = match node.group {
                    Some(g) if g % 2 == 0 => *alignment,
                    Some(_) => 1.0 - *alignment,
                    None => 0.5,
                };
                Opinion::Binary(rng.gen_bool(p))
            })
            .collect(),
    };

    for (i, opinion) in opinions.into_iter().enumerate() {
        network.set_opinion(NodeId(i), opinion)?;
    }

    debug!(
        model = model.name(),
        support = network.assignment().support_count(),
        nodes = n,
        "assigned opinions"
    );
    Ok(())
}

fn neighbor_majority<R: Rng + ?Sized>(
    network: &Network,
    seed_fraction: f64,
    rng: &mut R,
) -> Vec<Opinion> {
    let n = network.node_count();
    let seeds = ((seed_fraction * n as f64).round() as usize).min(n);

    let mut stances: Vec<Option<bool>> = vec![None; n];
    let mut seed_ids = sample(rng, n, seeds).into_vec();
    seed_ids.sort_unstable();
    for i in seed_ids {
        stances[i] = Some(rng.gen_bool(0.5));
    }

    for i in 0..n {
        if stances[i].is_some() {
            continue;
        }
        let (mut support, mut oppose) = (0usize, 0usize);
        for neighbor in network.neighbors(NodeId(i)) {
            match stances[neighbor.index()] {
                Some(true) => support += 1,
                Some(false) => oppose += 1,
                None => {}
            }
        }
        stances[i] = Some(match support.cmp(&oppose) {
            std::cmp::Ordering::Greater => true,
            std::cmp::Ordering::Less => false,
            std::cmp::Ordering::Equal => rng.gen_bool(0.5),
        });
    }

    stances
        .into_iter()
        .map(|s| Opinion::Binary(s.unwrap_or(false)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::seeded_rng;

    fn path(n: usize) -> Network {
        Network::from_edges(n, (1..n).map(|i| (i - 1, i))).unwrap()
    }

    #[test]
    fn test_fixed_opinions() {
        let mut network = path(5);
        let model = OpinionModel::Fixed { support: true };
        assign_opinions(&mut network, &model, &mut seeded_rng(0)).unwrap();
        assert_eq!(network.assignment().support_count(), 5);
    }

    #[test]
    fn test_uniform_binary_extremes() {
        let mut network = path(20);
        let none = OpinionModel::UniformBinary {
            support_probability: 0.0,
        };
        assign_opinions(&mut network, &none, &mut seeded_rng(1)).unwrap();
        assert_eq!(network.assignment().support_count(), 0);

        let all = OpinionModel::UniformBinary {
            support_probability: 1.0,
        };
        assign_opinions(&mut network, &all, &mut seeded_rng(1)).unwrap();
        assert_eq!(network.assignment().support_count(), 20);
    }

    #[test]
    fn test_beta_values_in_range() {
        let mut network = path(200);
        let model = OpinionModel::Beta {
            alpha: 2.0,
            beta: 2.0,
        };
        assign_opinions(&mut network, &model, &mut seeded_rng(42)).unwrap();

        let assignment = network.assignment();
        for opinion in assignment.opinions() {
            match opinion {
                Opinion::Continuous(v) => assert!((0.0..=1.0).contains(v)),
                Opinion::Binary(_) => panic!("beta should yield continuous opinions"),
            }
        }
        // Beta(2,2) is symmetric about 0.5
        assert!((assignment.mean_value() - 0.5).abs() < 0.1);
    }

    #[test]
    fn test_assignment_reproducible() {
        let model = OpinionModel::UniformContinuous;
        let mut a = path(30);
        let mut b = path(30);
        assign_opinions(&mut a, &model, &mut seeded_rng(9)).unwrap();
        assign_opinions(&mut b, &model, &mut seeded_rng(9)).unwrap();
        assert_eq!(a.assignment(), b.assignment());
    }

    #[test]
    fn test_neighbor_majority_follows_seeds() {
        // Every node seeded: nothing left to follow
        let mut network = path(10);
        let model = OpinionModel::NeighborMajority { seed_fraction: 1.0 };
        assign_opinions(&mut network, &model, &mut seeded_rng(3)).unwrap();
        assert_eq!(network.assignment().len(), 10);

        // With no seeds each node copies its already-assigned predecessor on a path
        let mut network = path(10);
        let model = OpinionModel::NeighborMajority { seed_fraction: 0.0 };
        assign_opinions(&mut network, &model, &mut seeded_rng(3)).unwrap();
        let count = network.assignment().support_count();
        assert!(count == 0 || count == 10, "support count {}", count);
    }

    #[test]
    fn test_community_aligned() {
        let mut network = path(6).with_groups(vec![0, 0, 0, 1, 1, 1]).unwrap();
        let model = OpinionModel::CommunityAligned { alignment: 1.0 };
        assign_opinions(&mut network, &model, &mut seeded_rng(0)).unwrap();

        let assignment = network.assignment();
        assert!((0..3).all(|i| assignment.stance(NodeId(i))));
        assert!((3..6).all(|i| !assignment.stance(NodeId(i))));
    }

    #[test]
    fn test_invalid_models() {
        let mut network = path(3);
        let mut rng = seeded_rng(0);
        let bad = [
            OpinionModel::UniformBinary {
                support_probability: 1.2,
            },
            OpinionModel::Beta {
                alpha: 0.0,
                beta: 1.0,
            },
            OpinionModel::NeighborMajority {
                seed_fraction: -0.5,
            },
            OpinionModel::CommunityAligned {
                alignment: f64::NAN,
            },
        ];
        for model in &bad {
            let err = assign_opinions(&mut network, model, &mut rng).unwrap_err();
            assert!(err.is_invalid_parameter(), "{:?}", model);
        }
    }
}
