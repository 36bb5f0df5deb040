//! Grid expansion.
//!
//! Turns a [`SweepConfig`] into concrete, validated experiment configurations,
//! each with a label naming the values it was given.

use gov_core::{ExperimentConfig, GovernanceError, NetworkSpec, Topology};

use crate::config::SweepConfig;

/// One point of the grid.
#[derive(Debug, Clone, PartialEq)]
pub struct SweepPoint {
    /// Swept values, e.g. `p=0.05,rule=majority_update`; `base` when nothing
    /// is swept
    pub label: String,
    pub config: ExperimentConfig,
}

/// Every grid point plus the seeds each one runs with.
#[derive(Debug, Clone)]
pub struct SweepPlan {
    points: Vec<SweepPoint>,
    seeds: Vec<u64>,
}

impl SweepPlan {
    /// Expands the grid and validates every resulting configuration.
    pub fn from_config(config: &SweepConfig) -> Result<Self, GovernanceError> {
        let mut points = vec![SweepPoint {
            label: String::new(),
            config: config.base.clone(),
        }];
        let grid = &config.grid;

        points = expand(points, &grid.nodes, |c, &n| {
            c.network.nodes = n;
            format!("n={}", n)
        });
        points = expand(points, &grid.edge_probability, |c, &p| {
            c.network = NetworkSpec {
                nodes: c.network.nodes,
                topology: Topology::Random {
                    edge_probability: p,
                },
            };
            format!("p={}", p)
        });
        points = expand(points, &grid.rule, |c, rule| {
            c.process.rule = *rule;
            format!("rule={}", rule.name())
        });
        points = expand(points, &grid.clause_threshold, |c, &t| {
            c.process.clause_threshold = t;
            format!("t={}", t)
        });
        points = expand(points, &grid.acceptance_threshold, |c, &a| {
            c.process.acceptance_threshold = a;
            format!("accept={}", a)
        });
        points = expand(points, &grid.min_size, |c, &k| {
            c.clauses.min_size = k;
            format!("k={}", k)
        });

        for point in &mut points {
            if point.label.is_empty() {
                point.label = "base".to_string();
            }
            point.config.validate()?;
        }

        let start = config.sweep.base_seed;
        let seeds = (start..start.saturating_add(config.sweep.seeds)).collect();
        Ok(Self { points, seeds })
    }

    pub fn points(&self) -> &[SweepPoint] {
        &self.points
    }

    pub fn seeds(&self) -> &[u64] {
        &self.seeds
    }

    /// Number of (point, seed) jobs.
    pub fn job_count(&self) -> usize {
        self.points.len() * self.seeds.len()
    }

    /// All jobs as `(point index, seed)`, point-major.
    pub fn jobs(&self) -> Vec<(usize, u64)> {
        (0..self.points.len())
            .flat_map(|p| self.seeds.iter().map(move |&s| (p, s)))
            .collect()
    }
}

fn expand<T>(
    points: Vec<SweepPoint>,
    values: &[T],
    apply: impl Fn(&mut ExperimentConfig, &T) -> String,
) -> Vec<SweepPoint> {
    if values.is_empty() {
        return points;
    }
    let mut expanded = Vec::with_capacity(points.len() * values.len());
    for point in points {
        for value in values {
            let mut config = point.config.clone();
            let part = apply(&mut config, value);
            let label = if point.label.is_empty() {
                part
            } else {
                format!("{},{}", point.label, part)
            };
            expanded.push(SweepPoint { label, config });
        }
    }
    expanded
}
