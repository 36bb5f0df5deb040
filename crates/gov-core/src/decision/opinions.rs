//! Issue Opinions
//!
//! Policy makers' sentiment on each issue, in `[-1, 1]`: positive leans
//! towards passing the issue, negative against. Several generators shape how
//! those sentiments correlate with the decision matrix.

use rand::seq::SliceRandom;
use rand::Rng;
use rand_distr::{Distribution, Normal};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

use crate::decision::matrix::DecisionMatrix;
use crate::error::{check_positive, check_unit_interval, GovernanceError, Result};

/// Draws before [`truncated_normal`] gives up.
pub const MAX_REJECTIONS: usize = 10_000;

/// Lower and upper bound of every sentiment.
pub const SENTIMENT_BOUNDS: (f64, f64) = (-1.0, 1.0);

/// Samples `Normal(mean, std)` conditioned on landing strictly inside
/// `bounds`, by rejection.
///
/// Fails when `std` is not positive, or when no draw lands inside the bounds
/// within [`MAX_REJECTIONS`] attempts (e.g. a mean far outside them).
pub fn truncated_normal<R: Rng + ?Sized>(
    mean: f64,
    std: f64,
    bounds: (f64, f64),
    rng: &mut R,
) -> Result<f64> {
    check_positive("std", std)?;
    let normal =
        Normal::new(mean, std).map_err(|e| GovernanceError::invalid("std", e.to_string()))?;
    let (low, high) = bounds;
    for _ in 0..MAX_REJECTIONS {
        let x = normal.sample(rng);
        if x > low && x < high {
            return Ok(x);
        }
    }
    Err(GovernanceError::invalid(
        "mean",
        format!(
            "no draw from N({}, {}) fell inside ({}, {}) after {} attempts",
            mean, std, low, high, MAX_REJECTIONS
        ),
    ))
}

/// An `n x m` table of sentiments, one row per policy maker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IssueOpinions {
    policy_makers: usize,
    issues: usize,
    values: Vec<f64>,
}

impl IssueOpinions {
    /// Builds the table from rows; every row needs one entry per issue and
    /// every entry must lie in `[-1, 1]`.
    pub fn from_rows(rows: Vec<Vec<f64>>) -> Result<Self> {
        let policy_makers = rows.len();
        let issues = rows.first().map_or(0, Vec::len);
        let mut values = Vec::with_capacity(policy_makers * issues);
        for (i, row) in rows.into_iter().enumerate() {
            if row.len() != issues {
                return Err(GovernanceError::invalid(
                    "opinions",
                    format!("row {} has {} issues, expected {}", i, row.len(), issues),
                ));
            }
            if let Some(bad) = row.iter().find(|v| !(-1.0..=1.0).contains(*v)) {
                return Err(GovernanceError::invalid(
                    "opinions",
                    format!("sentiment {} in row {} is outside [-1, 1]", bad, i),
                ));
            }
            values.extend(row);
        }
        Ok(Self {
            policy_makers,
            issues,
            values,
        })
    }

    /// All sentiments neutral.
    pub fn neutral(policy_makers: usize, issues: usize) -> Self {
        Self {
            policy_makers,
            issues,
            values: vec![0.0; policy_makers * issues],
        }
    }

    pub fn policy_makers(&self) -> usize {
        self.policy_makers
    }

    pub fn issues(&self) -> usize {
        self.issues
    }

    fn index(&self, member: usize, issue: usize) -> Option<usize> {
        (member < self.policy_makers && issue < self.issues).then(|| member * self.issues + issue)
    }

    /// Sentiment of `member` on `issue`, or `None` when either is out of range.
    pub fn get(&self, member: usize, issue: usize) -> Option<f64> {
        self.index(member, issue).and_then(|k| self.values.get(k).copied())
    }

    /// Sets a sentiment, clamped to `[-1, 1]`. Out-of-range cells are ignored.
    pub(crate) fn set(&mut self, member: usize, issue: usize, value: f64) {
        if let Some(slot) = self.index(member, issue).and_then(|k| self.values.get_mut(k)) {
            *slot = value.clamp(SENTIMENT_BOUNDS.0, SENTIMENT_BOUNDS.1);
        }
    }

    pub fn row(&self, member: usize) -> Option<&[f64]> {
        if member >= self.policy_makers {
            return None;
        }
        let start = member * self.issues;
        self.values.get(start..start + self.issues)
    }

    /// Summed sentiment of a group on one issue; `None` if any member or the
    /// issue is out of range.
    pub fn tally(&self, group: &[usize], issue: usize) -> Option<f64> {
        group.iter().map(|&member| self.get(member, issue)).sum()
    }

    /// Checks that the table matches a decision matrix.
    pub fn check_matrix(&self, matrix: &DecisionMatrix) -> Result<()> {
        if self.issues == matrix.size() {
            Ok(())
        } else {
            Err(GovernanceError::invalid(
                "opinions",
                format!(
                    "{} issues per policy maker but the decision matrix has {}",
                    self.issues,
                    matrix.size()
                ),
            ))
        }
    }
}

/// How issue sentiments are generated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum IssueOpinionModel {
    /// Independent `U[-1, 1]`
    Random,
    /// A share of uninformed members sits near zero; the rest split into two
    /// camps leaning `+direction / 2` and `-direction / 2`
    Polarized {
        direction: Vec<f64>,
        uninformed: f64,
        polarization: f64,
    },
    /// Like `Polarized`, but the camps lean towards `direction` and
    /// `1 - direction`, rescaled into range
    Mixed {
        direction: Vec<f64>,
        uninformed: f64,
        polarization: f64,
    },
    /// Everyone scatters around the same `direction`, ignoring the links
    Incoherent { direction: Vec<f64> },
    /// Each member builds a personally coherent position by walking the
    /// decision matrix outward from a random issue
    Greedy,
    /// One shared walk of the decision matrix; everyone follows the
    /// collective lean of the issue it was reached from
    UniformGreedy,
}

impl IssueOpinionModel {
    pub fn name(&self) -> &'static str {
        match self {
            IssueOpinionModel::Random => "random",
            IssueOpinionModel::Polarized { .. } => "polarized",
            IssueOpinionModel::Mixed { .. } => "mixed",
            IssueOpinionModel::Incoherent { .. } => "incoherent",
            IssueOpinionModel::Greedy => "greedy",
            IssueOpinionModel::UniformGreedy => "uniform_greedy",
        }
    }

    pub fn validate(&self, issues: usize) -> Result<()> {
        let check_direction = |direction: &[f64]| {
            if direction.len() == issues && direction.iter().all(|d| d.is_finite()) {
                Ok(())
            } else {
                Err(GovernanceError::invalid(
                    "direction",
                    format!("needs {} finite entries, got {}", issues, direction.len()),
                ))
            }
        };
        match self {
            IssueOpinionModel::Polarized {
                direction,
                uninformed,
                polarization,
            }
            | IssueOpinionModel::Mixed {
                direction,
                uninformed,
                polarization,
            } => {
                check_direction(direction)?;
                check_unit_interval("uninformed", *uninformed)?;
                check_unit_interval("polarization", *polarization)
            }
            IssueOpinionModel::Incoherent { direction } => check_direction(direction),
            IssueOpinionModel::Random
            | IssueOpinionModel::Greedy
            | IssueOpinionModel::UniformGreedy => Ok(()),
        }
    }

    /// Generates sentiments for `policy_makers` members on every issue of
    /// `matrix`.
    pub fn generate<R: Rng + ?Sized>(
        &self,
        policy_makers: usize,
        matrix: &DecisionMatrix,
        rng: &mut R,
    ) -> Result<IssueOpinions> {
        let issues = matrix.size();
        self.validate(issues)?;
        let mut opinions = IssueOpinions::neutral(policy_makers, issues);

        match self {
            IssueOpinionModel::Random => {
                for i in 0..policy_makers {
                    for j in 0..issues {
                        opinions.set(i, j, rng.gen_range(-1.0..=1.0));
                    }
                }
            }
            IssueOpinionModel::Polarized {
                direction,
                uninformed,
                polarization,
            } => {
                let camp_a: Vec<f64> = direction.iter().map(|d| 0.5 * d).collect();
                let camp_b: Vec<f64> = direction.iter().map(|d| -0.5 * d).collect();
                fill_camps(&mut opinions, &camp_a, &camp_b, *uninformed, *polarization, rng)?;
            }
            IssueOpinionModel::Mixed {
                direction,
                uninformed,
                polarization,
            } => {
                let scale = direction
                    .iter()
                    .map(|d| d.max(1.0 - d))
                    .fold(1.0_f64, f64::max);
                let camp_a: Vec<f64> = direction.iter().map(|d| d / scale).collect();
                let camp_b: Vec<f64> = direction.iter().map(|d| (1.0 - d) / scale).collect();
                fill_camps(&mut opinions, &camp_a, &camp_b, *uninformed, *polarization, rng)?;
            }
            IssueOpinionModel::Incoherent { direction } => {
                for i in 0..policy_makers {
                    for (j, d) in direction.iter().enumerate() {
                        opinions.set(i, j, truncated_normal(*d, 0.1, SENTIMENT_BOUNDS, rng)?);
                    }
                }
            }
            IssueOpinionModel::Greedy => {
                for i in 0..policy_makers {
                    for j in 0..issues {
                        opinions.set(i, j, truncated_normal(0.0, 0.1, SENTIMENT_BOUNDS, rng)?);
                    }
                    for (issue, parent) in linked_walk(matrix, rng) {
                        let value = match parent {
                            None => truncated_normal(0.5, 0.1, SENTIMENT_BOUNDS, rng)?,
                            Some(p) => {
                                let lean = sign(opinions.get(i, p).unwrap_or(0.0));
                                let mean = lean * matrix.get(p, issue) * 0.5;
                                truncated_normal(mean, 0.25, SENTIMENT_BOUNDS, rng)?
                            }
                        };
                        opinions.set(i, issue, value);
                    }
                }
            }
            IssueOpinionModel::UniformGreedy => {
                for (issue, parent) in linked_walk(matrix, rng) {
                    let mean = match parent {
                        None => 0.75,
                        Some(p) => {
                            let sensing: f64 =
                                (0..policy_makers).filter_map(|i| opinions.get(i, p)).sum();
                            sign(sensing) * matrix.get(p, issue) * 0.75
                        }
                    };
                    for i in 0..policy_makers {
                        opinions.set(i, issue, truncated_normal(mean, 0.1, SENTIMENT_BOUNDS, rng)?);
                    }
                }
            }
        }
        Ok(opinions)
    }
}

fn sign(x: f64) -> f64 {
    if x < 0.0 {
        -1.0
    } else {
        1.0
    }
}

fn fill_camps<R: Rng + ?Sized>(
    opinions: &mut IssueOpinions,
    camp_a: &[f64],
    camp_b: &[f64],
    uninformed: f64,
    polarization: f64,
    rng: &mut R,
) -> Result<()> {
    for i in 0..opinions.policy_makers() {
        if rng.gen_bool(uninformed) {
            for j in 0..opinions.issues() {
                opinions.set(i, j, truncated_normal(0.0, 0.1, SENTIMENT_BOUNDS, rng)?);
            }
            continue;
        }
        let camp = if rng.gen_bool(polarization) {
            camp_a
        } else {
            camp_b
        };
        for (j, mean) in camp.iter().enumerate() {
            opinions.set(i, j, truncated_normal(*mean, 0.1, SENTIMENT_BOUNDS, rng)?);
        }
    }
    Ok(())
}

/// Breadth-first walk over the decision matrix that visits every issue once.
///
/// Whenever the frontier runs dry a random unvisited issue starts a new
/// component. Each step is `(issue, parent)`; seeds have no parent.
fn linked_walk<R: Rng + ?Sized>(matrix: &DecisionMatrix, rng: &mut R) -> Vec<(usize, Option<usize>)> {
    let m = matrix.size();
    let mut visited = vec![false; m];
    let mut order = Vec::with_capacity(m);
    let mut frontier = VecDeque::new();

    while order.len() < m {
        if frontier.is_empty() {
            let unvisited: Vec<usize> = (0..m).filter(|&j| !visited[j]).collect();
            let Some(&seed) = unvisited.choose(rng) else {
                break;
            };
            visited[seed] = true;
            order.push((seed, None));
            frontier.push_back(seed);
        }
        while let Some(issue) = frontier.pop_front() {
            for next in matrix.linked(issue) {
                if !visited[next] {
                    visited[next] = true;
                    order.push((next, Some(issue)));
                    frontier.push_back(next);
                }
            }
        }
    }
    order
}
