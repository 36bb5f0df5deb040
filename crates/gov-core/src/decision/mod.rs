//! Multi-Issue Decision Process
//!
//! A body of policy makers works through a set of linked issues one at a
//! time. Each round an undecided issue and a random group are drawn; the
//! group passes the issue when its summed sentiment is positive and may then
//! adjust its opinions. The finished sequence of decisions is scored by how
//! well it respects the decision matrix.

pub mod matrix;
pub mod opinions;

use rand::seq::index::sample;
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

pub use matrix::DecisionMatrix;
pub use opinions::{truncated_normal, IssueOpinionModel, IssueOpinions};

use crate::error::{check_unit_interval, GovernanceError, Result};
use crate::rng::{stream_rng, Stream};

/// How a group's opinions change after it decides an issue.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum OpinionUpdate {
    /// Opinions are left as they were
    #[default]
    None,
    /// Members move their sentiment on the decided issue towards the outcome
    /// by `rate` of the remaining distance
    Conform { rate: f64 },
}

/// Parameters of one decision process.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DecisionConfig {
    /// Smallest group that decides an issue
    pub min_group: usize,
    /// Exclusive upper bound on the group size
    pub max_group: usize,
    pub update: OpinionUpdate,
}

impl Default for DecisionConfig {
    fn default() -> Self {
        Self {
            min_group: 3,
            max_group: 6,
            update: OpinionUpdate::None,
        }
    }
}

impl DecisionConfig {
    /// Checks the group bounds against the number of policy makers.
    pub fn validate(&self, policy_makers: usize) -> Result<()> {
        if self.min_group == 0 || self.min_group >= self.max_group {
            return Err(GovernanceError::invalid(
                "group_size",
                format!(
                    "need 1 <= min_group < max_group, got {}..{}",
                    self.min_group, self.max_group
                ),
            ));
        }
        if self.max_group - 1 > policy_makers {
            return Err(GovernanceError::invalid(
                "max_group",
                format!(
                    "groups of up to {} exceed the {} policy makers",
                    self.max_group - 1,
                    policy_makers
                ),
            ));
        }
        if let OpinionUpdate::Conform { rate } = self.update {
            check_unit_interval("rate", rate)?;
        }
        Ok(())
    }
}

/// One round of the process.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionRecord {
    pub round: usize,
    pub issue: usize,
    /// Members of the deciding group, ascending
    pub group: Vec<usize>,
    /// Summed sentiment of the group on the issue at decision time
    pub tally: f64,
    pub passed: bool,
}

/// Result of deciding every issue.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DecisionOutcome {
    passed: Vec<bool>,
    records: Vec<DecisionRecord>,
    opinions: IssueOpinions,
}

impl DecisionOutcome {
    /// Whether each issue passed, indexed by issue.
    pub fn passed(&self) -> &[bool] {
        &self.passed
    }

    /// Rounds in the order they were played.
    pub fn records(&self) -> &[DecisionRecord] {
        &self.records
    }

    /// Opinions after the final round.
    pub fn opinions(&self) -> &IssueOpinions {
        &self.opinions
    }

    /// The group that decided an issue.
    pub fn group_for(&self, issue: usize) -> Option<&[usize]> {
        self.records
            .iter()
            .find(|r| r.issue == issue)
            .map(|r| r.group.as_slice())
    }

    /// Outcomes as `+1` (passed) and `-1` (rejected).
    pub fn to_signs(&self) -> Vec<f64> {
        self.passed
            .iter()
            .map(|&p| if p { 1.0 } else { -1.0 })
            .collect()
    }

    pub fn coherence(&self, matrix: &DecisionMatrix) -> f64 {
        coherence(&self.passed, matrix)
    }
}

/// Fraction of non-zero links whose two outcomes agree with the link's sign.
/// A matrix without links is fully coherent.
pub fn coherence(passed: &[bool], matrix: &DecisionMatrix) -> f64 {
    let mut links = 0usize;
    let mut agreeing = 0usize;
    for i in 0..matrix.size().min(passed.len()) {
        for j in matrix.linked(i) {
            let Some(&other) = passed.get(j) else {
                continue;
            };
            links += 1;
            if matrix::link_agrees(matrix.get(i, j), passed[i], other) {
                agreeing += 1;
            }
        }
    }
    if links == 0 {
        1.0
    } else {
        agreeing as f64 / links as f64
    }
}

/// Decides every issue of `matrix`, one random group at a time.
pub fn run_decision_process<R: Rng + ?Sized>(
    mut opinions: IssueOpinions,
    matrix: &DecisionMatrix,
    config: &DecisionConfig,
    rng: &mut R,
) -> Result<DecisionOutcome> {
    opinions.check_matrix(matrix)?;
    let members = opinions.policy_makers();
    config.validate(members)?;

    let issues = matrix.size();
    let mut undecided: Vec<usize> = (0..issues).collect();
    let mut passed = vec![false; issues];
    let mut records = Vec::with_capacity(issues);

    while !undecided.is_empty() {
        let issue = undecided.remove(rng.gen_range(0..undecided.len()));
        let size = rng.gen_range(config.min_group..config.max_group);
        let mut group = sample(rng, members, size).into_vec();
        group.sort_unstable();

        let tally = opinions.tally(&group, issue).ok_or_else(|| {
            GovernanceError::invalid(
                "group",
                format!("members {:?} outside the opinion table", group),
            )
        })?;
        let outcome = tally > 0.0;
        passed[issue] = outcome;

        if let OpinionUpdate::Conform { rate } = config.update {
            let target = if outcome { 1.0 } else { -1.0 };
            for &member in &group {
                if let Some(current) = opinions.get(member, issue) {
                    opinions.set(member, issue, current + rate * (target - current));
                }
            }
        }

        trace!(round = records.len(), issue, size, tally, passed = outcome, "decided issue");
        records.push(DecisionRecord {
            round: records.len(),
            issue,
            group,
            tally,
            passed: outcome,
        });
    }

    let outcome = DecisionOutcome {
        passed,
        records,
        opinions,
    };
    debug!(
        issues,
        policy_makers = members,
        coherence = outcome.coherence(matrix),
        "decision process finished"
    );
    Ok(outcome)
}

/// Generates opinions and runs the decision process from one master seed,
/// using the opinion and decision streams of that seed.
pub fn simulate_decisions(
    policy_makers: usize,
    model: &IssueOpinionModel,
    matrix: &DecisionMatrix,
    config: &DecisionConfig,
    seed: u64,
) -> Result<DecisionOutcome> {
    config.validate(policy_makers)?;
    let opinions = model.generate(policy_makers, matrix, &mut stream_rng(seed, Stream::Opinions))?;
    run_decision_process(opinions, matrix, config, &mut stream_rng(seed, Stream::Decisions))
}
