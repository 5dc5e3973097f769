//! Validated collection of buckets with exclusion-aware classification.

use std::collections::HashMap;

use serde_json::Value;
use sha2::{Digest, Sha256};

use super::{Bucket, BucketConfigError, BucketDefinition, BucketId};
use crate::task::domain::Task;

/// DFS colouring used while ordering exclusions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Visit {
    Pending,
    InProgress,
    Done,
}

/// Buckets in declared order, validated as a whole.
///
/// Construction rejects any configuration that could misclassify a task:
/// duplicate or blank identifiers, exclusions of unknown buckets, and
/// exclusion cycles. Classification then evaluates buckets so that every
/// excluded bucket is matched before the buckets that exclude it.
///
/// # Examples
///
/// ```
/// use atelier::board::domain::{
///     BucketDefinition, BucketConfigError, OperatorKind, RuleDefinition, RuleSet,
/// };
///
/// let rule = || RuleDefinition::new("status", OperatorKind::IsNotNull);
/// let result = RuleSet::new(&[
///     BucketDefinition::new("a").with_rule(rule()).excluding("b"),
///     BucketDefinition::new("b").with_rule(rule()).excluding("a"),
/// ]);
/// assert!(matches!(result, Err(BucketConfigError::CyclicExclusion { .. })));
/// ```
#[derive(Debug, Clone)]
pub struct RuleSet {
    buckets: Vec<Bucket>,
    positions: HashMap<BucketId, usize>,
    exclusions: Vec<Vec<usize>>,
    evaluation_order: Vec<usize>,
    fingerprint: String,
}

impl RuleSet {
    /// Parses and validates bucket definitions.
    ///
    /// # Errors
    ///
    /// Returns the first [`BucketConfigError`] found.
    pub fn new(definitions: &[BucketDefinition]) -> Result<Self, BucketConfigError> {
        let buckets = definitions
            .iter()
            .map(Bucket::from_definition)
            .collect::<Result<Vec<_>, _>>()?;

        let mut positions = HashMap::with_capacity(buckets.len());
        for (index, bucket) in buckets.iter().enumerate() {
            if positions.insert(bucket.id().clone(), index).is_some() {
                return Err(BucketConfigError::DuplicateBucket(bucket.id().clone()));
            }
        }

        let exclusions = buckets
            .iter()
            .map(|bucket| {
                bucket
                    .exclusions()
                    .iter()
                    .map(|excluded| {
                        positions.get(excluded).copied().ok_or_else(|| {
                            BucketConfigError::UnknownExclusion {
                                bucket: bucket.id().clone(),
                                excluded: excluded.as_str().to_owned(),
                            }
                        })
                    })
                    .collect::<Result<Vec<_>, _>>()
            })
            .collect::<Result<Vec<_>, _>>()?;

        let evaluation_order = order_exclusions(&buckets, &exclusions)?;

        Ok(Self {
            buckets,
            positions,
            exclusions,
            evaluation_order,
            fingerprint: fingerprint(definitions),
        })
    }

    /// Creates a rule set without buckets; nothing is ever classified.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            buckets: Vec::new(),
            positions: HashMap::new(),
            exclusions: Vec::new(),
            evaluation_order: Vec::new(),
            fingerprint: fingerprint(&[]),
        }
    }

    /// Returns the buckets in declared order.
    #[must_use]
    pub fn buckets(&self) -> &[Bucket] {
        &self.buckets
    }

    /// Looks up a bucket by identifier.
    #[must_use]
    pub fn get(&self, id: &BucketId) -> Option<&Bucket> {
        self.positions
            .get(id)
            .and_then(|&index| self.buckets.get(index))
    }

    /// Returns the number of buckets, active or not.
    #[must_use]
    pub fn len(&self) -> usize {
        self.buckets.len()
    }

    /// Returns `true` when no bucket is defined.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    /// Returns bucket identifiers in evaluation order: every excluded bucket
    /// precedes the buckets excluding it, declared order breaks ties.
    #[must_use]
    pub fn evaluation_order(&self) -> Vec<&BucketId> {
        self.evaluation_order
            .iter()
            .filter_map(|&index| self.buckets.get(index).map(Bucket::id))
            .collect()
    }

    /// Returns the SHA-256 fingerprint of the source definitions.
    #[must_use]
    pub fn fingerprint(&self) -> &str {
        &self.fingerprint
    }

    /// Returns the bucket `task` belongs to, if any.
    ///
    /// When several buckets are eligible the first declared one wins.
    #[must_use]
    pub fn classify(&self, task: &Task) -> Option<&BucketId> {
        let eligible = self.eligible_in(&task.to_document());
        let (winner, overlapping) = eligible.split_first()?;
        if !overlapping.is_empty() {
            tracing::debug!(
                task_id = %task.id(),
                bucket = %winner,
                overlapping = ?overlapping.iter().map(|id| id.as_str()).collect::<Vec<_>>(),
                "Task matches several buckets, keeping the first declared"
            );
        }
        Some(*winner)
    }

    /// Returns every bucket `task` is eligible for, in declared order.
    #[must_use]
    pub fn eligible_buckets(&self, task: &Task) -> Vec<&BucketId> {
        self.eligible_in(&task.to_document())
    }

    fn eligible_in(&self, document: &Value) -> Vec<&BucketId> {
        let mut matched = vec![false; self.buckets.len()];
        let mut eligible = vec![false; self.buckets.len()];

        for &index in &self.evaluation_order {
            let (Some(bucket), Some(excluded)) =
                (self.buckets.get(index), self.exclusions.get(index))
            else {
                continue;
            };
            let is_match = bucket.is_active() && bucket.matches_document(document);
            let is_excluded = is_match
                && excluded
                    .iter()
                    .any(|&other| matched.get(other).copied().unwrap_or(false));
            if let Some(slot) = matched.get_mut(index) {
                *slot = is_match;
            }
            if let Some(slot) = eligible.get_mut(index) {
                *slot = is_match && !is_excluded;
            }
        }

        self.buckets
            .iter()
            .zip(eligible)
            .filter_map(|(bucket, is_eligible)| is_eligible.then_some(bucket.id()))
            .collect()
    }
}

impl Default for RuleSet {
    fn default() -> Self {
        Self::empty()
    }
}

fn fingerprint(definitions: &[BucketDefinition]) -> String {
    let canonical = serde_json::to_vec(definitions).unwrap_or_default();
    format!("{:x}", Sha256::digest(&canonical))
}

fn order_exclusions(
    buckets: &[Bucket],
    exclusions: &[Vec<usize>],
) -> Result<Vec<usize>, BucketConfigError> {
    let mut marks = vec![Visit::Pending; buckets.len()];
    let mut path = Vec::new();
    let mut order = Vec::with_capacity(buckets.len());

    for start in 0..buckets.len() {
        visit(start, exclusions, &mut marks, &mut path, &mut order).map_err(|cycle| {
            BucketConfigError::CyclicExclusion {
                cycle: cycle
                    .into_iter()
                    .filter_map(|index| buckets.get(index).map(|bucket| bucket.id().clone()))
                    .collect(),
            }
        })?;
    }
    Ok(order)
}

/// Post-order DFS; on a back edge returns the cycle, closing node repeated.
fn visit(
    node: usize,
    exclusions: &[Vec<usize>],
    marks: &mut [Visit],
    path: &mut Vec<usize>,
    order: &mut Vec<usize>,
) -> Result<(), Vec<usize>> {
    match marks.get(node).copied() {
        Some(Visit::Pending) => {}
        Some(Visit::InProgress) => {
            let start = path.iter().position(|&n| n == node).unwrap_or(0);
            let mut cycle = path.get(start..).map(<[usize]>::to_vec).unwrap_or_default();
            cycle.push(node);
            return Err(cycle);
        }
        Some(Visit::Done) | None => return Ok(()),
    }

    if let Some(mark) = marks.get_mut(node) {
        *mark = Visit::InProgress;
    }
    path.push(node);

    for &next in exclusions.get(node).map(Vec::as_slice).unwrap_or_default() {
        visit(next, exclusions, marks, path, order)?;
    }

    path.pop();
    if let Some(mark) = marks.get_mut(node) {
        *mark = Visit::Done;
    }
    order.push(node);
    Ok(())
}
