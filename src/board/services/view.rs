//! Bucketed snapshot of the task store.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use mockable::Clock;

use crate::board::domain::{BucketId, RuleSet};
use crate::task::domain::{Task, sort_tasks};

/// Tasks grouped by bucket at one point in time.
///
/// Only active buckets appear, in declared order, each holding its tasks in
/// board order. Tasks no bucket accepts are kept aside as unclassified.
#[derive(Debug, Clone)]
pub struct BucketView {
    columns: Vec<(BucketId, Vec<Task>)>,
    unclassified: Vec<Task>,
    generated_at: DateTime<Utc>,
    fingerprint: String,
}

impl BucketView {
    /// Returns the tasks in bucket `id`; unknown or inactive buckets are
    /// empty. Surrounding whitespace is ignored, as in [`BucketId::new`].
    #[must_use]
    pub fn tasks_for_bucket(&self, id: impl AsRef<str>) -> &[Task] {
        let wanted = id.as_ref().trim();
        self.columns
            .iter()
            .find(|(bucket, _)| bucket.as_str() == wanted)
            .map(|(_, tasks)| tasks.as_slice())
            .unwrap_or_default()
    }

    /// Returns the task count of every active bucket, zero counts included.
    #[must_use]
    pub fn bucket_counts(&self) -> BTreeMap<BucketId, usize> {
        self.columns
            .iter()
            .map(|(bucket, tasks)| (bucket.clone(), tasks.len()))
            .collect()
    }

    /// Iterates active buckets in declared order with their tasks.
    pub fn columns(&self) -> impl Iterator<Item = (&BucketId, &[Task])> {
        self.columns
            .iter()
            .map(|(bucket, tasks)| (bucket, tasks.as_slice()))
    }

    /// Returns tasks that matched no bucket.
    #[must_use]
    pub fn unclassified(&self) -> &[Task] {
        &self.unclassified
    }

    /// Returns when the view was built.
    #[must_use]
    pub const fn generated_at(&self) -> DateTime<Utc> {
        self.generated_at
    }

    /// Returns the fingerprint of the rule set the view was built with.
    #[must_use]
    pub fn rule_set_fingerprint(&self) -> &str {
        &self.fingerprint
    }
}

/// Builds [`BucketView`]s from task snapshots.
#[derive(Debug, Clone)]
pub struct BucketViewBuilder<C>
where
    C: Clock + Send + Sync,
{
    clock: Arc<C>,
}

impl<C> BucketViewBuilder<C>
where
    C: Clock + Send + Sync,
{
    /// Creates a builder stamping views with `clock`.
    #[must_use]
    pub const fn new(clock: Arc<C>) -> Self {
        Self { clock }
    }

    /// Classifies `tasks` against `rule_set`.
    ///
    /// Membership is derived from scratch on every call. Deleted tasks are
    /// never shown.
    #[must_use]
    pub fn build(&self, mut tasks: Vec<Task>, rule_set: &RuleSet) -> BucketView {
        tasks.retain(|task| !task.is_deleted());
        sort_tasks(&mut tasks);

        let mut columns: Vec<(BucketId, Vec<Task>)> = rule_set
            .buckets()
            .iter()
            .filter(|bucket| bucket.is_active())
            .map(|bucket| (bucket.id().clone(), Vec::new()))
            .collect();
        let mut unclassified = Vec::new();

        for task in tasks {
            let column = rule_set
                .classify(&task)
                .and_then(|id| columns.iter_mut().find(|(bucket, _)| bucket == id));
            match column {
                Some((_, members)) => members.push(task),
                None => unclassified.push(task),
            }
        }

        BucketView {
            columns,
            unclassified,
            generated_at: self.clock.utc(),
            fingerprint: rule_set.fingerprint().to_owned(),
        }
    }
}
