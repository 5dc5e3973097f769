//! Board views and reloads over a live store.

use std::sync::Arc;

use atelier::board::{
    adapters::memory::StaticBucketDefinitions,
    domain::BucketId,
    services::{ReloadOutcome, TaskBoard},
};
use atelier::sync::domain::ChangeOperation;
use atelier::task::domain::{LeadSummary, TaskStatus};
use mockable::DefaultClock;

use super::helpers::{Pipeline, buckets, edited, task, task_event};

fn bucket(raw: &str) -> BucketId {
    BucketId::new(raw).expect("valid bucket id")
}

#[tokio::test(flavor = "multi_thread")]
async fn board_reflects_each_reconciled_change() {
    let pipeline = Pipeline::new();
    let source = StaticBucketDefinitions::new(buckets());
    let board = TaskBoard::load(Arc::clone(&pipeline.store), &source, Arc::new(DefaultClock))
        .await
        .expect("board should load");
    let mut revisions = pipeline.store.subscribe();

    let pending = task(TaskStatus::Pending, None, 3);
    pipeline.put(&pending);
    pipeline
        .reconciler
        .handle_event(&task_event(ChangeOperation::Insert, &pending))
        .await;
    revisions.changed().await.expect("store is alive");

    assert_eq!(board.tasks_for_bucket("pending"), vec![pending.clone()]);

    let logo = edited(&pending, |record| {
        record.lead = Some(LeadSummary {
            needs_logo: true,
            ..LeadSummary::default()
        });
    });
    pipeline.put(&logo);
    pipeline
        .reconciler
        .handle_event(&task_event(ChangeOperation::Update, &logo))
        .await;

    let counts = board.bucket_counts();
    assert_eq!(counts.get(&bucket("pending")), Some(&0));
    assert_eq!(counts.get(&bucket("logo_needed")), Some(&1));
    assert_eq!(counts.get(&bucket("approved")), Some(&0));
}

#[tokio::test(flavor = "multi_thread")]
async fn reload_reclassifies_without_touching_the_store() {
    let pipeline = Pipeline::new();
    let approved = task(TaskStatus::Approved, None, 1);
    pipeline.put(&approved);
    pipeline.reconciler.resync().await.expect("resync should succeed");
    let source = StaticBucketDefinitions::new(buckets());
    let board = TaskBoard::load(Arc::clone(&pipeline.store), &source, Arc::new(DefaultClock))
        .await
        .expect("board should load");
    let revision = pipeline.store.revision();

    let mut narrowed = buckets();
    narrowed.truncate(2);
    source.replace(narrowed).expect("replace should succeed");
    let outcome = board.reload(&source).await.expect("reload should succeed");

    assert_eq!(outcome, ReloadOutcome::Replaced { buckets: 2 });
    assert_eq!(board.view().unclassified(), &[approved]);
    assert_eq!(pipeline.store.revision(), revision);
}
