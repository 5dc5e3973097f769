//! Channel sources driving the reconciler end to end.

use atelier::sync::{
    adapters::memory::ChannelEventSource,
    domain::{ChangeOperation, SourceTable},
};
use atelier::task::domain::{LeadId, LeadSummary, TaskStatus};

use super::helpers::{Pipeline, edited, lead_event, task, task_event};

#[tokio::test(flavor = "multi_thread")]
async fn concurrent_sources_converge_on_the_latest_rows() {
    let pipeline = Pipeline::new();
    let lead_id = LeadId::new();
    let first = task(TaskStatus::Pending, Some(lead_id), 10);
    let second = task(TaskStatus::InProgress, None, 5);
    pipeline.put(&first);
    pipeline.put(&second);
    pipeline
        .reconciler
        .resync()
        .await
        .expect("initial resync should succeed");

    let (tasks_sender, tasks_source) = ChannelEventSource::channel(SourceTable::Tasks);
    let (leads_sender, leads_source) = ChannelEventSource::channel(SourceTable::Leads);
    let worker = tokio::spawn(
        std::sync::Arc::clone(&pipeline.reconciler).run([tasks_source, leads_source]),
    );

    let approved = edited(&second, |record| record.status = TaskStatus::Approved);
    pipeline.put(&approved);
    tasks_sender
        .publish(task_event(ChangeOperation::Update, &approved))
        .await
        .expect("publish should succeed");

    let needs_logo = edited(&first, |record| {
        record.lead = Some(LeadSummary {
            needs_logo: true,
            ..LeadSummary::default()
        });
    });
    pipeline.put(&needs_logo);
    leads_sender
        .publish(lead_event(lead_id))
        .await
        .expect("publish should succeed");

    drop(tasks_sender);
    drop(leads_sender);
    let handled = worker.await.expect("worker should not panic");

    assert_eq!(handled, 2);
    assert_eq!(pipeline.store.snapshot(), vec![approved, needs_logo]);
}

#[tokio::test(flavor = "multi_thread")]
async fn hard_delete_event_removes_the_task_and_its_focus() {
    let pipeline = Pipeline::new();
    let doomed = task(TaskStatus::Pending, None, 1);
    pipeline.put(&doomed);
    pipeline.reconciler.resync().await.expect("resync should succeed");
    pipeline.store.focus(doomed.clone());

    pipeline.fetcher.remove(doomed.id()).expect("remove should succeed");
    pipeline
        .reconciler
        .handle_event(&task_event(ChangeOperation::Delete, &doomed))
        .await;

    assert!(pipeline.store.is_empty());
    assert_eq!(pipeline.store.focused(), None);
}
