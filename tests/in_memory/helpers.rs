//! Shared helpers for in-memory integration tests.

use std::sync::Arc;

use atelier::{
    board::domain::{BucketDefinition, OperatorKind, RuleDefinition},
    sync::{
        domain::{ChangeEvent, ChangeOperation, SourceTable},
        services::{Reconciler, ReconcilerConfig, TaskStore},
    },
    task::{
        adapters::memory::InMemoryTaskFetcher,
        domain::{LeadId, LeadSummary, Task, TaskRecord, TaskStatus},
    },
};
use chrono::{Duration, Utc};
use serde_json::json;

/// Store, fetcher, and reconciler wired together.
pub struct Pipeline {
    pub fetcher: InMemoryTaskFetcher,
    pub store: Arc<TaskStore>,
    pub reconciler: Arc<Reconciler<InMemoryTaskFetcher>>,
}

impl Pipeline {
    pub fn new() -> Self {
        let fetcher = InMemoryTaskFetcher::new();
        let store = Arc::new(TaskStore::new());
        let reconciler = Arc::new(Reconciler::new(
            Arc::new(fetcher.clone()),
            Arc::clone(&store),
            ReconcilerConfig::default(),
        ));
        Self {
            fetcher,
            store,
            reconciler,
        }
    }

    /// Writes a row to the system of record.
    pub fn put(&self, task: &Task) {
        self.fetcher.put(task.clone()).expect("put should succeed");
    }
}

/// Builds a task created `age_minutes` ago.
pub fn task(status: TaskStatus, lead_id: Option<LeadId>, age_minutes: i64) -> Task {
    let created_at = Utc::now() - Duration::minutes(age_minutes);
    Task::from_record(TaskRecord {
        status,
        lead_id,
        lead: Some(LeadSummary::default()),
        created_at,
        updated_at: created_at,
        ..TaskRecord::default()
    })
}

/// Returns a copy of `task` with `edit` applied.
pub fn edited(task: &Task, edit: impl FnOnce(&mut TaskRecord)) -> Task {
    let mut record = task.record().clone();
    edit(&mut record);
    Task::from_record(record)
}

pub fn task_event(operation: ChangeOperation, task: &Task) -> ChangeEvent {
    ChangeEvent::new(SourceTable::Tasks, operation).with_new_payload(task.to_document())
}

pub fn lead_event(lead_id: LeadId) -> ChangeEvent {
    ChangeEvent::new(SourceTable::Leads, ChangeOperation::Update)
        .with_new_payload(json!({ "id": lead_id.to_string() }))
}

/// Pending, logo, and approved buckets; pending yields to logo work.
pub fn buckets() -> Vec<BucketDefinition> {
    vec![
        BucketDefinition::new("pending")
            .with_name("To do")
            .with_rule(RuleDefinition::new("status", OperatorKind::Equals).with_value("pending"))
            .excluding("logo_needed"),
        BucketDefinition::new("logo_needed")
            .with_name("Waiting on logo")
            .with_rule(
                RuleDefinition::new("lead.needs_logo", OperatorKind::Equals).with_value("true"),
            ),
        BucketDefinition::new("approved")
            .with_rule(RuleDefinition::new("status", OperatorKind::Equals).with_value("approved")),
    ]
}
