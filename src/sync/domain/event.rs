//! Change notifications delivered by the monitored tables.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

use super::EventError;
use crate::task::domain::{LeadId, TaskId};

/// Table a change notification originates from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceTable {
    /// The design task table itself.
    Tasks,
    /// Layout rows keyed by `task_id`.
    TaskLayouts,
    /// Sales leads referenced by `lead_id` on tasks.
    Leads,
    /// Customer change requests keyed by `task_id`.
    ChangeRequests,
}

impl SourceTable {
    /// Returns the canonical table name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Tasks => "tasks",
            Self::TaskLayouts => "task_layouts",
            Self::Leads => "leads",
            Self::ChangeRequests => "change_requests",
        }
    }
}

impl fmt::Display for SourceTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Kind of row mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeOperation {
    /// A row was inserted.
    Insert,
    /// A row was updated.
    Update,
    /// A row was hard-deleted.
    Delete,
}

impl ChangeOperation {
    /// Returns the canonical operation name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Insert => "insert",
            Self::Update => "update",
            Self::Delete => "delete",
        }
    }
}

impl fmt::Display for ChangeOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single change notification with raw row snapshots.
///
/// # Examples
///
/// ```
/// use atelier::sync::domain::{ChangeEvent, ChangeOperation, SourceTable};
/// use serde_json::json;
///
/// let event = ChangeEvent::new(SourceTable::Tasks, ChangeOperation::Update)
///     .with_new_payload(json!({ "id": "6f1c2d9e-6a43-4d7b-9a57-1f0f3f4a2b10" }));
/// assert_eq!(event.source_table(), SourceTable::Tasks);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChangeEvent {
    source_table: SourceTable,
    operation: ChangeOperation,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    new_payload: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    old_payload: Option<Value>,
}

/// What the reconciler has to do for an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventTarget {
    /// The task was hard- or soft-deleted.
    Remove(TaskId),
    /// The task, or one of its layouts, changed.
    Refetch(TaskId),
    /// A lead changed; every task referencing it is affected.
    Lead(LeadId),
    /// Side-channel data of a task changed; only the focused copy cares.
    FocusRefresh(TaskId),
}

impl ChangeEvent {
    /// Creates an event without payload snapshots.
    #[must_use]
    pub const fn new(source_table: SourceTable, operation: ChangeOperation) -> Self {
        Self {
            source_table,
            operation,
            new_payload: None,
            old_payload: None,
        }
    }

    /// Sets the row snapshot after the change.
    #[must_use]
    pub fn with_new_payload(mut self, payload: Value) -> Self {
        self.new_payload = Some(payload);
        self
    }

    /// Sets the row snapshot before the change.
    #[must_use]
    pub fn with_old_payload(mut self, payload: Value) -> Self {
        self.old_payload = Some(payload);
        self
    }

    /// Returns the originating table.
    #[must_use]
    pub const fn source_table(&self) -> SourceTable {
        self.source_table
    }

    /// Returns the mutation kind.
    #[must_use]
    pub const fn operation(&self) -> ChangeOperation {
        self.operation
    }

    /// Returns the row snapshot after the change.
    #[must_use]
    pub const fn new_payload(&self) -> Option<&Value> {
        self.new_payload.as_ref()
    }

    /// Returns the row snapshot before the change.
    #[must_use]
    pub const fn old_payload(&self) -> Option<&Value> {
        self.old_payload.as_ref()
    }

    /// Resolves the entity the event refers to.
    ///
    /// Layout deletes refetch the parent task; only deletes on the task table
    /// remove a task.
    ///
    /// # Errors
    ///
    /// Returns [`EventError`] when neither payload carries a usable
    /// identifier.
    pub fn target(&self) -> Result<EventTarget, EventError> {
        match self.source_table {
            SourceTable::Tasks => {
                let task_id = self.task_id("id")?;
                if self.operation == ChangeOperation::Delete || self.is_soft_delete() {
                    Ok(EventTarget::Remove(task_id))
                } else {
                    Ok(EventTarget::Refetch(task_id))
                }
            }
            SourceTable::TaskLayouts => self.task_id("task_id").map(EventTarget::Refetch),
            SourceTable::Leads => {
                let raw = self.payload_str("id")?;
                LeadId::parse(raw)
                    .map(EventTarget::Lead)
                    .map_err(EventError::InvalidIdentifier)
            }
            SourceTable::ChangeRequests => self.task_id("task_id").map(EventTarget::FocusRefresh),
        }
    }

    /// Returns `true` when the new snapshot carries a `deleted_at` value.
    #[must_use]
    pub fn is_soft_delete(&self) -> bool {
        self.new_payload
            .as_ref()
            .and_then(|payload| payload.get("deleted_at"))
            .is_some_and(|value| !value.is_null())
    }

    fn task_id(&self, key: &'static str) -> Result<TaskId, EventError> {
        let raw = self.payload_str(key)?;
        TaskId::parse(raw).map_err(EventError::InvalidIdentifier)
    }

    /// Looks `key` up in the new snapshot, falling back to the old one.
    fn payload_str(&self, key: &'static str) -> Result<&str, EventError> {
        [self.new_payload.as_ref(), self.old_payload.as_ref()]
            .into_iter()
            .flatten()
            .find_map(|payload| payload.get(key).and_then(Value::as_str))
            .ok_or(EventError::MissingIdentifier {
                source_table: self.source_table,
                key,
            })
    }
}
