//! Canonical denormalized task record and its status types.

use super::{LeadId, ParseTaskStatusError, TaskId, TaskLayout, layout::sort_layouts};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

/// Workflow status of a design task.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    /// Task is waiting for a designer.
    #[default]
    Pending,
    /// A designer is working on the task.
    InProgress,
    /// Layouts have been sent to the customer for approval.
    AwaitingApproval,
    /// The customer approved the layouts.
    Approved,
    /// The customer asked for changes.
    ChangesRequested,
    /// The task has been handed to production.
    Completed,
}

impl TaskStatus {
    /// Returns the canonical wire representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::InProgress => "in_progress",
            Self::AwaitingApproval => "awaiting_approval",
            Self::Approved => "approved",
            Self::ChangesRequested => "changes_requested",
            Self::Completed => "completed",
        }
    }
}

impl TryFrom<&str> for TaskStatus {
    type Error = ParseTaskStatusError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let normalized = value.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "pending" => Ok(Self::Pending),
            "in_progress" => Ok(Self::InProgress),
            "awaiting_approval" => Ok(Self::AwaitingApproval),
            "approved" => Ok(Self::Approved),
            "changes_requested" => Ok(Self::ChangesRequested),
            "completed" => Ok(Self::Completed),
            _ => Err(ParseTaskStatusError(value.to_owned())),
        }
    }
}

/// Scheduling priority of a task.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskPriority {
    /// Regular queue position.
    #[default]
    Normal,
    /// Jumps the queue.
    Urgent,
}

/// Customer contact details copied onto the task at fetch time.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CustomerSummary {
    /// Customer display name.
    pub name: Option<String>,
    /// Customer phone number.
    pub phone: Option<String>,
    /// Customer email address.
    pub email: Option<String>,
}

/// Campaign details copied onto the task at fetch time.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CampaignSummary {
    /// Campaign display name.
    pub name: Option<String>,
    /// Segment tag the campaign targets.
    pub segment_tag: Option<String>,
}

/// Business segment of the originating lead.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BusinessSegment {
    /// Segment identifier.
    pub id: Option<Uuid>,
    /// Segment display name.
    pub name: Option<String>,
    /// Icon shown next to the segment name.
    pub icon: Option<String>,
}

/// Lead flags copied onto the task at fetch time.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LeadSummary {
    /// Whether the customer still has to provide or commission a logo.
    pub needs_logo: bool,
    /// Agreed way of handling the logo.
    pub logo_action: Option<String>,
    /// Salesperson pipeline status of the lead.
    pub salesperson_status: Option<String>,
    /// Business segment of the lead.
    pub business_segment: Option<BusinessSegment>,
}

/// Plain field set of a task as produced by the entity fetcher.
///
/// Convert into a [`Task`] with [`Task::from_record`] so that layout ordering
/// is normalized. Every field except `id` may be omitted when decoding; a row
/// without an identifier is rejected.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskRecord {
    /// Task identifier.
    pub id: TaskId,
    /// Order the task belongs to.
    #[serde(default)]
    pub order_id: Option<Uuid>,
    /// Lead the task was created from.
    #[serde(default)]
    pub lead_id: Option<LeadId>,
    /// Campaign the order was placed under.
    #[serde(default)]
    pub campaign_id: Option<Uuid>,
    /// Ordering customer.
    #[serde(default)]
    pub customer_id: Option<Uuid>,
    /// Designer the task is assigned to.
    #[serde(default)]
    pub assigned_to: Option<Uuid>,
    /// Workflow status.
    #[serde(default)]
    pub status: TaskStatus,
    /// Scheduling priority.
    #[serde(default)]
    pub priority: TaskPriority,
    /// Whether the task came back after the customer rejected a proposal.
    #[serde(default)]
    pub returned_from_rejection: bool,
    /// Customer contact details.
    #[serde(default)]
    pub customer: Option<CustomerSummary>,
    /// Ordered quantity.
    #[serde(default)]
    pub quantity: Option<u32>,
    /// Campaign details.
    #[serde(default)]
    pub campaign: Option<CampaignSummary>,
    /// Display name of the assigned designer.
    #[serde(default)]
    pub designer_name: Option<String>,
    /// Display name of the user who created the task.
    #[serde(default)]
    pub creator_name: Option<String>,
    /// Lead flags.
    #[serde(default)]
    pub lead: Option<LeadSummary>,
    /// Layouts of the task.
    #[serde(default)]
    pub task_layouts: Vec<TaskLayout>,
    /// Creation timestamp.
    #[serde(default)]
    pub created_at: DateTime<Utc>,
    /// Latest modification timestamp.
    #[serde(default)]
    pub updated_at: DateTime<Utc>,
    /// Completion timestamp.
    #[serde(default)]
    pub completed_at: Option<DateTime<Utc>>,
    /// Timestamp of the latest status change.
    #[serde(default)]
    pub status_changed_at: Option<DateTime<Utc>>,
    /// Timestamp of the latest assignment.
    #[serde(default)]
    pub assigned_at: Option<DateTime<Utc>>,
    /// Soft-delete marker.
    #[serde(default)]
    pub deleted_at: Option<DateTime<Utc>>,
}

/// Canonical denormalized design task.
///
/// A `Task` is always replaced wholesale; there is no field-level mutation.
/// Layouts are kept sorted by `layout_number`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "TaskRecord", into = "TaskRecord")]
pub struct Task {
    record: TaskRecord,
}

impl Task {
    /// Builds a task from a fetched record, normalizing layout order.
    #[must_use]
    pub fn from_record(mut record: TaskRecord) -> Self {
        sort_layouts(&mut record.task_layouts);
        Self { record }
    }

    /// Returns the task identifier.
    #[must_use]
    pub const fn id(&self) -> TaskId {
        self.record.id
    }

    /// Returns the originating lead, if any.
    #[must_use]
    pub const fn lead_id(&self) -> Option<LeadId> {
        self.record.lead_id
    }

    /// Returns the workflow status.
    #[must_use]
    pub const fn status(&self) -> TaskStatus {
        self.record.status
    }

    /// Returns the scheduling priority.
    #[must_use]
    pub const fn priority(&self) -> TaskPriority {
        self.record.priority
    }

    /// Returns the ordered layouts.
    #[must_use]
    pub fn layouts(&self) -> &[TaskLayout] {
        &self.record.task_layouts
    }

    /// Returns the creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.record.created_at
    }

    /// Returns the latest modification timestamp.
    #[must_use]
    pub const fn updated_at(&self) -> DateTime<Utc> {
        self.record.updated_at
    }

    /// Returns the soft-delete marker.
    #[must_use]
    pub const fn deleted_at(&self) -> Option<DateTime<Utc>> {
        self.record.deleted_at
    }

    /// Returns `true` when the task has been soft-deleted.
    #[must_use]
    pub const fn is_deleted(&self) -> bool {
        self.record.deleted_at.is_some()
    }

    /// Returns the underlying record.
    #[must_use]
    pub const fn record(&self) -> &TaskRecord {
        &self.record
    }

    /// Returns the task as a JSON document for field-path lookups.
    #[must_use]
    pub fn to_document(&self) -> Value {
        // The record has no maps with non-string keys, so this cannot fail.
        serde_json::to_value(&self.record).unwrap_or_default()
    }
}

impl From<TaskRecord> for Task {
    fn from(record: TaskRecord) -> Self {
        Self::from_record(record)
    }
}

impl From<Task> for TaskRecord {
    fn from(task: Task) -> Self {
        task.record
    }
}

/// Sorts tasks into board order: most recently created first, ties broken by
/// identifier.
pub fn sort_tasks(tasks: &mut [Task]) {
    tasks.sort_by_key(|task| (std::cmp::Reverse(task.created_at()), task.id()));
}
