//! Domain model for design tasks.
//!
//! A task is the denormalized read model the board works with: the task row
//! plus fields joined from its customer, campaign, lead, and layouts. The
//! domain keeps the ordering and soft-delete rules of that read model; how
//! it is queried stays outside the domain boundary.

mod error;
mod ids;
mod layout;
mod task;

pub use error::{ParseTaskStatusError, TaskDomainError};
pub use ids::{LeadId, TaskId};
pub use layout::TaskLayout;
pub use task::{
    BusinessSegment, CampaignSummary, CustomerSummary, LeadSummary, Task, TaskPriority,
    TaskRecord, TaskStatus, sort_tasks,
};
