//! Sub-line-items ("layouts") attached to a design task.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One layout of a design task, carrying its model and image references.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TaskLayout {
    /// Layout row identifier.
    pub id: Uuid,
    /// Position of the layout within its task; layouts are ordered by it.
    pub layout_number: u32,
    /// Reference to the garment model used by this layout.
    pub model_url: Option<String>,
    /// Reference to the rendered layout image.
    pub image_url: Option<String>,
    /// Free-form designer notes.
    pub notes: Option<String>,
}

/// Sorts layouts by `layout_number`, keeping the relative order of equal
/// numbers.
pub(crate) fn sort_layouts(layouts: &mut [TaskLayout]) {
    layouts.sort_by_key(|layout| layout.layout_number);
}
