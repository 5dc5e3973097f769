//! When steps for board reconciliation BDD scenarios.

use atelier::sync::domain::{ChangeEvent, ChangeOperation, SourceTable};
use atelier::task::domain::{Task, TaskLayout, TaskStatus};
use chrono::Utc;
use eyre::WrapErr;
use rstest_bdd_macros::when;
use serde_json::json;
use uuid::Uuid;

use super::world::{BoardWorld, run_async};

fn operation(raw: &str) -> Result<ChangeOperation, eyre::Report> {
    serde_json::from_value(json!(raw)).wrap_err_with(|| format!("unknown operation {raw}"))
}

/// Publishes a task-table event carrying the current row and reconciles it.
pub fn reconcile_event(
    world: &mut BoardWorld,
    raw_operation: &str,
    label: &str,
) -> Result<(), eyre::Report> {
    let row = world.row(label)?;
    let event = ChangeEvent::new(SourceTable::Tasks, operation(raw_operation)?)
        .with_new_payload(row.to_document());
    world.last_outcome = Some(run_async(world.reconciler.handle_event(&event)));
    Ok(())
}

fn rewrite_row(
    world: &mut BoardWorld,
    label: &str,
    edit: impl FnOnce(&mut atelier::task::domain::TaskRecord),
) -> Result<(), eyre::Report> {
    let mut record = world.row(label)?.record().clone();
    edit(&mut record);
    world
        .fetcher
        .rows
        .put(Task::from_record(record))
        .wrap_err("update system of record")?;
    Ok(())
}

#[when(r#"an "{operation}" event for task "{label}" is reconciled"#)]
fn event_is_reconciled(
    world: &mut BoardWorld,
    operation: String,
    label: String,
) -> Result<(), eyre::Report> {
    reconcile_event(world, &operation, &label)
}

#[when(r#"task "{label}" is soft-deleted and its "{operation}" event is reconciled"#)]
fn task_is_soft_deleted(
    world: &mut BoardWorld,
    label: String,
    operation: String,
) -> Result<(), eyre::Report> {
    rewrite_row(world, &label, |record| record.deleted_at = Some(Utc::now()))?;
    reconcile_event(world, &operation, &label)
}

#[when(r#"task "{label}" moves to status "{status}" and its "{operation}" event is reconciled"#)]
fn task_changes_status(
    world: &mut BoardWorld,
    label: String,
    status: String,
    operation: String,
) -> Result<(), eyre::Report> {
    let status = TaskStatus::try_from(status.as_str())
        .map_err(|err| eyre::eyre!("invalid status in scenario: {err}"))?;
    // The row changes while the fetcher is stalled; the event still names it.
    rewrite_row(world, &label, |record| record.status = status)?;
    reconcile_event(world, &operation, &label)
}

#[when(r#"layouts "{numbers}" are added to task "{label}" and a layout event is reconciled"#)]
fn layouts_are_added(
    world: &mut BoardWorld,
    numbers: String,
    label: String,
) -> Result<(), eyre::Report> {
    let layout_numbers = numbers
        .split(',')
        .map(|raw| raw.trim().parse::<u32>())
        .collect::<Result<Vec<_>, _>>()
        .wrap_err("layout numbers")?;
    let task_id = world.task_id(&label)?;

    let mut last_layout = None;
    for layout_number in layout_numbers {
        let layout = TaskLayout {
            id: Uuid::new_v4(),
            layout_number,
            ..TaskLayout::default()
        };
        last_layout = Some(layout.id);
        // Append unsorted, the way rows arrive from the database.
        let mut record = world.row(&label)?.record().clone();
        record.task_layouts.push(layout);
        world
            .fetcher
            .rows
            .put(Task::from_record(record))
            .wrap_err("add layout")?;
    }

    let layout_id = last_layout.ok_or_else(|| eyre::eyre!("no layouts given"))?;
    let event = ChangeEvent::new(SourceTable::TaskLayouts, ChangeOperation::Insert)
        .with_new_payload(json!({ "id": layout_id, "task_id": task_id.to_string() }));
    world.last_outcome = Some(run_async(world.reconciler.handle_event(&event)));
    Ok(())
}

#[when("the board is loaded")]
fn board_is_loaded(world: &mut BoardWorld) {
    world.load_board();
}
