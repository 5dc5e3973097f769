//! Given steps for board reconciliation BDD scenarios.

use atelier::board::domain::{BucketDefinition, OperatorKind, RuleDefinition};
use atelier::task::domain::{LeadSummary, Task, TaskRecord, TaskStatus};
use chrono::Utc;
use eyre::WrapErr;
use rstest_bdd_macros::given;

use super::when::reconcile_event;
use super::world::{BoardWorld, standard_buckets};

fn hold_task(
    world: &mut BoardWorld,
    label: String,
    status: &str,
    needs_logo: bool,
) -> Result<(), eyre::Report> {
    let status = TaskStatus::try_from(status)
        .map_err(|err| eyre::eyre!("invalid status in scenario: {err}"))?;
    let now = Utc::now();
    let task = Task::from_record(TaskRecord {
        status,
        lead: Some(LeadSummary {
            needs_logo,
            ..LeadSummary::default()
        }),
        created_at: now,
        updated_at: now,
        ..TaskRecord::default()
    });
    world.tasks.insert(label, task.id());
    world
        .fetcher
        .rows
        .put(task)
        .wrap_err("seed system of record")?;
    Ok(())
}

#[given("a board with the standard buckets")]
fn board_with_standard_buckets(world: &mut BoardWorld) -> Result<(), eyre::Report> {
    world.definitions = standard_buckets();
    world.load_board();
    if let Some(err) = world.load_error.as_ref() {
        return Err(eyre::eyre!("standard buckets failed to load: {err}"));
    }
    Ok(())
}

#[given(r#"the system of record holds task "{label}" with status "{status}""#)]
fn system_holds_task(
    world: &mut BoardWorld,
    label: String,
    status: String,
) -> Result<(), eyre::Report> {
    hold_task(world, label, &status, false)
}

#[given(r#"the system of record holds task "{label}" with status "{status}" needing a logo"#)]
fn system_holds_task_needing_logo(
    world: &mut BoardWorld,
    label: String,
    status: String,
) -> Result<(), eyre::Report> {
    hold_task(world, label, &status, true)
}

#[given(r#"an "{operation}" event for task "{label}" has been reconciled"#)]
fn event_has_been_reconciled(
    world: &mut BoardWorld,
    operation: String,
    label: String,
) -> Result<(), eyre::Report> {
    reconcile_event(world, &operation, &label)
}

#[given("the system of record stops answering")]
fn system_stops_answering(world: &mut BoardWorld) {
    world.fetcher.stall();
}

#[given(r#"bucket definitions where "{first}" excludes "{second}" and "{second_again}" excludes "{first_again}""#)]
fn cyclic_definitions(
    world: &mut BoardWorld,
    first: String,
    second: String,
    second_again: String,
    first_again: String,
) {
    let bucket = |id: &str, excluded: &str| {
        BucketDefinition::new(id)
            .with_rule(RuleDefinition::new("status", OperatorKind::IsNotNull))
            .excluding(excluded)
    };
    world.definitions = vec![bucket(&first, &second), bucket(&second_again, &first_again)];
}
