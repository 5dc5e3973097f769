//! Then steps for board reconciliation BDD scenarios.

use atelier::board::domain::BucketConfigError;
use atelier::board::services::BoardError;
use atelier::sync::services::{ReconcileOutcome, StaleReason, TaskChange};
use rstest_bdd_macros::then;

use super::world::BoardWorld;

fn bucket_holds(world: &BoardWorld, bucket: &str, label: &str) -> Result<bool, eyre::Report> {
    let task_id = world.task_id(label)?;
    Ok(world
        .board()?
        .tasks_for_bucket(bucket)
        .iter()
        .any(|task| task.id() == task_id))
}

#[then(r#"bucket "{bucket}" contains task "{label}""#)]
fn bucket_contains(world: &BoardWorld, bucket: String, label: String) -> Result<(), eyre::Report> {
    if !bucket_holds(world, &bucket, &label)? {
        return Err(eyre::eyre!(
            "expected {label} in bucket {bucket}, counts are {:?}",
            world.board()?.bucket_counts()
        ));
    }
    Ok(())
}

#[then(r#"bucket "{bucket}" does not contain task "{label}""#)]
fn bucket_does_not_contain(
    world: &BoardWorld,
    bucket: String,
    label: String,
) -> Result<(), eyre::Report> {
    if bucket_holds(world, &bucket, &label)? {
        return Err(eyre::eyre!("did not expect {label} in bucket {bucket}"));
    }
    Ok(())
}

#[then(r#"no bucket contains task "{label}""#)]
fn no_bucket_contains(world: &BoardWorld, label: String) -> Result<(), eyre::Report> {
    let task_id = world.task_id(&label)?;
    let view = world.board()?.view();
    let shown = view
        .columns()
        .any(|(_, tasks)| tasks.iter().any(|task| task.id() == task_id))
        || view.unclassified().iter().any(|task| task.id() == task_id);
    if shown || world.store.contains(task_id) {
        return Err(eyre::eyre!("{label} is still on the board"));
    }
    Ok(())
}

#[then(r#"task "{label}" lists layouts "{numbers}""#)]
fn task_lists_layouts(world: &BoardWorld, label: String, numbers: String) -> Result<(), eyre::Report> {
    let task_id = world.task_id(&label)?;
    let stored = world
        .store
        .get(task_id)
        .ok_or_else(|| eyre::eyre!("{label} is not stored"))?;
    let listed = stored
        .layouts()
        .iter()
        .map(|layout| layout.layout_number.to_string())
        .collect::<Vec<_>>()
        .join(",");
    if listed != numbers {
        return Err(eyre::eyre!("expected layouts {numbers}, found {listed}"));
    }
    Ok(())
}

#[then(r#"the reconciliation reports a timeout for task "{label}""#)]
fn reconciliation_timed_out(world: &BoardWorld, label: String) -> Result<(), eyre::Report> {
    let task_id = world.task_id(&label)?;
    let outcome = world
        .last_outcome
        .as_ref()
        .ok_or_else(|| eyre::eyre!("no event has been reconciled"))?;
    let expected = ReconcileOutcome::Applied(vec![TaskChange::Stale {
        task_id,
        reason: StaleReason::TimedOut,
    }]);
    if *outcome != expected {
        return Err(eyre::eyre!("expected a timeout, got {outcome:?}"));
    }
    Ok(())
}

#[then(r#"loading fails with a cycle through "{first}" and "{second}""#)]
fn loading_fails_with_cycle(
    world: &BoardWorld,
    first: String,
    second: String,
) -> Result<(), eyre::Report> {
    let Some(BoardError::Config(BucketConfigError::CyclicExclusion { cycle })) =
        world.load_error.as_ref()
    else {
        return Err(eyre::eyre!(
            "expected a cyclic exclusion error, got {:?}",
            world.load_error
        ));
    };
    let names: Vec<&str> = cycle.iter().map(|id| id.as_str()).collect();
    if names != [first.as_str(), second.as_str(), first.as_str()] {
        return Err(eyre::eyre!("unexpected cycle {names:?}"));
    }
    Ok(())
}
