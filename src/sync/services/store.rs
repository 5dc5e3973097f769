//! Authoritative in-memory collection of live tasks.

use std::collections::HashMap;
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use tokio::sync::watch;

use crate::task::domain::{LeadId, Task, TaskId, sort_tasks};

/// Effect of a single store mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreWrite {
    /// The task was not present and has been added.
    Inserted,
    /// A different copy of the task has been overwritten.
    Replaced,
    /// An identical copy was already stored.
    Unchanged,
    /// The task has been removed.
    Removed,
    /// Removal was requested for a task that is not stored.
    Absent,
}

#[derive(Debug, Default)]
struct StoreState {
    tasks: HashMap<TaskId, Task>,
    focused: Option<Task>,
}

impl StoreState {
    fn refresh_focus_from(&mut self, task: &Task) -> bool {
        match self.focused.as_mut() {
            Some(focused) if focused.id() == task.id() && *focused != *task => {
                task.clone_into(focused);
                true
            }
            _ => false,
        }
    }

    fn clear_focus_if(&mut self, task_id: TaskId) -> bool {
        if self.focused.as_ref().is_some_and(|focused| focused.id() == task_id) {
            self.focused = None;
            return true;
        }
        false
    }
}

/// Task collection plus the currently focused task.
///
/// Every mutation happens under one write lock, so the focused copy never
/// lags behind the stored copy of the same task. Soft-deleted tasks are never
/// stored. Observers can [`subscribe`](Self::subscribe) to a revision counter
/// that advances on every effective change.
#[derive(Debug)]
pub struct TaskStore {
    state: RwLock<StoreState>,
    revision: watch::Sender<u64>,
}

impl Default for TaskStore {
    fn default() -> Self {
        Self::new()
    }
}

impl TaskStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        let (revision, _) = watch::channel(0);
        Self {
            state: RwLock::new(StoreState::default()),
            revision,
        }
    }

    // Mutations are single map operations, so a poisoned guard still holds
    // a consistent state.
    fn read(&self) -> RwLockReadGuard<'_, StoreState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, StoreState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }

    fn bump(&self) {
        self.revision.send_modify(|revision| *revision += 1);
    }

    /// Inserts or overwrites a task wholesale.
    ///
    /// A soft-deleted task is removed instead. The focused copy is refreshed
    /// in the same step when it refers to the same task.
    pub fn replace(&self, task: Task) -> StoreWrite {
        if task.is_deleted() {
            return self.remove(task.id());
        }

        let (write, focus_changed) = {
            let mut state = self.write();
            let focus_changed = state.refresh_focus_from(&task);
            let outcome = match state.tasks.get(&task.id()) {
                None => StoreWrite::Inserted,
                Some(existing) if *existing == task => StoreWrite::Unchanged,
                Some(_) => StoreWrite::Replaced,
            };
            if outcome != StoreWrite::Unchanged {
                state.tasks.insert(task.id(), task);
            }
            (outcome, focus_changed)
        };

        if write != StoreWrite::Unchanged || focus_changed {
            self.bump();
        }
        write
    }

    /// Removes a task, clearing the focus when it points at that task.
    pub fn remove(&self, task_id: TaskId) -> StoreWrite {
        let (removed, focus_cleared) = {
            let mut state = self.write();
            let focus_cleared = state.clear_focus_if(task_id);
            (state.tasks.remove(&task_id).is_some(), focus_cleared)
        };

        if removed || focus_cleared {
            self.bump();
        }
        if removed {
            StoreWrite::Removed
        } else {
            StoreWrite::Absent
        }
    }

    /// Replaces the whole collection in one step.
    ///
    /// Soft-deleted tasks are skipped. A focused task present in `tasks` is
    /// refreshed; otherwise the focus is left alone.
    pub fn replace_all(&self, tasks: impl IntoIterator<Item = Task>) {
        {
            let mut state = self.write();
            let fresh: HashMap<TaskId, Task> = tasks
                .into_iter()
                .filter(|task| !task.is_deleted())
                .map(|task| (task.id(), task))
                .collect();
            let focused_copy = state
                .focused
                .as_ref()
                .and_then(|focused| fresh.get(&focused.id()))
                .cloned();
            if let Some(copy) = focused_copy {
                state.focused = Some(copy);
            }
            state.tasks = fresh;
        }
        self.bump();
    }

    /// Refreshes the focused copy from a side-channel fetch.
    ///
    /// Does nothing unless `task` is the focused task. The stored copy, if
    /// any, is replaced too; a task that is not stored is not inserted.
    /// Returns `true` when the focus referred to `task`.
    pub fn refresh_focused(&self, task: Task) -> bool {
        let mut state = self.write();
        if state.focused.as_ref().map(Task::id) != Some(task.id()) {
            return false;
        }
        if task.is_deleted() {
            state.focused = None;
            state.tasks.remove(&task.id());
        } else {
            if let Some(stored) = state.tasks.get_mut(&task.id()) {
                task.clone_into(stored);
            }
            state.focused = Some(task);
        }
        drop(state);
        self.bump();
        true
    }

    /// Returns a copy of the task with the given identifier.
    #[must_use]
    pub fn get(&self, task_id: TaskId) -> Option<Task> {
        self.read().tasks.get(&task_id).cloned()
    }

    /// Returns `true` when the task is stored.
    #[must_use]
    pub fn contains(&self, task_id: TaskId) -> bool {
        self.read().tasks.contains_key(&task_id)
    }

    /// Returns the number of stored tasks.
    #[must_use]
    pub fn len(&self) -> usize {
        self.read().tasks.len()
    }

    /// Returns `true` when no task is stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.read().tasks.is_empty()
    }

    /// Returns every stored task, most recently created first.
    ///
    /// Ties on `created_at` are broken by identifier so the order is stable.
    #[must_use]
    pub fn snapshot(&self) -> Vec<Task> {
        let mut tasks: Vec<Task> = self.read().tasks.values().cloned().collect();
        sort_tasks(&mut tasks);
        tasks
    }

    /// Returns the identifiers of stored tasks created from `lead_id`.
    #[must_use]
    pub fn task_ids_for_lead(&self, lead_id: LeadId) -> Vec<TaskId> {
        let mut ids: Vec<TaskId> = self
            .read()
            .tasks
            .values()
            .filter(|task| task.lead_id() == Some(lead_id))
            .map(Task::id)
            .collect();
        ids.sort_unstable();
        ids
    }

    /// Focuses a task.
    ///
    /// When the store holds a copy of the same task, that copy is focused so
    /// both stay identical. Focusing a soft-deleted task clears the focus.
    pub fn focus(&self, task: Task) {
        {
            let mut state = self.write();
            let focused = if task.is_deleted() {
                None
            } else {
                Some(state.tasks.get(&task.id()).cloned().unwrap_or(task))
            };
            state.focused = focused;
        }
        self.bump();
    }

    /// Clears the focus.
    pub fn clear_focus(&self) {
        let cleared = self.write().focused.take().is_some();
        if cleared {
            self.bump();
        }
    }

    /// Returns a copy of the focused task.
    #[must_use]
    pub fn focused(&self) -> Option<Task> {
        self.read().focused.clone()
    }

    /// Returns the identifier of the focused task.
    #[must_use]
    pub fn focused_id(&self) -> Option<TaskId> {
        self.read().focused.as_ref().map(Task::id)
    }

    /// Returns the current revision.
    #[must_use]
    pub fn revision(&self) -> u64 {
        *self.revision.borrow()
    }

    /// Subscribes to revision changes.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.revision.subscribe()
    }
}
