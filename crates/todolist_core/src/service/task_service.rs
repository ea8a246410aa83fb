//! Task ledger use-case service.
//!
//! # Responsibility
//! - Append, toggle, edit and remove tasks inside one named list.
//!
//! # Invariants
//! - Task text is stored trimmed and is never blank.
//! - Toggle keeps `completed` and `completed_at` in lockstep.
//! - Edit never touches timestamps.
//! - Tasks are addressed by `TaskId`, never by position.

use crate::model::document::{Document, ListSummary};
use crate::model::task::{Task, TaskId};
use crate::model::time::now_millis;
use crate::service::error::{ServiceError, ServiceResult};
use crate::service::load_document;
use crate::store::DocumentStore;
use log::info;

/// Result of toggling one task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToggleOutcome {
    /// Task state after the toggle.
    pub task: Task,
    /// The toggle completed the last open task of the list.
    pub list_completed: bool,
}

/// Task ledger facade over a document store.
pub struct TaskService<S: DocumentStore> {
    store: S,
}

impl<S: DocumentStore> TaskService<S> {
    /// Creates a service using the provided store.
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Appends a new open task to `list` and returns it.
    pub fn append(&self, list: &str, text: &str) -> ServiceResult<Task> {
        let text = validate_task_text(text)?;
        let mut document = load_document(&self.store)?;
        let tasks = tasks_mut(&mut document, list)?;

        let task = Task::new(text);
        tasks.push(task.clone());
        let task_count = tasks.len();
        self.store.save(&document)?;
        info!(
            "event=task_append module=ledger status=ok tasks={}",
            task_count
        );
        Ok(task)
    }

    /// Flips completion of one task.
    pub fn toggle_complete(&self, list: &str, task_id: TaskId) -> ServiceResult<ToggleOutcome> {
        let mut document = load_document(&self.store)?;
        let tasks = tasks_mut(&mut document, list)?;
        let task = find_task(tasks, list, task_id)?;

        task.toggle(now_millis());
        let task = task.clone();
        let list_completed = task.completed && tasks.iter().all(|task| task.completed);

        self.store.save(&document)?;
        info!(
            "event=task_toggle module=ledger status=ok completed={} list_completed={}",
            task.completed, list_completed
        );
        Ok(ToggleOutcome {
            task,
            list_completed,
        })
    }

    /// Replaces the text of one task.
    pub fn edit(&self, list: &str, task_id: TaskId, text: &str) -> ServiceResult<Task> {
        let text = validate_task_text(text)?;
        let mut document = load_document(&self.store)?;
        let tasks = tasks_mut(&mut document, list)?;
        let task = find_task(tasks, list, task_id)?;

        task.text = text.to_string();
        let task = task.clone();
        self.store.save(&document)?;
        info!("event=task_edit module=ledger status=ok");
        Ok(task)
    }

    /// Removes one task and returns it.
    pub fn remove(&self, list: &str, task_id: TaskId) -> ServiceResult<Task> {
        let mut document = load_document(&self.store)?;
        let tasks = tasks_mut(&mut document, list)?;
        let index = tasks
            .iter()
            .position(|task| task.id == task_id)
            .ok_or_else(|| ServiceError::TaskNotFound {
                list: list.to_string(),
                task_id,
            })?;

        let removed = tasks.remove(index);
        let task_count = tasks.len();
        self.store.save(&document)?;
        info!(
            "event=task_remove module=ledger status=ok tasks={}",
            task_count
        );
        Ok(removed)
    }

    /// Progress projection for one list.
    pub fn progress(&self, list: &str) -> ServiceResult<ListSummary> {
        let document = load_document(&self.store)?;
        let tasks = document
            .get(list)
            .ok_or_else(|| ServiceError::ListNotFound(list.to_string()))?;
        Ok(ListSummary::from_tasks(list, tasks))
    }
}

fn validate_task_text(text: &str) -> ServiceResult<&str> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(ServiceError::InvalidInput("task text must not be blank"));
    }
    Ok(trimmed)
}

fn tasks_mut<'doc>(document: &'doc mut Document, list: &str) -> ServiceResult<&'doc mut Vec<Task>> {
    document
        .get_mut(list)
        .ok_or_else(|| ServiceError::ListNotFound(list.to_string()))
}

fn find_task<'a>(tasks: &'a mut [Task], list: &str, task_id: TaskId) -> ServiceResult<&'a mut Task> {
    tasks
        .iter_mut()
        .find(|task| task.id == task_id)
        .ok_or_else(|| ServiceError::TaskNotFound {
            list: list.to_string(),
            task_id,
        })
}
