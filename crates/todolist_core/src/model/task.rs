//! Task record.
//!
//! # Invariants
//! - `id` is stable and never reused for another task in the same list.
//! - `created_at` is set once at creation and never changes.
//! - `complete`/`reopen` keep `completed` and `completed_at` in lockstep.

use crate::model::time::{iso_millis, iso_millis_opt, now_millis};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable identifier used to reference a task inside its list.
pub type TaskId = Uuid;

/// One to-do item.
///
/// Serialized with the camelCase field names of the storage and
/// import/export formats (`createdAt`, `completedAt`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: TaskId,
    pub text: String,
    pub completed: bool,
    #[serde(with = "iso_millis")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "iso_millis_opt")]
    pub completed_at: Option<DateTime<Utc>>,
}

impl Task {
    /// Creates an open task with a generated id, stamped with the current time.
    pub fn new(text: impl Into<String>) -> Self {
        Self::with_id(Uuid::new_v4(), text, now_millis())
    }

    /// Creates an open task with caller-provided identity and creation time.
    ///
    /// Used by import and load paths where identity already exists.
    pub fn with_id(id: TaskId, text: impl Into<String>, created_at: DateTime<Utc>) -> Self {
        Self {
            id,
            text: text.into(),
            completed: false,
            created_at,
            completed_at: None,
        }
    }

    /// Marks the task completed at `at`.
    pub fn complete(&mut self, at: DateTime<Utc>) {
        self.completed = true;
        self.completed_at = Some(at);
    }

    /// Marks the task open again and clears the completion timestamp.
    pub fn reopen(&mut self) {
        self.completed = false;
        self.completed_at = None;
    }

    /// Flips completion state, stamping `at` when the task becomes completed.
    pub fn toggle(&mut self, at: DateTime<Utc>) {
        if self.completed {
            self.reopen();
        } else {
            self.complete(at);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::Task;
    use chrono::{Duration, Utc};

    #[test]
    fn new_task_starts_open() {
        let task = Task::new("write report");
        assert!(!task.completed);
        assert!(task.completed_at.is_none());
    }

    #[test]
    fn toggle_keeps_completed_at_in_lockstep() {
        let mut task = Task::new("write report");
        let at = task.created_at + Duration::seconds(5);

        task.toggle(at);
        assert!(task.completed);
        assert_eq!(task.completed_at, Some(at));

        task.toggle(Utc::now());
        assert!(!task.completed);
        assert!(task.completed_at.is_none());
    }

    #[test]
    fn serializes_with_camel_case_timestamps() {
        let task = Task::new("x");
        let json = serde_json::to_value(&task).expect("task should serialize");
        assert!(json.get("createdAt").is_some());
        assert!(json.get("completedAt").expect("completedAt key").is_null());
        assert!(json.get("created_at").is_none());
    }
}
