//! Lenient decoding of task objects from stored or imported JSON.
//!
//! # Invariants
//! - Every decoded task satisfies the `Task` shape; unusable fields get
//!   defaults instead of failing the whole list.
//! - Ids are unique within one decoded list.
//! - Only non-object entries are rejected; the caller decides what that means.

use crate::model::task::{Task, TaskId};
use crate::model::time::{now_millis, parse_iso};
use serde_json::{Map, Value};
use std::collections::HashSet;
use uuid::Uuid;

/// Text given to tasks whose `text` is missing or empty.
pub const PLACEHOLDER_TASK_TEXT: &str = "Imported Task";

/// Tasks decoded from one JSON array.
#[derive(Debug, Default)]
pub(crate) struct DecodedTasks {
    pub tasks: Vec<Task>,
    /// Tasks that needed at least one default or a fresh id.
    pub repaired: usize,
    /// Entries that were not JSON objects and were skipped.
    pub rejected: usize,
}

pub(crate) fn decode_tasks(values: &[Value]) -> DecodedTasks {
    let mut decoded = DecodedTasks::default();
    let mut seen: HashSet<TaskId> = HashSet::with_capacity(values.len());
    for value in values {
        let Some(fields) = value.as_object() else {
            decoded.rejected += 1;
            continue;
        };
        let (task, repaired) = decode_task(fields, &seen);
        seen.insert(task.id);
        if repaired {
            decoded.repaired += 1;
        }
        decoded.tasks.push(task);
    }
    decoded
}

/// Returns the task and whether any field had to be filled in.
fn decode_task(fields: &Map<String, Value>, seen: &HashSet<TaskId>) -> (Task, bool) {
    let id = fields
        .get("id")
        .and_then(Value::as_str)
        .and_then(|raw| Uuid::parse_str(raw).ok())
        .filter(|id| !seen.contains(id));
    let text = fields
        .get("text")
        .and_then(Value::as_str)
        .filter(|text| !text.is_empty());
    let completed = fields.get("completed").and_then(Value::as_bool);
    let created_at = fields
        .get("createdAt")
        .and_then(Value::as_str)
        .and_then(parse_iso);
    let completed_at = match fields.get("completedAt") {
        None | Some(Value::Null) => Ok(None),
        Some(value) => value.as_str().and_then(parse_iso).map(Some).ok_or(()),
    };

    let repaired = id.is_none()
        || text.is_none()
        || completed.is_none()
        || created_at.is_none()
        || completed_at.is_err();

    let mut task = Task::with_id(
        id.unwrap_or_else(Uuid::new_v4),
        text.unwrap_or(PLACEHOLDER_TASK_TEXT),
        created_at.unwrap_or_else(now_millis),
    );
    task.completed = completed.unwrap_or(false);
    task.completed_at = completed_at.unwrap_or(None);
    (task, repaired)
}

#[cfg(test)]
mod tests {
    use super::{decode_tasks, PLACEHOLDER_TASK_TEXT};
    use serde_json::json;

    #[test]
    fn missing_fields_get_defaults() {
        let decoded = decode_tasks(&[json!({}), json!({"text": "", "completed": "yes"})]);
        assert_eq!(decoded.repaired, 2);
        assert!(decoded.tasks.iter().all(|task| task.text == PLACEHOLDER_TASK_TEXT));
        assert!(decoded.tasks.iter().all(|task| !task.completed));
        assert!(decoded.tasks.iter().all(|task| task.completed_at.is_none()));
        assert_ne!(decoded.tasks[0].id, decoded.tasks[1].id);
    }

    #[test]
    fn complete_tasks_are_kept_as_is() {
        let id = "6f1c8a52-3d4b-4e7a-9a51-0c2f4d7e8b90";
        let decoded = decode_tasks(&[json!({
            "id": id,
            "text": "a",
            "completed": true,
            "createdAt": "2024-01-01T10:00:00.000Z",
            "completedAt": "2024-01-02T10:00:00.000Z"
        })]);
        assert_eq!(decoded.repaired, 0);
        assert_eq!(decoded.tasks[0].id.to_string(), id);
        assert!(decoded.tasks[0].completed_at.is_some());
    }

    #[test]
    fn repeated_ids_are_replaced() {
        let id = "6f1c8a52-3d4b-4e7a-9a51-0c2f4d7e8b90";
        let decoded = decode_tasks(&[json!({"id": id, "text": "a"}), json!({"id": id, "text": "b"})]);
        assert_eq!(decoded.tasks[0].id.to_string(), id);
        assert_ne!(decoded.tasks[1].id, decoded.tasks[0].id);
    }

    #[test]
    fn unparseable_completion_time_is_cleared() {
        let decoded = decode_tasks(&[json!({"text": "a", "completed": true, "completedAt": "soon"})]);
        assert!(decoded.tasks[0].completed);
        assert!(decoded.tasks[0].completed_at.is_none());
        assert_eq!(decoded.repaired, 1);
    }

    #[test]
    fn non_objects_are_counted_and_skipped() {
        let decoded = decode_tasks(&[json!("just text"), json!({"text": "kept"})]);
        assert_eq!(decoded.rejected, 1);
        assert_eq!(decoded.tasks.len(), 1);
    }
}
