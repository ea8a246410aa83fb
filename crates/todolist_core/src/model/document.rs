//! Persisted root document and statistics projections.
//!
//! # Responsibility
//! - Own every list (by name) and its ordered task sequence.
//! - Compute per-list and whole-document counts for display and export.
//!
//! # Invariants
//! - List names are unique keys; comparison is exact and case-sensitive.
//! - Key iteration order is insertion order.

use crate::model::task::Task;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Longest accepted list name, in characters.
pub const MAX_LIST_NAME_CHARS: usize = 50;

/// Mapping from list name to its ordered tasks.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Document {
    lists: IndexMap<String, Vec<Task>>,
}

impl Document {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.lists.is_empty()
    }

    pub fn len(&self) -> usize {
        self.lists.len()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.lists.contains_key(name)
    }

    pub fn get(&self, name: &str) -> Option<&Vec<Task>> {
        self.lists.get(name)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut Vec<Task>> {
        self.lists.get_mut(name)
    }

    /// Inserts or wholesale-replaces a list.
    ///
    /// An existing name keeps its position; a new name is appended.
    pub fn insert(&mut self, name: impl Into<String>, tasks: Vec<Task>) -> Option<Vec<Task>> {
        self.lists.insert(name.into(), tasks)
    }

    /// Removes a list, keeping the relative order of the remaining lists.
    pub fn remove(&mut self, name: &str) -> Option<Vec<Task>> {
        self.lists.shift_remove(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.lists.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[Task])> {
        self.lists
            .iter()
            .map(|(name, tasks)| (name.as_str(), tasks.as_slice()))
    }

    pub fn total_tasks(&self) -> usize {
        self.lists.values().map(Vec::len).sum()
    }

    pub fn total_completed(&self) -> usize {
        self.lists.values().map(|tasks| completed_count(tasks)).sum()
    }

    /// Per-list summaries in document order.
    pub fn summaries(&self) -> Vec<ListSummary> {
        self.iter()
            .map(|(name, tasks)| ListSummary::from_tasks(name, tasks))
            .collect()
    }
}

impl FromIterator<(String, Vec<Task>)> for Document {
    fn from_iter<I: IntoIterator<Item = (String, Vec<Task>)>>(iter: I) -> Self {
        Self {
            lists: iter.into_iter().collect(),
        }
    }
}

/// Display projection of one list's progress.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListSummary {
    pub name: String,
    pub task_count: usize,
    pub completed_count: usize,
    /// `round(100 * completed / total)`, 0 for an empty list.
    pub percentage: u8,
    /// Non-empty and every task completed.
    pub is_complete: bool,
}

impl ListSummary {
    pub fn from_tasks(name: &str, tasks: &[Task]) -> Self {
        let task_count = tasks.len();
        let completed_count = completed_count(tasks);
        Self {
            name: name.to_string(),
            task_count,
            completed_count,
            percentage: percentage(completed_count, task_count),
            is_complete: task_count > 0 && completed_count == task_count,
        }
    }

    pub fn pending_count(&self) -> usize {
        self.task_count - self.completed_count
    }
}

/// Export statistics entry for one list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListStatistics {
    pub total: usize,
    pub completed: usize,
    pub pending: usize,
}

impl ListStatistics {
    pub fn from_tasks(tasks: &[Task]) -> Self {
        let total = tasks.len();
        let completed = completed_count(tasks);
        Self {
            total,
            completed,
            pending: total - completed,
        }
    }
}

pub fn completed_count(tasks: &[Task]) -> usize {
    tasks.iter().filter(|task| task.completed).count()
}

/// Rounded completion percentage, halves rounding up.
pub fn percentage(completed: usize, total: usize) -> u8 {
    if total == 0 {
        return 0;
    }
    let rounded = (200 * completed + total) / (2 * total);
    rounded.min(100) as u8
}

#[cfg(test)]
mod tests {
    use super::{percentage, Document, ListSummary};
    use crate::model::task::Task;
    use chrono::Utc;

    #[test]
    fn percentage_rounds_half_up_and_handles_empty() {
        assert_eq!(percentage(0, 0), 0);
        assert_eq!(percentage(1, 2), 50);
        assert_eq!(percentage(1, 3), 33);
        assert_eq!(percentage(2, 3), 67);
        assert_eq!(percentage(1, 8), 13);
        assert_eq!(percentage(4, 4), 100);
    }

    #[test]
    fn summary_flags_complete_only_when_non_empty() {
        assert!(!ListSummary::from_tasks("empty", &[]).is_complete);

        let mut done = Task::new("a");
        done.complete(Utc::now());
        let summary = ListSummary::from_tasks("done", &[done]);
        assert!(summary.is_complete);
        assert_eq!(summary.percentage, 100);
        assert_eq!(summary.pending_count(), 0);
    }

    #[test]
    fn document_keeps_insertion_order_through_json() {
        let mut doc = Document::new();
        doc.insert("zeta", Vec::new());
        doc.insert("alpha", vec![Task::new("x")]);
        doc.insert("mid", Vec::new());
        doc.remove("alpha");
        doc.insert("alpha", Vec::new());

        let json = serde_json::to_string(&doc).expect("document should serialize");
        let back: Document = serde_json::from_str(&json).expect("document should parse");
        assert_eq!(back.names().collect::<Vec<_>>(), ["zeta", "mid", "alpha"]);
    }
}
