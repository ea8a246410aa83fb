//! Import/export envelope shapes.
//!
//! Both envelopes render as pretty-printed JSON with the camelCase field
//! names of the exchange format, in a fixed field order.

use crate::model::document::{completed_count, Document, ListStatistics};
use crate::model::task::Task;
use crate::model::time::iso_millis;
use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// `exportType` discriminator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExportType {
    SingleList,
    CompleteLists,
}

impl ExportType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::SingleList => "single_list",
            Self::CompleteLists => "complete_lists",
        }
    }
}

/// Export of one list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SingleListExport {
    pub export_type: ExportType,
    pub list_name: String,
    pub tasks: Vec<Task>,
    #[serde(with = "iso_millis")]
    pub exported_at: DateTime<Utc>,
    pub total_tasks: usize,
    pub completed_tasks: usize,
}

impl SingleListExport {
    pub fn new(list_name: &str, tasks: &[Task], exported_at: DateTime<Utc>) -> Self {
        Self {
            export_type: ExportType::SingleList,
            list_name: list_name.to_string(),
            tasks: tasks.to_vec(),
            exported_at,
            total_tasks: tasks.len(),
            completed_tasks: completed_count(tasks),
        }
    }

    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

/// Export of the whole document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompleteListsExport {
    pub export_type: ExportType,
    #[serde(with = "iso_millis")]
    pub exported_at: DateTime<Utc>,
    pub total_lists: usize,
    pub total_tasks: usize,
    pub total_completed: usize,
    pub statistics: IndexMap<String, ListStatistics>,
    pub lists: Document,
}

impl CompleteListsExport {
    pub fn new(document: &Document, exported_at: DateTime<Utc>) -> Self {
        let statistics = document
            .iter()
            .map(|(name, tasks)| (name.to_string(), ListStatistics::from_tasks(tasks)))
            .collect();
        Self {
            export_type: ExportType::CompleteLists,
            exported_at,
            total_lists: document.len(),
            total_tasks: document.total_tasks(),
            total_completed: document.total_completed(),
            statistics,
            lists: document.clone(),
        }
    }

    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}
