//! Import/export use-case service.
//!
//! # Responsibility
//! - Build single-list and complete-lists export envelopes.
//! - Parse, classify and normalize incoming envelopes into an `ImportPlan`.
//! - Apply plans as wholesale list replacement in one save.
//!
//! # Invariants
//! - Import replaces same-named lists; it never merges task sequences.
//! - Imported tasks always satisfy the `Task` shape after normalization.
//! - Imported list names obey the same rules as created ones, trimmed.
//! - A failed parse or classification writes nothing.
//! - Re-importing an export of the current document leaves it unchanged.

use crate::model::document::{completed_count, Document};
use crate::model::envelope::{CompleteListsExport, ExportType, SingleListExport};
use crate::model::normalize::decode_tasks;
use crate::model::task::Task;
use crate::model::time::now_millis;
use crate::service::error::{ServiceError, ServiceResult};
use crate::service::list_service::validate_list_name;
use crate::service::load_document;
use crate::store::DocumentStore;
use chrono::NaiveDate;
use log::{info, warn};
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{Map, Value};
use std::collections::HashSet;

pub use crate::model::normalize::PLACEHOLDER_TASK_TEXT;

/// Name used for single-list imports that carry no `listName`.
pub const FALLBACK_LIST_NAME: &str = "Imported List";

static FILE_NAME_UNSAFE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^A-Za-z0-9]").expect("valid file name regex"));

/// Which envelope shape an import was recognized as.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportSource {
    /// `exportType == "complete_lists"` with a `lists` object.
    CompleteLists,
    /// `exportType == "single_list"`.
    SingleList,
    /// Top-level `tasks` array without a recognized `exportType`.
    Legacy,
}

/// One list as it will be written by an import.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportedList {
    pub name: String,
    pub tasks: Vec<Task>,
}

/// Normalized import, ready for confirmation and apply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportPlan {
    pub source: ImportSource,
    pub lists: Vec<ImportedList>,
    /// Names not present in the document when the plan was made.
    pub new_lists: Vec<String>,
    /// Names whose current tasks will be discarded.
    pub replaced_lists: Vec<String>,
    pub total_tasks: usize,
    pub completed_tasks: usize,
}

impl ImportPlan {
    fn new(source: ImportSource, lists: Vec<ImportedList>, document: &Document) -> Self {
        let (replaced_lists, new_lists): (Vec<String>, Vec<String>) = lists
            .iter()
            .map(|list| list.name.clone())
            .partition(|name| document.contains(name));
        let total_tasks = lists.iter().map(|list| list.tasks.len()).sum();
        let completed_tasks = lists.iter().map(|list| completed_count(&list.tasks)).sum();
        Self {
            source,
            lists,
            new_lists,
            replaced_lists,
            total_tasks,
            completed_tasks,
        }
    }

    pub fn list_names(&self) -> impl Iterator<Item = &str> {
        self.lists.iter().map(|list| list.name.as_str())
    }
}

/// Counts reported after an import was applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImportSummary {
    /// Lists that did not exist before.
    pub imported: usize,
    /// Lists whose tasks were replaced.
    pub replaced: usize,
    pub total_tasks: usize,
}

/// Transfer facade over a document store.
pub struct TransferService<S: DocumentStore> {
    store: S,
}

impl<S: DocumentStore> TransferService<S> {
    /// Creates a service using the provided store.
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Exports one list.
    pub fn export_list(&self, name: &str) -> ServiceResult<SingleListExport> {
        let document = load_document(&self.store)?;
        let tasks = document
            .get(name)
            .ok_or_else(|| ServiceError::ListNotFound(name.to_string()))?;
        let export = SingleListExport::new(name, tasks, now_millis());
        info!(
            "event=export module=transfer status=ok kind={} tasks={}",
            ExportType::SingleList.as_str(),
            export.total_tasks
        );
        Ok(export)
    }

    /// Exports every list with statistics.
    pub fn export_all(&self) -> ServiceResult<CompleteListsExport> {
        let document = load_document(&self.store)?;
        if document.is_empty() {
            return Err(ServiceError::EmptyDocument);
        }
        let export = CompleteListsExport::new(&document, now_millis());
        info!(
            "event=export module=transfer status=ok kind={} lists={} tasks={}",
            ExportType::CompleteLists.as_str(),
            export.total_lists,
            export.total_tasks
        );
        Ok(export)
    }

    /// Parses and classifies an envelope without writing anything.
    pub fn plan_import(&self, raw: &str) -> ServiceResult<ImportPlan> {
        let envelope = parse_envelope(raw)?;
        let (source, lists) = classify_envelope(&envelope)?;
        let document = load_document(&self.store)?;
        Ok(ImportPlan::new(source, lists, &document))
    }

    /// Plans replacing the tasks of an existing `target` list with the
    /// envelope's tasks, whatever list name the envelope carries.
    pub fn plan_import_into(&self, target: &str, raw: &str) -> ServiceResult<ImportPlan> {
        let envelope = parse_envelope(raw)?;
        let document = load_document(&self.store)?;
        if !document.contains(target) {
            return Err(ServiceError::ListNotFound(target.to_string()));
        }
        let Some(tasks) = envelope.get("tasks").and_then(Value::as_array) else {
            return Err(ServiceError::InvalidFormat(
                "expected a `tasks` array".to_string(),
            ));
        };
        let source = single_list_source(&envelope);
        let lists = vec![ImportedList {
            name: target.to_string(),
            tasks: normalize_tasks(tasks)?,
        }];
        Ok(ImportPlan::new(source, lists, &document))
    }

    /// Writes a plan: each list is inserted or wholesale-replaced, then one save.
    pub fn apply_import(&self, plan: &ImportPlan) -> ServiceResult<ImportSummary> {
        let mut document = load_document(&self.store)?;
        let mut summary = ImportSummary {
            imported: 0,
            replaced: 0,
            total_tasks: plan.total_tasks,
        };

        for list in &plan.lists {
            if document.insert(list.name.clone(), list.tasks.clone()).is_some() {
                summary.replaced += 1;
            } else {
                summary.imported += 1;
            }
        }

        self.store.save(&document)?;
        info!(
            "event=import module=transfer status=ok imported={} replaced={} tasks={}",
            summary.imported, summary.replaced, summary.total_tasks
        );
        Ok(summary)
    }

    /// Plans and applies an import in one step.
    pub fn import_envelope(&self, raw: &str) -> ServiceResult<ImportSummary> {
        let plan = self.plan_import(raw)?;
        self.apply_import(&plan)
    }

    /// Plans and applies a list-page import into `target` in one step.
    pub fn import_into(&self, target: &str, raw: &str) -> ServiceResult<ImportSummary> {
        let plan = self.plan_import_into(target, raw)?;
        self.apply_import(&plan)
    }
}

/// File name for a single-list export, e.g. `my_list_2024-03-09.json`.
pub fn list_export_file_name(list_name: &str, date: NaiveDate) -> String {
    let stem = FILE_NAME_UNSAFE_RE
        .replace_all(list_name, "_")
        .to_lowercase();
    format!("{stem}_{}.json", date.format("%Y-%m-%d"))
}

/// File name for a complete-lists export.
pub fn all_lists_export_file_name(date: NaiveDate) -> String {
    format!("all_todo_lists_{}.json", date.format("%Y-%m-%d"))
}

fn parse_envelope(raw: &str) -> ServiceResult<Map<String, Value>> {
    let value: Value = serde_json::from_str(raw).map_err(|err| {
        warn!("event=import module=transfer status=error error_code=parse_failed");
        ServiceError::ParseError(err.to_string())
    })?;
    match value {
        Value::Object(map) => Ok(map),
        _ => Err(ServiceError::InvalidFormat(
            "envelope must be a JSON object".to_string(),
        )),
    }
}

fn classify_envelope(
    envelope: &Map<String, Value>,
) -> ServiceResult<(ImportSource, Vec<ImportedList>)> {
    let export_type = envelope.get("exportType").and_then(Value::as_str);

    if export_type == Some(ExportType::CompleteLists.as_str()) {
        if let Some(lists) = envelope.get("lists").and_then(Value::as_object) {
            let mut imported = Vec::with_capacity(lists.len());
            let mut names = HashSet::with_capacity(lists.len());
            for (name, tasks) in lists {
                let tasks = tasks.as_array().ok_or_else(|| {
                    ServiceError::InvalidFormat(format!("list `{name}` is not a task array"))
                })?;
                let name = imported_list_name(name)?;
                if !names.insert(name.clone()) {
                    return Err(ServiceError::InvalidFormat(format!(
                        "list `{name}` appears more than once"
                    )));
                }
                imported.push(ImportedList {
                    name,
                    tasks: normalize_tasks(tasks)?,
                });
            }
            return Ok((ImportSource::CompleteLists, imported));
        }
    }

    if let Some(tasks) = envelope.get("tasks").and_then(Value::as_array) {
        let name = match envelope.get("listName").and_then(Value::as_str) {
            Some(name) if !name.trim().is_empty() => imported_list_name(name)?,
            _ => FALLBACK_LIST_NAME.to_string(),
        };
        let imported = vec![ImportedList {
            name,
            tasks: normalize_tasks(tasks)?,
        }];
        return Ok((single_list_source(envelope), imported));
    }

    warn!("event=import module=transfer status=error error_code=unrecognized_envelope");
    Err(ServiceError::InvalidFormat(
        "expected a `complete_lists` envelope or a `tasks` array".to_string(),
    ))
}

fn single_list_source(envelope: &Map<String, Value>) -> ImportSource {
    match envelope.get("exportType").and_then(Value::as_str) {
        Some(kind) if kind == ExportType::SingleList.as_str() => ImportSource::SingleList,
        _ => ImportSource::Legacy,
    }
}

fn imported_list_name(name: &str) -> ServiceResult<String> {
    validate_list_name(name)
        .map(str::to_string)
        .map_err(|err| ServiceError::InvalidFormat(err.to_string()))
}

/// Fills defaults for missing task fields; any non-object entry fails the import.
fn normalize_tasks(values: &[Value]) -> ServiceResult<Vec<Task>> {
    let decoded = decode_tasks(values);
    if decoded.rejected > 0 {
        return Err(ServiceError::InvalidFormat(
            "task entries must be JSON objects".to_string(),
        ));
    }
    Ok(decoded.tasks)
}
