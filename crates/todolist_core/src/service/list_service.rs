//! List registry use-case service.
//!
//! # Responsibility
//! - Create, rename (with confirm-gated merge), delete and enumerate lists.
//! - Offer plan/apply pairs so confirmation prompts stay outside the core.
//!
//! # Invariants
//! - List names are trimmed, non-empty and at most 50 characters.
//! - Name comparison is exact and case-sensitive.
//! - Rename-merge yields `existing ++ renamed`; the renamed entry is removed.
//! - Delete is destructive; there is no soft-delete.

use crate::model::document::{completed_count, ListSummary, MAX_LIST_NAME_CHARS};
use crate::model::task::Task;
use crate::service::error::{ServiceError, ServiceResult};
use crate::service::load_document;
use crate::store::DocumentStore;
use log::info;

/// Preview of what a rename would do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenamePlan {
    /// Trimmed new name equals the old name.
    Unchanged { name: String },
    /// Pure key rename; tasks move unchanged.
    Move { from: String, to: String },
    /// Target exists; tasks of `from` get appended to `into`.
    Merge {
        from: String,
        into: String,
        existing_count: usize,
        incoming_count: usize,
    },
}

impl RenamePlan {
    pub fn requires_confirmation(&self) -> bool {
        matches!(self, Self::Merge { .. })
    }
}

/// Result of a rename request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenameOutcome {
    Unchanged,
    Renamed,
    Merged { task_count: usize },
    /// Merge was required but not confirmed; nothing changed.
    Declined,
}

/// Preview of a list deletion, used by the confirmation prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeletePlan {
    pub name: String,
    pub task_count: usize,
    pub completed_count: usize,
}

impl DeletePlan {
    pub fn pending_count(&self) -> usize {
        self.task_count - self.completed_count
    }
}

/// Validates a list name and returns its trimmed form.
pub fn validate_list_name(name: &str) -> ServiceResult<&str> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(ServiceError::InvalidName {
            name: name.to_string(),
            reason: "name must not be blank",
        });
    }
    if trimmed.chars().count() > MAX_LIST_NAME_CHARS {
        return Err(ServiceError::InvalidName {
            name: trimmed.to_string(),
            reason: "name must be at most 50 characters",
        });
    }
    Ok(trimmed)
}

/// List registry facade over a document store.
pub struct ListService<S: DocumentStore> {
    store: S,
}

impl<S: DocumentStore> ListService<S> {
    /// Creates a service using the provided store.
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Creates an empty list and returns the stored (trimmed) name.
    pub fn create(&self, name: &str) -> ServiceResult<String> {
        let name = validate_list_name(name)?;
        let mut document = load_document(&self.store)?;
        if document.contains(name) {
            return Err(ServiceError::DuplicateName(name.to_string()));
        }

        document.insert(name, Vec::new());
        self.store.save(&document)?;
        info!(
            "event=list_create module=registry status=ok lists={}",
            document.len()
        );
        Ok(name.to_string())
    }

    /// Returns a copy of one list's tasks.
    pub fn get(&self, name: &str) -> ServiceResult<Vec<Task>> {
        load_document(&self.store)?
            .get(name)
            .cloned()
            .ok_or_else(|| ServiceError::ListNotFound(name.to_string()))
    }

    /// Enumerates lists with progress statistics in document order.
    pub fn list(&self) -> ServiceResult<Vec<ListSummary>> {
        Ok(load_document(&self.store)?.summaries())
    }

    /// Computes what renaming `old` to `new` would do, without writing.
    pub fn plan_rename(&self, old: &str, new: &str) -> ServiceResult<RenamePlan> {
        let document = load_document(&self.store)?;
        let Some(old_tasks) = document.get(old) else {
            return Err(ServiceError::ListNotFound(old.to_string()));
        };
        let new = validate_list_name(new)?;

        if new == old {
            return Ok(RenamePlan::Unchanged {
                name: old.to_string(),
            });
        }

        Ok(match document.get(new) {
            Some(existing) => RenamePlan::Merge {
                from: old.to_string(),
                into: new.to_string(),
                existing_count: existing.len(),
                incoming_count: old_tasks.len(),
            },
            None => RenamePlan::Move {
                from: old.to_string(),
                to: new.to_string(),
            },
        })
    }

    /// Executes a rename plan against the current document.
    ///
    /// A `Move` plan whose target appeared in the meantime fails with
    /// `DuplicateName` rather than silently merging.
    pub fn apply_rename(&self, plan: &RenamePlan) -> ServiceResult<RenameOutcome> {
        let mut document = load_document(&self.store)?;
        match plan {
            RenamePlan::Unchanged { name } => {
                if !document.contains(name) {
                    return Err(ServiceError::ListNotFound(name.clone()));
                }
                Ok(RenameOutcome::Unchanged)
            }
            RenamePlan::Move { from, to } => {
                if document.contains(to) {
                    return Err(ServiceError::DuplicateName(to.clone()));
                }
                let tasks = document
                    .remove(from)
                    .ok_or_else(|| ServiceError::ListNotFound(from.clone()))?;
                document.insert(to.clone(), tasks);
                self.store.save(&document)?;
                info!("event=list_rename module=registry status=ok mode=move");
                Ok(RenameOutcome::Renamed)
            }
            RenamePlan::Merge { from, into, .. } => {
                let incoming = document
                    .remove(from)
                    .ok_or_else(|| ServiceError::ListNotFound(from.clone()))?;
                let incoming_count = incoming.len();
                let task_count = match document.get_mut(into) {
                    Some(existing) => {
                        existing.extend(incoming);
                        existing.len()
                    }
                    None => {
                        document.insert(into.clone(), incoming);
                        incoming_count
                    }
                };
                self.store.save(&document)?;
                info!(
                    "event=list_rename module=registry status=ok mode=merge incoming={} total={}",
                    incoming_count, task_count
                );
                Ok(RenameOutcome::Merged { task_count })
            }
        }
    }

    /// Renames a list; merging into an existing list only when confirmed.
    pub fn rename(&self, old: &str, new: &str, confirm_merge: bool) -> ServiceResult<RenameOutcome> {
        let plan = self.plan_rename(old, new)?;
        if plan.requires_confirmation() && !confirm_merge {
            info!("event=list_rename module=registry status=declined mode=merge");
            return Ok(RenameOutcome::Declined);
        }
        self.apply_rename(&plan)
    }

    /// Summarizes what deleting `name` would discard.
    pub fn plan_delete(&self, name: &str) -> ServiceResult<DeletePlan> {
        let document = load_document(&self.store)?;
        let tasks = document
            .get(name)
            .ok_or_else(|| ServiceError::ListNotFound(name.to_string()))?;
        Ok(DeletePlan {
            name: name.to_string(),
            task_count: tasks.len(),
            completed_count: completed_count(tasks),
        })
    }

    /// Deletes the planned list.
    pub fn apply_delete(&self, plan: &DeletePlan) -> ServiceResult<()> {
        self.delete(&plan.name)
    }

    /// Deletes a list irreversibly.
    pub fn delete(&self, name: &str) -> ServiceResult<()> {
        let mut document = load_document(&self.store)?;
        let removed = document
            .remove(name)
            .ok_or_else(|| ServiceError::ListNotFound(name.to_string()))?;
        self.store.save(&document)?;
        info!(
            "event=list_delete module=registry status=ok removed_tasks={} lists={}",
            removed.len(),
            document.len()
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::validate_list_name;
    use crate::service::error::ServiceErrorKind;

    #[test]
    fn validate_trims_and_enforces_length() {
        assert_eq!(validate_list_name("  Groceries ").unwrap(), "Groceries");
        assert_eq!(
            validate_list_name("   ").unwrap_err().kind(),
            ServiceErrorKind::InvalidName
        );
        let fifty = "x".repeat(50);
        assert!(validate_list_name(&fifty).is_ok());
        let fifty_one = "x".repeat(51);
        assert_eq!(
            validate_list_name(&fifty_one).unwrap_err().kind(),
            ServiceErrorKind::InvalidName
        );
    }

    #[test]
    fn validate_counts_characters_not_bytes() {
        let name = "é".repeat(50);
        assert!(validate_list_name(&name).is_ok());
    }
}
