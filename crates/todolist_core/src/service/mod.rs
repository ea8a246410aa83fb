//! Core use-case services.
//!
//! # Responsibility
//! - `ListService`: create/rename/delete/enumerate lists.
//! - `TaskService`: append/toggle/edit/remove tasks within one list.
//! - `TransferService`: export envelopes and validated import.
//!
//! # Invariants
//! - Every operation is load → mutate working copy → one save.
//! - Validation failures return before the save, so the stored document is
//!   never partially updated.
//! - Services never bypass the `DocumentStore` contract.

pub mod error;
pub mod list_service;
pub mod task_service;
pub mod transfer_service;

use crate::model::document::Document;
use crate::store::DocumentStore;
use error::ServiceResult;

/// Loads the working copy, degrading corrupt or absent state to empty.
pub(crate) fn load_document<S: DocumentStore>(store: &S) -> ServiceResult<Document> {
    Ok(store.load()?.into_document())
}
