//! Persistence core for a named-list to-do manager.
//! This crate is the single source of truth for list and task invariants.

pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;
pub mod store;

pub use logging::{init_logging, logging_status, LogLevel, LogSettings, LoggingError};
pub use model::document::{Document, ListStatistics, ListSummary, MAX_LIST_NAME_CHARS};
pub use model::envelope::{CompleteListsExport, ExportType, SingleListExport};
pub use model::task::{Task, TaskId};
pub use model::time::format_relative;
pub use repo::kv_repo::{KvEntry, KvRepository, RepoError, RepoResult, SqliteKvRepository};
pub use service::error::{ServiceError, ServiceErrorKind, ServiceResult};
pub use service::list_service::{
    validate_list_name, DeletePlan, ListService, RenameOutcome, RenamePlan,
};
pub use service::task_service::{TaskService, ToggleOutcome};
pub use service::transfer_service::{
    all_lists_export_file_name, list_export_file_name, ImportPlan, ImportSource, ImportSummary,
    ImportedList, TransferService, FALLBACK_LIST_NAME, PLACEHOLDER_TASK_TEXT,
};
pub use store::{DocumentStore, KvDocumentStore, LoadOutcome, StoreError, StoreResult, DOCUMENT_KEY};

/// Document store over a migrated SQLite connection, keyed at [`DOCUMENT_KEY`].
pub fn sqlite_document_store(
    conn: &rusqlite::Connection,
) -> RepoResult<KvDocumentStore<SqliteKvRepository<'_>>> {
    Ok(KvDocumentStore::new(SqliteKvRepository::try_new(conn)?))
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
