//! Document store over key-value storage.
//!
//! # Responsibility
//! - Load and save the whole `Document` as one JSON value under a fixed key.
//! - Distinguish empty-by-absence from empty-by-corruption on load.
//! - Repair stored tasks that predate task ids or carry unusable fields,
//!   without giving up the rest of the document.
//!
//! # Invariants
//! - `load` never fails because of unparseable stored data; it reports
//!   `LoadOutcome::Corrupt` instead.
//! - Only a value that is not JSON, or not an object of task arrays, is
//!   `Corrupt`; a damaged task is repaired in place.
//! - `save` overwrites the previous value wholesale.
//! - There is no change notification; other holders of a loaded document
//!   stay stale until they load again (last write wins).

mod kv_document_store;

pub use kv_document_store::{KvDocumentStore, DOCUMENT_KEY};

use crate::model::document::Document;
use crate::repo::kv_repo::RepoError;
use log::warn;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type StoreResult<T> = Result<T, StoreError>;

/// Backend failure while reading or writing the document.
#[derive(Debug)]
pub enum StoreError {
    Repo(RepoError),
    /// Document could not be serialized for saving.
    Encode(serde_json::Error),
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Repo(err) => write!(f, "{err}"),
            Self::Encode(err) => write!(f, "failed to encode document: {err}"),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Repo(err) => Some(err),
            Self::Encode(err) => Some(err),
        }
    }
}

impl From<RepoError> for StoreError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

/// Tagged result of reading the stored document.
#[derive(Debug, Clone, PartialEq)]
pub enum LoadOutcome {
    /// Nothing stored yet.
    Empty,
    /// Stored value parsed successfully.
    Loaded(Document),
    /// Stored value exists but is not a valid document.
    Corrupt { raw: String, reason: String },
}

impl LoadOutcome {
    pub fn is_corrupt(&self) -> bool {
        matches!(self, Self::Corrupt { .. })
    }

    /// Degrades absence and corruption to an empty document.
    pub fn into_document(self) -> Document {
        match self {
            Self::Empty => Document::new(),
            Self::Loaded(document) => document,
            Self::Corrupt { raw, reason } => {
                warn!(
                    "event=document_load module=store status=degraded raw_bytes={} reason={}",
                    raw.len(),
                    reason
                );
                Document::new()
            }
        }
    }
}

/// Durable load/save of the single persisted document.
pub trait DocumentStore {
    fn load(&self) -> StoreResult<LoadOutcome>;
    fn save(&self, document: &Document) -> StoreResult<()>;
    /// Write counter of the stored document, 0 when never written.
    fn revision(&self) -> StoreResult<u64>;
}

impl<T: DocumentStore + ?Sized> DocumentStore for &T {
    fn load(&self) -> StoreResult<LoadOutcome> {
        (**self).load()
    }

    fn save(&self, document: &Document) -> StoreResult<()> {
        (**self).save(document)
    }

    fn revision(&self) -> StoreResult<u64> {
        (**self).revision()
    }
}
