//! `DocumentStore` backed by a `KvRepository`.

use super::{DocumentStore, LoadOutcome, StoreError, StoreResult};
use crate::model::document::Document;
use crate::model::normalize::decode_tasks;
use crate::repo::kv_repo::KvRepository;
use indexmap::IndexMap;
use log::{debug, error, info, warn};
use serde_json::Value;

/// Fixed storage key of the document.
pub const DOCUMENT_KEY: &str = "lists";

/// Document store writing JSON text under [`DOCUMENT_KEY`].
pub struct KvDocumentStore<R: KvRepository> {
    repo: R,
    key: String,
}

impl<R: KvRepository> KvDocumentStore<R> {
    pub fn new(repo: R) -> Self {
        Self::with_key(repo, DOCUMENT_KEY)
    }

    /// Uses a custom key, e.g. to keep several documents in one database.
    pub fn with_key(repo: R, key: impl Into<String>) -> Self {
        Self {
            repo,
            key: key.into(),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }
}

impl<R: KvRepository> DocumentStore for KvDocumentStore<R> {
    fn load(&self) -> StoreResult<LoadOutcome> {
        let Some(entry) = self.repo.get(&self.key)? else {
            debug!("event=document_load module=store status=empty");
            return Ok(LoadOutcome::Empty);
        };

        let (document, repair) = match decode_document(&entry.value) {
            Ok(decoded) => decoded,
            Err(err) => {
                warn!(
                    "event=document_load module=store status=corrupt revision={} raw_bytes={}",
                    entry.revision,
                    entry.value.len()
                );
                return Ok(LoadOutcome::Corrupt {
                    raw: entry.value,
                    reason: err.to_string(),
                });
            }
        };

        if repair.needed() {
            info!(
                "event=document_repair module=store status=start repaired_tasks={} dropped_entries={}",
                repair.repaired, repair.dropped
            );
            self.save(&document)?;
        }

        debug!(
            "event=document_load module=store status=ok revision={} lists={}",
            entry.revision,
            document.len()
        );
        Ok(LoadOutcome::Loaded(document))
    }

    fn save(&self, document: &Document) -> StoreResult<()> {
        let encoded = serde_json::to_string(document).map_err(StoreError::Encode)?;
        match self.repo.put(&self.key, &encoded) {
            Ok(revision) => {
                debug!(
                    "event=document_save module=store status=ok revision={} lists={} bytes={}",
                    revision,
                    document.len(),
                    encoded.len()
                );
                Ok(())
            }
            Err(err) => {
                error!(
                    "event=document_save module=store status=error error={}",
                    err
                );
                Err(err.into())
            }
        }
    }

    fn revision(&self) -> StoreResult<u64> {
        Ok(self
            .repo
            .get(&self.key)?
            .map_or(0, |entry| entry.revision))
    }
}

/// Tasks that were filled in or dropped while decoding a stored document.
#[derive(Debug, Default, PartialEq, Eq)]
struct Repair {
    repaired: usize,
    dropped: usize,
}

impl Repair {
    fn needed(&self) -> bool {
        self.repaired > 0 || self.dropped > 0
    }
}

/// Parses stored JSON into a document.
///
/// Only text that is not JSON, or JSON that is not an object of arrays,
/// fails. Individual tasks are decoded leniently so one damaged task
/// never costs the other lists.
fn decode_document(raw: &str) -> Result<(Document, Repair), serde_json::Error> {
    let stored: IndexMap<String, Vec<Value>> = serde_json::from_str(raw)?;
    let mut repair = Repair::default();
    let document: Document = stored
        .into_iter()
        .map(|(name, values)| {
            let decoded = decode_tasks(&values);
            repair.repaired += decoded.repaired;
            repair.dropped += decoded.rejected;
            (name, decoded.tasks)
        })
        .collect();
    if repair.dropped > 0 {
        warn!(
            "event=document_load module=store status=degraded dropped_entries={}",
            repair.dropped
        );
    }
    Ok((document, repair))
}
