//! Key-value repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Provide get/put/remove over opaque string values keyed by name.
//! - Maintain a per-key revision counter so callers can detect foreign writes.
//!
//! # Invariants
//! - `put` replaces the whole value; there are no partial updates.
//! - Revisions start at 1 for a fresh key and grow monotonically.
//! - Repositories only accept connections with migrations fully applied.

use crate::db::migrations::{latest_version, schema_version};
use crate::db::DbError;
use rusqlite::{params, Connection, OptionalExtension};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type RepoResult<T> = Result<T, RepoError>;

/// Error for key-value persistence operations.
#[derive(Debug)]
pub enum RepoError {
    Db(DbError),
    /// Connection schema version does not match this binary.
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "connection not migrated: expected schema {expected_version}, found {actual_version}"
            ),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::UninitializedConnection { .. } => None,
        }
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// One stored value with its write counter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KvEntry {
    pub value: String,
    pub revision: u64,
}

/// Repository interface for durable key-value entries.
pub trait KvRepository {
    /// Returns the entry stored under `key`, if any.
    fn get(&self, key: &str) -> RepoResult<Option<KvEntry>>;
    /// Writes `value` under `key` and returns the new revision.
    fn put(&self, key: &str, value: &str) -> RepoResult<u64>;
    /// Removes `key`. Returns whether an entry existed.
    fn remove(&self, key: &str) -> RepoResult<bool>;
}

impl<T: KvRepository + ?Sized> KvRepository for &T {
    fn get(&self, key: &str) -> RepoResult<Option<KvEntry>> {
        (**self).get(key)
    }

    fn put(&self, key: &str, value: &str) -> RepoResult<u64> {
        (**self).put(key, value)
    }

    fn remove(&self, key: &str) -> RepoResult<bool> {
        (**self).remove(key)
    }
}

/// SQLite-backed key-value repository over the `kv_entries` table.
pub struct SqliteKvRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteKvRepository<'conn> {
    /// Constructs a repository from a migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_kv_connection_ready(conn)?;
        Ok(Self { conn })
    }
}

impl KvRepository for SqliteKvRepository<'_> {
    fn get(&self, key: &str) -> RepoResult<Option<KvEntry>> {
        let entry = self
            .conn
            .query_row(
                "SELECT value, revision FROM kv_entries WHERE key = ?1;",
                [key],
                |row| {
                    Ok(KvEntry {
                        value: row.get(0)?,
                        revision: row.get::<_, i64>(1)?.max(0) as u64,
                    })
                },
            )
            .optional()?;
        Ok(entry)
    }

    fn put(&self, key: &str, value: &str) -> RepoResult<u64> {
        let revision: i64 = self.conn.query_row(
            "INSERT INTO kv_entries (key, value, revision, updated_at)
             VALUES (?1, ?2, 1, (strftime('%s', 'now') * 1000))
             ON CONFLICT(key) DO UPDATE SET
                value = excluded.value,
                revision = kv_entries.revision + 1,
                updated_at = excluded.updated_at
             RETURNING revision;",
            params![key, value],
            |row| row.get(0),
        )?;
        Ok(revision.max(0) as u64)
    }

    fn remove(&self, key: &str) -> RepoResult<bool> {
        let changed = self
            .conn
            .execute("DELETE FROM kv_entries WHERE key = ?1;", [key])?;
        Ok(changed > 0)
    }
}

fn ensure_kv_connection_ready(conn: &Connection) -> RepoResult<()> {
    let expected_version = latest_version();
    let actual_version = schema_version(conn)?;
    if actual_version != expected_version {
        return Err(RepoError::UninitializedConnection {
            expected_version,
            actual_version,
        });
    }
    Ok(())
}
