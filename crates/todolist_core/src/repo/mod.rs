//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define the key-value storage contract the document store is built on.
//! - Isolate SQLite query details from store/service orchestration.
//!
//! # Invariants
//! - One key maps to at most one opaque string value.
//! - Every write bumps the per-key revision by exactly one.

pub mod kv_repo;
