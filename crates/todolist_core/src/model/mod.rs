//! Domain model for lists and tasks.
//!
//! # Responsibility
//! - Define the persisted `Document` shape and its `Task` records.
//! - Provide read-only statistics projections used by registry and transfer.
//!
//! # Invariants
//! - Every task carries a stable `TaskId`.
//! - `completed_at` is set iff `completed` after any ledger mutation.
//! - Document key order is insertion order and survives save/load.

pub mod document;
pub mod envelope;
pub(crate) mod normalize;
pub mod task;
pub mod time;
