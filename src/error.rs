//! Error types for store mutations.

use thiserror::Error;

/// Failure modes of task store mutations.
///
/// Nothing here is fatal: callers decide whether a variant is surfaced to
/// the user (empty text on edit) or ignored (stale ids).
#[derive(Debug, Error, PartialEq, Eq)]
pub enum StoreError {
    #[error("task text cannot be empty")]
    EmptyText,
    #[error("no task with id {0}")]
    NotFound(u64),
}
