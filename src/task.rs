//! Task data structure.
//!
//! This module defines the `Task` struct, the only domain entity: a short
//! piece of user-supplied text with a completion flag.

use serde::{Deserialize, Serialize};

/// A single to-do item.
///
/// `text` is trimmed and non-empty from the moment of creation; `id` is
/// unique for the lifetime of the collection. Ordering is carried by the
/// task's position in the collection, not by any field here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: u64,
    pub text: String,
    #[serde(default)]
    pub done: bool,
    pub created_at_utc: i64,
}
