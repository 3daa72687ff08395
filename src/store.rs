//! Task storage and persistence.
//!
//! This module provides the `TaskStore` struct, the single authoritative
//! owner of the ordered task collection. Every view is a disposable
//! projection over it; the JSON file on disk is a mirror rewritten after
//! each successful mutation and read once at startup.

use std::fs::{self, File};
use std::io::{Read, Write};
use std::path::Path;

use chrono::Utc;
use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::error::StoreError;
use crate::filter::Filter;
use crate::task::Task;

/// In-memory store for the task collection.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct TaskStore {
    pub tasks: Vec<Task>,
}

impl TaskStore {
    /// Load the store from a JSON file, starting empty if the file doesn't
    /// exist or its contents fail to parse.
    pub fn load(path: &Path) -> Self {
        if !path.exists() {
            return TaskStore::default();
        }
        let mut buf = String::new();
        match File::open(path).and_then(|mut f| f.read_to_string(&mut buf)) {
            Ok(_) => match serde_json::from_str(&buf) {
                Ok(store) => store,
                Err(e) => {
                    warn!("could not parse {}, starting empty: {e}", path.display());
                    TaskStore::default()
                }
            },
            Err(e) => {
                warn!("could not read {}, starting empty: {e}", path.display());
                TaskStore::default()
            }
        }
    }

    /// Save the store to a JSON file using atomic write (temp file + rename).
    pub fn save(&self, path: &Path) -> std::io::Result<()> {
        // Atomic-ish write via temp + rename.
        let tmp = path.with_extension("json.tmp");
        let mut f = File::create(&tmp)?;
        let data = serde_json::to_string_pretty(self).unwrap();
        f.write_all(data.as_bytes())?;
        f.flush()?;
        fs::rename(tmp, path)?;
        debug!("saved {} tasks to {}", self.tasks.len(), path.display());
        Ok(())
    }

    /// Generate the next available task ID.
    pub fn next_id(&self) -> u64 {
        self.tasks.iter().map(|t| t.id).max().unwrap_or(0) + 1
    }

    /// Get a task by ID.
    pub fn get(&self, id: u64) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    /// Get a mutable reference to a task by ID.
    pub fn get_mut(&mut self, id: u64) -> Option<&mut Task> {
        self.tasks.iter_mut().find(|t| t.id == id)
    }

    /// Append a new pending task and return its id.
    ///
    /// Whitespace-only text is rejected without creating anything.
    pub fn add(&mut self, text: &str) -> Option<u64> {
        let text = text.trim();
        if text.is_empty() {
            return None;
        }
        let id = self.next_id();
        self.tasks.push(Task {
            id,
            text: text.to_string(),
            done: false,
            created_at_utc: Utc::now().timestamp(),
        });
        Some(id)
    }

    /// Flip a task's completion flag. Returns false when the id is unknown.
    pub fn toggle_done(&mut self, id: u64) -> bool {
        match self.get_mut(id) {
            Some(task) => {
                task.done = !task.done;
                true
            }
            None => false,
        }
    }

    /// Replace a task's text in place, leaving its completion flag and
    /// position untouched. An empty replacement leaves the task unchanged.
    pub fn edit(&mut self, id: u64, new_text: &str) -> Result<(), StoreError> {
        let new_text = new_text.trim();
        if new_text.is_empty() {
            return Err(StoreError::EmptyText);
        }
        let task = self.get_mut(id).ok_or(StoreError::NotFound(id))?;
        task.text = new_text.to_string();
        Ok(())
    }

    /// Delete a task by id. Returns false when the id is unknown.
    pub fn remove(&mut self, id: u64) -> bool {
        let before = self.tasks.len();
        self.tasks.retain(|t| t.id != id);
        self.tasks.len() != before
    }

    /// Remove every completed task, returning how many were dropped.
    pub fn clear_done(&mut self) -> usize {
        let before = self.tasks.len();
        self.tasks.retain(|t| !t.done);
        before - self.tasks.len()
    }

    /// Ids of tasks visible under the filter, in insertion order.
    pub fn filtered(&self, filter: Filter) -> Vec<u64> {
        self.tasks
            .iter()
            .filter(|t| filter.matches(t))
            .map(|t| t.id)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_add_trims_and_appends_last() {
        let mut store = TaskStore::default();
        store.add("first");
        let id = store.add("  Buy milk  ").unwrap();
        assert_eq!(store.tasks.len(), 2);
        let last = store.tasks.last().unwrap();
        assert_eq!(last.id, id);
        assert_eq!(last.text, "Buy milk");
        assert!(!last.done);
    }

    #[test]
    fn test_add_rejects_whitespace_only() {
        let mut store = TaskStore::default();
        assert_eq!(store.add("   "), None);
        assert_eq!(store.add(""), None);
        assert!(store.tasks.is_empty());
    }

    #[test]
    fn test_ids_are_unique_after_removal() {
        let mut store = TaskStore::default();
        let a = store.add("a").unwrap();
        let b = store.add("b").unwrap();
        assert_ne!(a, b);
        store.remove(b);
        let c = store.add("c").unwrap();
        assert_ne!(a, c);
    }

    #[test]
    fn test_toggle_twice_round_trips() {
        let mut store = TaskStore::default();
        let id = store.add("task").unwrap();
        assert!(store.toggle_done(id));
        assert!(store.get(id).unwrap().done);
        assert!(store.toggle_done(id));
        assert!(!store.get(id).unwrap().done);
    }

    #[test]
    fn test_toggle_missing_id_is_noop() {
        let mut store = TaskStore::default();
        store.add("task");
        assert!(!store.toggle_done(99));
        assert!(!store.tasks[0].done);
    }

    #[test]
    fn test_edit_preserves_done_and_position() {
        let mut store = TaskStore::default();
        let first = store.add("first").unwrap();
        let second = store.add("second").unwrap();
        store.toggle_done(first);

        store.edit(first, " renamed ").unwrap();
        assert_eq!(store.tasks[0].id, first);
        assert_eq!(store.tasks[0].text, "renamed");
        assert!(store.tasks[0].done);
        assert_eq!(store.tasks[1].id, second);
    }

    #[test]
    fn test_edit_rejects_empty_text() {
        let mut store = TaskStore::default();
        let id = store.add("original").unwrap();
        assert_eq!(store.edit(id, "   "), Err(StoreError::EmptyText));
        assert_eq!(store.get(id).unwrap().text, "original");
    }

    #[test]
    fn test_edit_missing_id() {
        let mut store = TaskStore::default();
        assert_eq!(store.edit(7, "text"), Err(StoreError::NotFound(7)));
    }

    #[test]
    fn test_remove_targets_by_id_not_position() {
        let mut store = TaskStore::default();
        let a = store.add("a").unwrap();
        let b = store.add("b").unwrap();
        let c = store.add("c").unwrap();
        assert!(store.remove(b));
        let remaining: Vec<u64> = store.tasks.iter().map(|t| t.id).collect();
        assert_eq!(remaining, vec![a, c]);
        assert!(!store.remove(b));
    }

    #[test]
    fn test_clear_done_keeps_pending() {
        let mut store = TaskStore::default();
        let a = store.add("a").unwrap();
        let b = store.add("b").unwrap();
        store.add("c");
        store.toggle_done(a);
        store.toggle_done(b);
        assert_eq!(store.clear_done(), 2);
        assert_eq!(store.tasks.len(), 1);
        assert_eq!(store.tasks[0].text, "c");
    }

    #[test]
    fn test_filtered_respects_insertion_order() {
        let mut store = TaskStore::default();
        let a = store.add("a").unwrap();
        let b = store.add("b").unwrap();
        let c = store.add("c").unwrap();
        store.toggle_done(b);
        assert_eq!(store.filtered(Filter::All), vec![a, b, c]);
        assert_eq!(store.filtered(Filter::Pending), vec![a, c]);
        assert_eq!(store.filtered(Filter::Completed), vec![b]);
    }

    #[test]
    fn test_save_load_round_trip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("tasks.json");

        let mut store = TaskStore::default();
        store.add("first");
        let second = store.add("second").unwrap();
        store.toggle_done(second);
        store.save(&path).unwrap();

        let reloaded = TaskStore::load(&path);
        assert_eq!(reloaded.tasks, store.tasks);
    }

    #[test]
    fn test_load_missing_file_is_empty() {
        let dir = TempDir::new().unwrap();
        let store = TaskStore::load(&dir.path().join("absent.json"));
        assert!(store.tasks.is_empty());
    }

    #[test]
    fn test_load_corrupt_file_is_empty() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("tasks.json");
        std::fs::write(&path, "{not json").unwrap();
        let store = TaskStore::load(&path);
        assert!(store.tasks.is_empty());
    }
}
