//! Command implementations for the CLI interface.
//!
//! This module contains the command handlers for the one-shot subcommands,
//! from basic CRUD operations to the interactive TUI. Every mutation is
//! written back to the task file before the handler returns.

use clap::Subcommand;
use clap_complete::{generate, Shell};

use std::path::Path;

use chrono::{Local, TimeZone};
use log::debug;

use crate::error::StoreError;
use crate::filter::Filter;
use crate::store::TaskStore;
use crate::task::Task;
use crate::tui::run::run_tui;

#[derive(Subcommand)]
pub enum Commands {
    /// Launch the interactive UI interface.
    Ui,

    /// Add a new task.
    Add {
        /// Task text.
        text: String,
    },

    /// List tasks.
    List {
        /// Show only tasks in this completion state.
        #[arg(long, value_enum, default_value_t = Filter::All)]
        filter: Filter,
    },

    /// Toggle a task between pending and completed.
    Toggle {
        /// Task ID.
        id: u64,
    },

    /// Replace a task's text.
    Edit {
        /// Task ID.
        id: u64,
        /// Replacement text.
        text: String,
    },

    /// Delete a task by ID.
    Delete {
        /// Task ID.
        id: u64,
    },

    /// Remove all completed tasks.
    Clear,

    /// Generate shell completion scripts.
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

fn save_or_exit(store: &TaskStore, db_path: &Path) {
    if let Err(e) = store.save(db_path) {
        eprintln!("Failed to save tasks: {e}");
        std::process::exit(1);
    }
}

/// Add a new task. Whitespace-only text creates nothing.
pub fn cmd_add(store: &mut TaskStore, db_path: &Path, text: String) {
    match store.add(&text) {
        Some(id) => {
            save_or_exit(store, db_path);
            println!("Added task {}", id);
        }
        None => debug!("ignoring empty task text"),
    }
}

/// Print tasks visible under the filter as a formatted table.
pub fn cmd_list(store: &TaskStore, filter: Filter) {
    let visible: Vec<&Task> = store.tasks.iter().filter(|t| filter.matches(t)).collect();
    println!("{:<5} {:<5} {:<16} {}", "ID", "Done", "Created", "Text");
    for t in visible {
        let created = Local
            .timestamp_opt(t.created_at_utc, 0)
            .single()
            .map(|dt| dt.format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_else(|| "-".into());
        println!(
            "{:<5} {:<5} {:<16} {}",
            t.id,
            if t.done { "[x]" } else { "[ ]" },
            created,
            t.text
        );
    }
}

/// Flip a task's completion flag. Unknown IDs are ignored.
pub fn cmd_toggle(store: &mut TaskStore, db_path: &Path, id: u64) {
    if !store.toggle_done(id) {
        debug!("toggle: no task with id {id}");
        return;
    }
    save_or_exit(store, db_path);
    if let Some(t) = store.get(id) {
        println!(
            "Task {} marked {}",
            id,
            if t.done { "completed" } else { "pending" }
        );
    }
}

/// Replace a task's text. Empty replacement text is an error; unknown IDs
/// are ignored.
pub fn cmd_edit(store: &mut TaskStore, db_path: &Path, id: u64, text: String) {
    match store.edit(id, &text) {
        Ok(()) => {
            save_or_exit(store, db_path);
            println!("Updated task {}", id);
        }
        Err(StoreError::EmptyText) => {
            eprintln!("Task text cannot be empty.");
            std::process::exit(1);
        }
        Err(StoreError::NotFound(_)) => debug!("edit: no task with id {id}"),
    }
}

/// Delete a task. Unknown IDs are ignored.
pub fn cmd_delete(store: &mut TaskStore, db_path: &Path, id: u64) {
    if !store.remove(id) {
        debug!("delete: no task with id {id}");
        return;
    }
    save_or_exit(store, db_path);
    println!("Deleted task {}", id);
}

/// Remove every completed task.
pub fn cmd_clear(store: &mut TaskStore, db_path: &Path) {
    let dropped = store.clear_done();
    if dropped > 0 {
        save_or_exit(store, db_path);
    }
    println!("Cleared {} completed task(s)", dropped);
}

/// Launch the interactive task list.
pub fn cmd_ui(db_path: &Path) {
    if let Err(err) = run_tui(db_path) {
        eprintln!("Error running TUI: {}", err);
        std::process::exit(1);
    }
}

/// Generate shell completions for the CLI.
pub fn cmd_completions(shell: Shell) {
    use crate::cli::Cli;
    use clap::CommandFactory;

    let mut app = Cli::command();
    let app_name = app.get_name().to_string();
    generate(shell, &mut app, app_name, &mut std::io::stdout());
}
