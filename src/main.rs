//! # todo - To-Do List CLI
//!
//! A small file-backed to-do list manager with two faces: a scripting-friendly
//! CLI and an interactive terminal UI.
//!
//! ## Quick Start
//!
//! ```bash
//! # Add a task
//! todo add "Buy milk"
//!
//! # List pending tasks
//! todo list --filter pending
//!
//! # Mark it done, fix a typo, drop it
//! todo toggle 1
//! todo edit 1 "Buy oat milk"
//! todo delete 1
//!
//! # Or do all of the above interactively
//! todo ui
//! ```
//!
//! Tasks live in a single JSON file (`~/.todo/tasks.json` by default,
//! overridable with `--db`). The in-memory collection is the source of
//! truth; the file is rewritten after every successful mutation, so the
//! list survives restarts and nothing is lost between commands.

use std::path::PathBuf;

use clap::Parser;

pub mod cli;
pub mod cmd;
pub mod error;
pub mod filter;
pub mod store;
pub mod task;
pub mod tui {
    pub mod app;
    pub mod colors;
    pub mod enums;
    pub mod input;
    pub mod run;
}

use cli::Cli;
use cmd::*;
use store::TaskStore;

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    // Completions never touch the task file.
    if let Commands::Completions { shell } = &cli.command {
        cmd_completions(*shell);
        return;
    }

    let db_path = cli.db.unwrap_or_else(|| {
        let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
        let todo_dir = PathBuf::from(home).join(".todo");
        if let Err(e) = std::fs::create_dir_all(&todo_dir) {
            eprintln!("Failed to create todo directory {}: {}", todo_dir.display(), e);
            std::process::exit(1);
        }
        todo_dir.join("tasks.json")
    });

    // The TUI owns its own store for the whole session.
    if let Commands::Ui = cli.command {
        cmd_ui(&db_path);
        return;
    }

    let mut store = TaskStore::load(&db_path);

    match cli.command {
        Commands::Ui => unreachable!("UI command handled above"),
        Commands::Completions { .. } => unreachable!("completions handled above"),
        Commands::Add { text } => cmd_add(&mut store, &db_path, text),
        Commands::List { filter } => cmd_list(&store, filter),
        Commands::Toggle { id } => cmd_toggle(&mut store, &db_path, id),
        Commands::Edit { id, text } => cmd_edit(&mut store, &db_path, id, text),
        Commands::Delete { id } => cmd_delete(&mut store, &db_path, id),
        Commands::Clear => cmd_clear(&mut store, &db_path),
    }
}
