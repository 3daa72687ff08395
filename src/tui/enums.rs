//! Enumerations for TUI state management.

/// Application state for the terminal user interface.
///
/// `AddTask` and `EditTask` are the two input states; everything else
/// reads the list without mutating it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AppState {
    TaskList,
    AddTask,
    EditTask,
    Confirm,
    Help,
}
