//! Main application logic for the terminal user interface.
//!
//! This module contains the `App` struct which owns the task store for the
//! session, handles user input, and renders the visible list. The store is
//! the single source of truth: every frame re-derives the visible rows from
//! the collection and the active filter, and every mutation is written back
//! to the task file before the next frame.

use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crossterm::event::{self, Event, KeyCode, KeyModifiers};
use ratatui::{
    backend::Backend,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Clear, Paragraph, Row, Table, TableState, Tabs, Wrap},
    Frame, Terminal,
};

use crate::error::StoreError;
use crate::filter::Filter;
use crate::store::TaskStore;
use crate::tui::colors::{DARK_RED, GOLD};
use crate::tui::enums::AppState;
use crate::tui::input::InputField;

/// Main application state for the terminal user interface.
///
/// Owns the store, the active filter, the row selection, and the input
/// field shared by the add and edit states.
pub struct App {
    state: AppState,
    store: TaskStore,
    db_path: PathBuf,
    task_list_state: TableState,
    visible_tasks: Vec<u64>,
    filter: Filter,
    input: InputField,
    editing_task: Option<u64>,
    pending_delete: Option<u64>,
    status_message: String,
}

impl App {
    /// Create a new App instance, loading the store from the specified path.
    pub fn new(db_path: &Path) -> Self {
        let store = TaskStore::load(db_path);
        let mut app = App {
            state: AppState::TaskList,
            store,
            db_path: db_path.to_path_buf(),
            task_list_state: TableState::default(),
            visible_tasks: Vec::new(),
            filter: Filter::All,
            input: InputField::new(),
            editing_task: None,
            pending_delete: None,
            status_message: String::new(),
        };
        app.update_visible_tasks();
        app
    }

    /// Recompute the visible task ids from the store and the active filter.
    /// Attempts to preserve the selection when possible.
    fn update_visible_tasks(&mut self) {
        let old_selected_id = self
            .task_list_state
            .selected()
            .and_then(|idx| self.visible_tasks.get(idx))
            .copied();

        self.visible_tasks = self.store.filtered(self.filter);

        if let Some(old_id) = old_selected_id {
            if let Some(new_idx) = self.visible_tasks.iter().position(|&id| id == old_id) {
                self.task_list_state.select(Some(new_idx));
            } else {
                self.task_list_state
                    .select(if self.visible_tasks.is_empty() {
                        None
                    } else {
                        Some(0)
                    });
            }
        } else if !self.visible_tasks.is_empty() && self.task_list_state.selected().is_none() {
            self.task_list_state.select(Some(0));
        } else if self.visible_tasks.is_empty() {
            self.task_list_state.select(None);
        }
    }

    /// Write the store to disk, reporting failures in the status bar.
    fn save_store(&mut self) {
        if let Err(e) = self.store.save(&self.db_path) {
            self.set_status_message(format!("Error saving: {}", e));
        }
    }

    /// Id of the currently selected task, if any.
    fn selected_id(&self) -> Option<u64> {
        self.task_list_state
            .selected()
            .and_then(|idx| self.visible_tasks.get(idx))
            .copied()
    }

    /// Set a status message to display in the status bar.
    fn set_status_message(&mut self, msg: String) {
        self.status_message = msg;
    }

    /// Clear the current status message.
    fn clear_status_message(&mut self) {
        self.status_message.clear();
    }

    /// Switch to the given filter. Exactly one filter is active at a time.
    fn set_filter(&mut self, filter: Filter) {
        self.filter = filter;
        self.update_visible_tasks();
        self.set_status_message(format!(
            "Filter: {} ({} tasks)",
            filter.label(),
            self.visible_tasks.len()
        ));
    }

    /// Enter edit mode for the selected task with its text pre-filled.
    fn enter_edit_mode(&mut self) {
        if let Some(id) = self.selected_id() {
            if let Some(task) = self.store.get(id) {
                self.input = InputField::with_value(&task.text);
                self.editing_task = Some(id);
                self.state = AppState::EditTask;
            }
        }
    }

    /// Handle keyboard input when in the task list view.
    ///
    /// Returns true if the application should quit.
    fn handle_task_list_input(
        &mut self,
        key: KeyCode,
        modifiers: KeyModifiers,
    ) -> io::Result<bool> {
        match key {
            KeyCode::Char('q') if modifiers.contains(KeyModifiers::CONTROL) => return Ok(true),
            KeyCode::Char('c') if modifiers.contains(KeyModifiers::CONTROL) => return Ok(true),
            KeyCode::Esc | KeyCode::Char('q') => return Ok(true),

            KeyCode::Up => {
                if let Some(selected) = self.task_list_state.selected() {
                    if selected > 0 {
                        self.task_list_state.select(Some(selected - 1));
                    }
                } else if !self.visible_tasks.is_empty() {
                    self.task_list_state.select(Some(0));
                }
            }
            KeyCode::Down => {
                if let Some(selected) = self.task_list_state.selected() {
                    if selected + 1 < self.visible_tasks.len() {
                        self.task_list_state.select(Some(selected + 1));
                    }
                } else if !self.visible_tasks.is_empty() {
                    self.task_list_state.select(Some(0));
                }
            }
            KeyCode::Enter | KeyCode::Char(' ') | KeyCode::Char('c') => {
                if let Some(id) = self.selected_id() {
                    if self.store.toggle_done(id) {
                        self.save_store();
                        self.update_visible_tasks();
                        if let Some(task) = self.store.get(id) {
                            self.set_status_message(format!(
                                "Task {} marked {}",
                                id,
                                if task.done { "completed" } else { "pending" }
                            ));
                        }
                    }
                }
            }
            KeyCode::Char('a') => {
                self.input = InputField::new();
                self.state = AppState::AddTask;
            }
            KeyCode::Char('e') => {
                self.enter_edit_mode();
            }
            KeyCode::Char('d') => {
                if let Some(id) = self.selected_id() {
                    self.pending_delete = Some(id);
                    self.state = AppState::Confirm;
                }
            }
            KeyCode::Char('1') => self.set_filter(Filter::All),
            KeyCode::Char('2') => self.set_filter(Filter::Pending),
            KeyCode::Char('3') => self.set_filter(Filter::Completed),
            KeyCode::Char('f') => self.set_filter(self.filter.cycle()),
            KeyCode::Char('h') => {
                self.state = AppState::Help;
            }
            KeyCode::Char('r') => {
                self.store = TaskStore::load(&self.db_path);
                self.update_visible_tasks();
                self.set_status_message("Tasks reloaded".to_string());
            }
            _ => {}
        }
        Ok(false)
    }

    /// Handle keyboard input when entering a new task.
    ///
    /// Whitespace-only submissions create nothing and the input stays put;
    /// a successful add clears the input so entry can continue.
    fn handle_add_input(&mut self, key: KeyCode, _modifiers: KeyModifiers) -> io::Result<bool> {
        match key {
            KeyCode::Esc => {
                self.state = AppState::TaskList;
            }
            KeyCode::Enter => {
                if let Some(id) = self.store.add(&self.input.value) {
                    self.save_store();
                    self.input.clear();
                    self.update_visible_tasks();
                    self.set_status_message(format!("Added task {}", id));
                }
            }
            KeyCode::Backspace => self.input.handle_backspace(),
            KeyCode::Delete => self.input.handle_delete(),
            KeyCode::Left => self.input.move_cursor_left(),
            KeyCode::Right => self.input.move_cursor_right(),
            KeyCode::Char(c) => self.input.handle_char(c),
            _ => {}
        }
        Ok(false)
    }

    /// Handle keyboard input while editing the selected task in place.
    ///
    /// An empty replacement is rejected with a status message and edit mode
    /// stays active; Esc cancels and leaves the task unchanged.
    fn handle_edit_input(&mut self, key: KeyCode, _modifiers: KeyModifiers) -> io::Result<bool> {
        match key {
            KeyCode::Esc => {
                self.editing_task = None;
                self.state = AppState::TaskList;
            }
            KeyCode::Enter => {
                if let Some(id) = self.editing_task {
                    match self.store.edit(id, &self.input.value) {
                        Ok(()) => {
                            self.save_store();
                            self.editing_task = None;
                            self.state = AppState::TaskList;
                            self.update_visible_tasks();
                            self.set_status_message(format!("Updated task {}", id));
                        }
                        Err(StoreError::EmptyText) => {
                            self.set_status_message("Task text cannot be empty".to_string());
                        }
                        Err(StoreError::NotFound(_)) => {
                            // Task vanished underneath us; drop out of edit mode.
                            self.editing_task = None;
                            self.state = AppState::TaskList;
                            self.update_visible_tasks();
                        }
                    }
                }
            }
            KeyCode::Backspace => self.input.handle_backspace(),
            KeyCode::Delete => self.input.handle_delete(),
            KeyCode::Left => self.input.move_cursor_left(),
            KeyCode::Right => self.input.move_cursor_right(),
            KeyCode::Char(c) => self.input.handle_char(c),
            _ => {}
        }
        Ok(false)
    }

    /// Handle keyboard input in the delete confirmation dialog.
    fn handle_confirm_input(&mut self, key: KeyCode, _modifiers: KeyModifiers) -> io::Result<bool> {
        match key {
            KeyCode::Char('y') | KeyCode::Char('Y') => {
                if let Some(id) = self.pending_delete.take() {
                    if self.store.remove(id) {
                        self.save_store();
                        self.set_status_message(format!("Deleted task {}", id));
                    }
                    self.update_visible_tasks();
                }
                self.state = AppState::TaskList;
            }
            KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
                self.pending_delete = None;
                self.state = AppState::TaskList;
            }
            _ => {}
        }
        Ok(false)
    }

    /// Handle keyboard input in the help view.
    fn handle_help_input(&mut self, key: KeyCode, _modifiers: KeyModifiers) -> io::Result<bool> {
        match key {
            KeyCode::Esc | KeyCode::Char('q') | KeyCode::Char('h') | KeyCode::Enter => {
                self.state = AppState::TaskList;
            }
            _ => {}
        }
        Ok(false)
    }

    /// Poll for the next event and dispatch by application state.
    fn handle_input(&mut self) -> io::Result<bool> {
        if event::poll(Duration::from_millis(50))? {
            if let Event::Key(key) = event::read()? {
                self.clear_status_message();

                let should_quit = match self.state {
                    AppState::TaskList => self.handle_task_list_input(key.code, key.modifiers)?,
                    AppState::AddTask => self.handle_add_input(key.code, key.modifiers)?,
                    AppState::EditTask => self.handle_edit_input(key.code, key.modifiers)?,
                    AppState::Confirm => self.handle_confirm_input(key.code, key.modifiers)?,
                    AppState::Help => self.handle_help_input(key.code, key.modifiers)?,
                };
                if should_quit {
                    return Ok(true);
                }
            }
        }
        Ok(false)
    }

    /// Render the filter bar, the optional new-task input, and the task table.
    fn render_task_list(&mut self, f: &mut Frame, area: Rect) {
        let constraints: Vec<Constraint> = if self.state == AppState::AddTask {
            vec![
                Constraint::Length(3), // filter tabs
                Constraint::Length(3), // new task input
                Constraint::Min(0),    // table
            ]
        } else {
            vec![Constraint::Length(3), Constraint::Min(0)]
        };
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints(constraints)
            .split(area);

        let titles: Vec<Line> = [Filter::All, Filter::Pending, Filter::Completed]
            .iter()
            .map(|filter| Line::from(filter.label()))
            .collect();
        let tabs = Tabs::new(titles)
            .block(Block::default().borders(Borders::ALL).title("TO-DO LIST"))
            .select(self.filter.index())
            .highlight_style(Style::default().fg(GOLD).add_modifier(Modifier::BOLD));
        f.render_widget(tabs, chunks[0]);

        if self.state == AppState::AddTask {
            let input = Paragraph::new(self.input.value.as_str()).block(
                Block::default()
                    .borders(Borders::ALL)
                    .title("New Task")
                    .border_style(Style::default().fg(GOLD)),
            );
            f.render_widget(input, chunks[1]);
        }

        let header_cells = ["ID", "Done", "Text"]
            .iter()
            .map(|h| Cell::from(*h).style(Style::default().add_modifier(Modifier::BOLD)));
        let header = Row::new(header_cells).height(1);

        let rows: Vec<Row> = self
            .visible_tasks
            .iter()
            .filter_map(|&id| self.store.get(id))
            .map(|task| {
                let editing =
                    self.state == AppState::EditTask && self.editing_task == Some(task.id);
                let text_cell = if editing {
                    // The row's static text is replaced by the live edit input.
                    Cell::from(self.input.value.clone()).style(
                        Style::default()
                            .fg(GOLD)
                            .add_modifier(Modifier::UNDERLINED),
                    )
                } else {
                    Cell::from(task.text.clone())
                };
                let style = if task.done {
                    Style::default().fg(Color::DarkGray)
                } else {
                    Style::default().fg(Color::White)
                };
                Row::new(vec![
                    Cell::from(task.id.to_string()),
                    Cell::from(if task.done { "[x]" } else { "[ ]" }),
                    text_cell,
                ])
                .style(style)
            })
            .collect();

        let widths = [
            Constraint::Length(5),  // ID
            Constraint::Length(5),  // Done
            Constraint::Min(25),    // Text
        ];

        let table = Table::new(rows, widths)
            .header(header)
            .block(Block::default().borders(Borders::ALL).title(format!(
                "Tasks ({}/{}) - Press 'h' for help",
                self.visible_tasks.len(),
                self.store.tasks.len()
            )))
            .row_highlight_style(Style::default().bg(Color::Gray).fg(Color::Black))
            .highlight_symbol(">> ");

        let table_area = if self.state == AppState::AddTask {
            chunks[2]
        } else {
            chunks[1]
        };
        f.render_stateful_widget(table, table_area, &mut self.task_list_state);
    }

    /// Render a confirmation dialog for deletion.
    fn render_confirm(&mut self, f: &mut Frame, area: Rect) {
        let block = Block::default()
            .title("Confirm Action")
            .borders(Borders::ALL)
            .style(Style::default().bg(DARK_RED));

        let area = centered_rect(50, 20, area);
        f.render_widget(Clear, area);

        let target = self
            .pending_delete
            .map(|id| format!("Delete task #{}", id))
            .unwrap_or_default();
        let text = vec![
            Line::from(""),
            Line::from(vec![Span::styled(
                "Are you sure you want to:",
                Style::default().add_modifier(Modifier::BOLD),
            )]),
            Line::from(target),
            Line::from(""),
            Line::from("This action cannot be undone."),
            Line::from(""),
            Line::from("Press 'y' to confirm, 'n' to cancel"),
        ];

        let paragraph = Paragraph::new(text)
            .block(block)
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true });

        f.render_widget(paragraph, area);
    }

    /// Render the help view.
    fn render_help(&mut self, f: &mut Frame, area: Rect) {
        let text = vec![
            Line::from(Span::styled(
                "Keys",
                Style::default().add_modifier(Modifier::BOLD),
            )),
            Line::from(""),
            Line::from("  Up/Down        move selection"),
            Line::from("  Enter/Space/c  toggle pending/completed"),
            Line::from("  a              add a new task"),
            Line::from("  e              edit the selected task"),
            Line::from("  d              delete the selected task"),
            Line::from("  1 / 2 / 3      show all / pending / completed"),
            Line::from("  f              cycle through filters"),
            Line::from("  r              reload tasks from disk"),
            Line::from("  h              this help"),
            Line::from("  q / Esc        quit"),
        ];

        let paragraph = Paragraph::new(text)
            .block(Block::default().borders(Borders::ALL).title("Help"))
            .wrap(Wrap { trim: false });

        f.render_widget(paragraph, area);
    }

    /// Render the status bar at the bottom of the screen.
    fn render_status_bar(&mut self, f: &mut Frame, area: Rect) {
        let status_text = if !self.status_message.is_empty() {
            self.status_message.clone()
        } else {
            match self.state {
                AppState::TaskList => format!(
                    "Tasks: {} | Filter: {} | Press 'h' for help",
                    self.visible_tasks.len(),
                    self.filter.label()
                ),
                AppState::AddTask => "New task - Enter to add, Esc to cancel".to_string(),
                AppState::EditTask => "Editing task - Enter to save, Esc to cancel".to_string(),
                AppState::Confirm => "Confirm Action".to_string(),
                AppState::Help => "Help".to_string(),
            }
        };

        let status = Paragraph::new(status_text)
            .style(Style::default().bg(GOLD).fg(Color::Rgb(20, 20, 20)))
            .alignment(Alignment::Left);

        f.render_widget(status, area);
    }

    /// Main render function that dispatches to appropriate view renderers.
    fn render(&mut self, f: &mut Frame) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(0), Constraint::Length(1)].as_ref())
            .split(f.area());

        match self.state {
            AppState::TaskList | AppState::AddTask | AppState::EditTask => {
                self.render_task_list(f, chunks[0])
            }
            AppState::Help => self.render_help(f, chunks[0]),
            AppState::Confirm => {
                self.render_task_list(f, chunks[0]);
                self.render_confirm(f, chunks[0]);
            }
        }

        self.render_status_bar(f, chunks[1]);
    }

    /// Main event loop for the TUI application.
    ///
    /// Handles rendering and input processing until the user exits.
    pub fn run<B: Backend>(&mut self, terminal: &mut Terminal<B>) -> io::Result<()> {
        loop {
            terminal.draw(|f| self.render(f))?;

            if self.handle_input()? {
                break;
            }
        }
        Ok(())
    }
}

/// Centered sub-rectangle taking the given percentages of the area.
fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn app_with_tasks(dir: &TempDir, texts: &[&str]) -> App {
        let path = dir.path().join("tasks.json");
        let mut app = App::new(&path);
        for text in texts {
            app.store.add(text);
        }
        app.update_visible_tasks();
        app
    }

    fn press(app: &mut App, key: KeyCode) {
        let quit = match app.state {
            AppState::TaskList => app.handle_task_list_input(key, KeyModifiers::NONE),
            AppState::AddTask => app.handle_add_input(key, KeyModifiers::NONE),
            AppState::EditTask => app.handle_edit_input(key, KeyModifiers::NONE),
            AppState::Confirm => app.handle_confirm_input(key, KeyModifiers::NONE),
            AppState::Help => app.handle_help_input(key, KeyModifiers::NONE),
        }
        .unwrap();
        assert!(!quit);
    }

    fn type_text(app: &mut App, text: &str) {
        for c in text.chars() {
            press(app, KeyCode::Char(c));
        }
    }

    #[test]
    fn test_toggle_persists_to_disk() {
        let dir = TempDir::new().unwrap();
        let mut app = app_with_tasks(&dir, &["Buy milk"]);

        press(&mut app, KeyCode::Enter);
        assert!(app.store.tasks[0].done);

        let reloaded = TaskStore::load(&dir.path().join("tasks.json"));
        assert!(reloaded.tasks[0].done);
    }

    #[test]
    fn test_add_flow_clears_input_and_appends() {
        let dir = TempDir::new().unwrap();
        let mut app = app_with_tasks(&dir, &["existing"]);

        press(&mut app, KeyCode::Char('a'));
        assert_eq!(app.state, AppState::AddTask);
        type_text(&mut app, "Buy milk");
        press(&mut app, KeyCode::Enter);

        assert_eq!(app.state, AppState::AddTask);
        assert!(app.input.value.is_empty());
        assert_eq!(app.store.tasks.last().unwrap().text, "Buy milk");
        assert_eq!(app.visible_tasks.len(), 2);
    }

    #[test]
    fn test_add_whitespace_is_silently_ignored() {
        let dir = TempDir::new().unwrap();
        let mut app = app_with_tasks(&dir, &[]);

        press(&mut app, KeyCode::Char('a'));
        type_text(&mut app, "   ");
        press(&mut app, KeyCode::Enter);

        assert!(app.store.tasks.is_empty());
        assert!(app.status_message.is_empty());
    }

    #[test]
    fn test_edit_empty_keeps_edit_mode_active() {
        let dir = TempDir::new().unwrap();
        let mut app = app_with_tasks(&dir, &["original"]);

        press(&mut app, KeyCode::Char('e'));
        assert_eq!(app.state, AppState::EditTask);
        for _ in 0.."original".len() {
            press(&mut app, KeyCode::Backspace);
        }
        press(&mut app, KeyCode::Enter);

        assert_eq!(app.state, AppState::EditTask);
        assert!(!app.status_message.is_empty());
        assert_eq!(app.store.tasks[0].text, "original");
    }

    #[test]
    fn test_edit_commit_preserves_done_state() {
        let dir = TempDir::new().unwrap();
        let mut app = app_with_tasks(&dir, &["Buy milk"]);
        let id = app.store.tasks[0].id;
        app.store.toggle_done(id);

        press(&mut app, KeyCode::Char('e'));
        type_text(&mut app, " again");
        press(&mut app, KeyCode::Enter);

        assert_eq!(app.state, AppState::TaskList);
        assert_eq!(app.store.tasks[0].text, "Buy milk again");
        assert!(app.store.tasks[0].done);
    }

    #[test]
    fn test_edit_cancel_leaves_task_unchanged() {
        let dir = TempDir::new().unwrap();
        let mut app = app_with_tasks(&dir, &["original"]);

        press(&mut app, KeyCode::Char('e'));
        type_text(&mut app, " changed");
        press(&mut app, KeyCode::Esc);

        assert_eq!(app.state, AppState::TaskList);
        assert_eq!(app.store.tasks[0].text, "original");
    }

    #[test]
    fn test_filter_keys_are_exclusive() {
        let dir = TempDir::new().unwrap();
        let mut app = app_with_tasks(&dir, &["a", "b", "c"]);
        let b = app.store.tasks[1].id;
        app.store.toggle_done(b);
        app.update_visible_tasks();

        press(&mut app, KeyCode::Char('2'));
        assert_eq!(app.filter, Filter::Pending);
        assert!(!app.visible_tasks.contains(&b));
        assert_eq!(app.visible_tasks.len(), 2);

        press(&mut app, KeyCode::Char('3'));
        assert_eq!(app.visible_tasks, vec![b]);

        press(&mut app, KeyCode::Char('1'));
        assert_eq!(app.visible_tasks.len(), 3);
    }

    #[test]
    fn test_delete_confirm_flow_removes_by_id() {
        let dir = TempDir::new().unwrap();
        let mut app = app_with_tasks(&dir, &["first", "second"]);
        let first = app.store.tasks[0].id;

        press(&mut app, KeyCode::Char('d'));
        assert_eq!(app.state, AppState::Confirm);
        press(&mut app, KeyCode::Char('y'));

        assert_eq!(app.state, AppState::TaskList);
        assert_eq!(app.store.tasks.len(), 1);
        assert!(app.store.get(first).is_none());
    }

    #[test]
    fn test_delete_cancel_keeps_task() {
        let dir = TempDir::new().unwrap();
        let mut app = app_with_tasks(&dir, &["keep me"]);

        press(&mut app, KeyCode::Char('d'));
        press(&mut app, KeyCode::Char('n'));

        assert_eq!(app.state, AppState::TaskList);
        assert_eq!(app.store.tasks.len(), 1);
    }
}
