//! Color constants for the terminal user interface.

use ratatui::style::Color;

/// Active filter tab and focused input borders.
pub const GOLD: Color = Color::Rgb(255, 215, 0);
/// Delete confirmation dialog background.
pub const DARK_RED: Color = Color::Rgb(114, 0, 0);
