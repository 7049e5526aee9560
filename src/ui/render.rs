//! Render functions for the TUI.
//!
//! Single vertical layout: search bar, tab bar, item list, status line.

use crate::app::App;
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout},
    style::{Color, Style},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use super::{feedlist, status, tabs};

/// Minimum terminal dimensions required for normal operation.
pub(super) const MIN_WIDTH: u16 = 40;
pub(super) const MIN_HEIGHT: u16 = 10;

/// Main render dispatch function.
///
/// Handles terminal size validation before rendering.
pub(super) fn render(f: &mut Frame, app: &mut App) {
    let area = f.area();

    // Guard against zero-width/height to prevent panics
    if area.width < 1 || area.height < 1 {
        return;
    }

    // Minimum terminal size check for usable UI
    if area.width < MIN_WIDTH || area.height < MIN_HEIGHT {
        let msg = if area.height < 3 || area.width < 20 {
            Paragraph::new("Too small")
        } else {
            Paragraph::new(format!(
                "Terminal too small\n\nMinimum: {}x{}\nCurrent: {}x{}",
                MIN_WIDTH, MIN_HEIGHT, area.width, area.height
            ))
            .alignment(Alignment::Center)
        };
        f.render_widget(msg, area);
        return;
    }

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Search bar
            Constraint::Length(3), // Tab bar
            Constraint::Min(0),    // Item list
            Constraint::Length(1), // Status line
        ])
        .split(area);

    render_search_bar(f, app, chunks[0]);
    tabs::render(f, app, chunks[1]);
    feedlist::render(f, app, chunks[2]);
    status::render(f, app, chunks[3]);
}

/// Render the search input with focus highlighting.
fn render_search_bar(f: &mut Frame, app: &App, area: ratatui::layout::Rect) {
    let border_style = if app.search_mode {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default()
    };

    let text = if app.search_input.is_empty() && !app.search_mode {
        "Press / to search".to_string()
    } else {
        app.search_input.clone()
    };

    let style = if app.search_input.is_empty() && !app.search_mode {
        Style::default().fg(Color::DarkGray)
    } else {
        Style::default()
    };

    let paragraph = Paragraph::new(text).style(style).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(border_style)
            .title("Search"),
    );
    f.render_widget(paragraph, area);

    if app.search_mode {
        // Place the cursor after the typed text, inside the border
        let x = area.x + 1 + app.search_input.len().min(area.width as usize - 2) as u16;
        f.set_cursor_position((x, area.y + 1));
    }
}
