//! Keyboard input handling.
//!
//! Two modes: browse (navigation, tabs, refresh) and search (text entry
//! feeding the debounced search trigger). Scrolling near the bottom of the
//! list requests the next page, the keyboard equivalent of an infinite
//! scroll threshold.

use crate::app::{App, AppEvent};
use crossterm::event::{KeyCode, KeyModifiers};
use tokio::sync::mpsc;

use super::loop_runner::Action;

/// Maximum allowed search query length (UI layer validation)
const MAX_SEARCH_LENGTH: usize = 256;

/// Handle a key press, dispatching on the current input mode.
pub(super) fn handle_input(
    app: &mut App,
    code: KeyCode,
    modifiers: KeyModifiers,
    event_tx: &mpsc::Sender<AppEvent>,
) -> Action {
    if modifiers.contains(KeyModifiers::CONTROL) && code == KeyCode::Char('c') {
        return Action::Quit;
    }

    if app.search_mode {
        handle_search_input(app, code);
        return Action::Continue;
    }

    match code {
        KeyCode::Char('q') => return Action::Quit,

        KeyCode::Char('/') => {
            app.search_mode = true;
        }

        KeyCode::Char('r') => {
            if let Some(plan) = app.controller.refresh() {
                app.issue_fetch(plan, event_tx);
            }
        }

        // Tab cycling, with wrap-around
        KeyCode::Tab | KeyCode::Right => {
            let next = (app.controller.tab_index() + 1) % app.tabs.len();
            if let Some(plan) = app.controller.select_tab(next) {
                app.issue_fetch(plan, event_tx);
            }
        }
        KeyCode::BackTab | KeyCode::Left => {
            let count = app.tabs.len();
            let prev = (app.controller.tab_index() + count - 1) % count;
            if let Some(plan) = app.controller.select_tab(prev) {
                app.issue_fetch(plan, event_tx);
            }
        }

        // Direct tab selection: 1-9
        KeyCode::Char(c @ '1'..='9') => {
            let index = c as usize - '1' as usize;
            if index < app.tabs.len() {
                if let Some(plan) = app.controller.select_tab(index) {
                    app.issue_fetch(plan, event_tx);
                }
            }
        }

        KeyCode::Char('j') | KeyCode::Down => {
            if app.nav_down() {
                request_next_page(app, event_tx);
            }
        }
        KeyCode::Char('k') | KeyCode::Up => {
            app.nav_up();
        }
        KeyCode::Char('g') => {
            app.selected = 0;
        }
        KeyCode::Char('G') => {
            let len = app.controller.state().items.len();
            app.selected = len.saturating_sub(1);
            request_next_page(app, event_tx);
        }

        _ => {}
    }

    Action::Continue
}

/// Ask the controller for the next page. Silently refused while a fetch is
/// live or once the feed is exhausted.
fn request_next_page(app: &mut App, event_tx: &mpsc::Sender<AppEvent>) {
    if let Some(plan) = app.controller.load_more() {
        app.issue_fetch(plan, event_tx);
    }
}

/// Handle key presses while the search bar has focus.
///
/// Every edit feeds the controller's debounce window; the fetch itself is
/// issued later from the tick handler once typing pauses.
fn handle_search_input(app: &mut App, code: KeyCode) {
    match code {
        KeyCode::Esc | KeyCode::Enter => {
            app.search_mode = false;
        }
        KeyCode::Backspace => {
            if app.search_input.pop().is_some() {
                app.controller.search(app.search_input.clone());
            }
        }
        KeyCode::Char(c) => {
            if app.search_input.len() >= MAX_SEARCH_LENGTH {
                app.set_status(format!("Search query too long (max {} chars)", MAX_SEARCH_LENGTH));
                return;
            }
            app.search_input.push(c);
            app.controller.search(app.search_input.clone());
        }
        _ => {}
    }
}
