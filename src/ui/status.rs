use crate::app::App;
use ratatui::{
    layout::Rect,
    style::{Color, Style},
    widgets::Paragraph,
    Frame,
};
use std::borrow::Cow;

/// Render the status bar.
///
/// Priority: transient status message, then loading indicator, then
/// keybinding hints.
pub fn render(f: &mut Frame, app: &App, area: Rect) {
    if area.width < 1 || area.height < 1 {
        return;
    }

    // Cow avoids allocations for static hints and borrowed status messages
    let text: Cow<'_, str> = if let Some((msg, _)) = &app.status_message {
        Cow::Borrowed(msg.as_ref())
    } else if app.controller.state().is_loading {
        Cow::Borrowed("Loading...")
    } else if app.search_mode {
        Cow::Borrowed("Type to search | ESC/ENTER done")
    } else {
        Cow::Borrowed("[/]search [Tab]switch [1-9]tab [r]efresh [j/k]move [q]uit")
    };

    let style = Style::default().bg(Color::DarkGray).fg(Color::White);
    let paragraph = Paragraph::new(text).style(style);
    f.render_widget(paragraph, area);
}
