use crate::app::App;
use crate::feed::{FeedItem, FeedKind};
use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem},
    Frame,
};
use unicode_width::UnicodeWidthStr;

/// Render the feed item list panel.
pub fn render(f: &mut Frame, app: &App, area: Rect) {
    if area.width < 3 || area.height < 3 {
        return;
    }

    let state = app.controller.state();
    // Interior width minus borders, badge column, and padding
    let title_width = (area.width as usize).saturating_sub(10);

    let items: Vec<ListItem> = if state.items.is_empty() {
        let placeholder = if state.is_loading {
            "Loading..."
        } else {
            "No items. Press r to refresh or / to search."
        };
        vec![ListItem::new(placeholder)]
    } else {
        state
            .items
            .iter()
            .enumerate()
            .map(|(i, item)| render_item(item, i == app.selected, title_width))
            .collect()
    };

    let title = list_title(app);
    let list = List::new(items).block(Block::default().borders(Borders::ALL).title(title));
    f.render_widget(list, area);
}

/// Two-line list entry: badge + title, then source and relative time.
fn render_item(item: &FeedItem, selected: bool, title_width: usize) -> ListItem<'static> {
    let badge_style = Style::default().fg(match item.kind {
        FeedKind::NewsArticle => Color::Blue,
        FeedKind::Video => Color::Magenta,
        FeedKind::JobPosting => Color::Green,
    });

    let title_style = if selected {
        Style::default().bg(Color::DarkGray).fg(Color::White)
    } else {
        Style::default().add_modifier(Modifier::BOLD)
    };

    let head = Line::from(vec![
        Span::styled(format!("{:<6}", item.kind.badge()), badge_style),
        Span::styled(truncate(&item.title, title_width), title_style),
    ]);
    let detail = Line::from(Span::styled(
        format!("      {} · {}", item.source, item.time_ago),
        Style::default().fg(Color::DarkGray),
    ));

    ListItem::new(vec![head, detail])
}

/// Panel title reflecting item count and fetch progress.
fn list_title(app: &App) -> String {
    let state = app.controller.state();
    if state.is_loading {
        format!("Feed ({}) — loading...", state.items.len())
    } else if !state.has_more_data && !state.items.is_empty() {
        format!("Feed ({}) — end", state.items.len())
    } else {
        format!("Feed ({})", state.items.len())
    }
}

/// Truncate to a display width, appending an ellipsis when cut.
fn truncate(text: &str, max_width: usize) -> String {
    if text.width() <= max_width {
        return text.to_string();
    }
    let mut out = String::new();
    let mut width = 0;
    for c in text.chars() {
        let w = unicode_width::UnicodeWidthChar::width(c).unwrap_or(0);
        if width + w > max_width.saturating_sub(1) {
            break;
        }
        width += w;
        out.push(c);
    }
    out.push('…');
    out
}
