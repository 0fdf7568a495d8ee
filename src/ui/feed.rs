use chrono::Utc;
use ratatui::layout::{Alignment, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, List, ListItem, ListState, Paragraph};
use ratatui::Frame;

use crate::app::App;

pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let block = Block::default().borders(Borders::ALL).title(" Stories ");

    if app.loading && app.stories.is_empty() {
        let loading = Paragraph::new("Loading best stories...")
            .block(block)
            .alignment(Alignment::Center)
            .style(Style::default().fg(Color::Yellow));
        frame.render_widget(loading, area);
        return;
    }

    if app.error.is_some() && app.stories.is_empty() {
        let failed = Paragraph::new("Could not load the feed. Press r to retry.")
            .block(block)
            .alignment(Alignment::Center)
            .style(Style::default().fg(Color::Red));
        frame.render_widget(failed, area);
        return;
    }

    if app.exposed_len() == 0 {
        let empty = Paragraph::new("No stories to show. Press r to refresh.")
            .block(block)
            .alignment(Alignment::Center)
            .style(Style::default().fg(Color::Gray));
        frame.render_widget(empty, area);
        return;
    }

    let w = area.width.saturating_sub(2) as usize;
    let fixed = 42; // score(5) + space + comments(5) + spaces(2) + spaces(2) + host(~22) + spaces(2) + age(~4)
    let flex = w.saturating_sub(fixed).max(10);

    let items: Vec<ListItem> = app
        .exposed()
        .enumerate()
        .map(|(i, story)| {
            let is_selected = i == app.cursor;
            let title_style = if is_selected {
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default()
            };

            let title = truncate(&story.title, flex);
            let host_display = truncate(story.host().unwrap_or("self"), 22);

            let line = Line::from(vec![
                Span::styled(
                    format!("{:>5}", story.score),
                    Style::default().fg(Color::Cyan),
                ),
                Span::raw(" "),
                Span::styled(
                    format!("{:>4}c", story.descendants),
                    Style::default().fg(Color::Gray),
                ),
                Span::raw("  "),
                Span::styled(format!("{:<flex$}", title), title_style),
                Span::raw("  "),
                Span::styled(
                    format!("{:<22}", host_display),
                    Style::default().fg(Color::Gray),
                ),
                Span::raw("  "),
                Span::styled(format_age(story.time), Style::default().fg(Color::DarkGray)),
            ]);

            ListItem::new(line)
        })
        .collect();

    let list = List::new(items)
        .block(block)
        .highlight_style(Style::default().bg(Color::DarkGray));

    let mut state = ListState::default();
    state.select(Some(app.cursor));

    frame.render_stateful_widget(list, area, &mut state);
}

/// Shorten to `max` characters with a trailing ellipsis. Counts chars, not
/// bytes; story titles are not ASCII-only.
fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() > max {
        let head: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", head)
    } else {
        s.to_string()
    }
}

fn format_age(dt: chrono::DateTime<chrono::Utc>) -> String {
    let now = Utc::now();
    let duration = now.signed_duration_since(dt);

    if duration.num_days() > 0 {
        format!("{}d", duration.num_days())
    } else if duration.num_hours() > 0 {
        format!("{}h", duration.num_hours())
    } else if duration.num_minutes() > 0 {
        format!("{}m", duration.num_minutes())
    } else {
        "now".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncate_short_string_unchanged() {
        assert_eq!(truncate("hello", 10), "hello");
    }

    #[test]
    fn truncate_long_string_gets_ellipsis() {
        assert_eq!(truncate("a very long story title", 10), "a very ...");
    }

    #[test]
    fn truncate_counts_chars_not_bytes() {
        // Each kana is 3 bytes; byte slicing here would panic.
        assert_eq!(truncate("こんにちは世界のニュース", 8), "こんにちは...");
    }
}
