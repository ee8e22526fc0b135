use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph, Wrap};
use ratatui::Frame;

use crate::models::Task;
use crate::tui::widgets::color::{Palette, priority_color};
use crate::utils::{format_due_date, parse_timestamp};

fn format_stamp(raw: &str) -> String {
    match parse_timestamp(raw) {
        Some(ts) => ts.format("%b %-d, %Y %H:%M UTC").to_string(),
        None => raw.to_string(),
    }
}

/// Lines of the detail pane for one task
pub fn detail_lines(task: &Task, palette: &Palette) -> Vec<Line<'static>> {
    let label = Style::default().fg(palette.muted);
    let value = Style::default().fg(palette.fg);

    let (status, status_style) = if task.completed {
        ("Completed", Style::default().fg(palette.accent))
    } else {
        ("Pending", value)
    };

    let mut lines = vec![
        Line::from(Span::styled(task.title.clone(), value.add_modifier(Modifier::BOLD))),
        Line::from(""),
        Line::from(vec![Span::styled("Status:   ", label), Span::styled(status, status_style)]),
        Line::from(vec![
            Span::styled("Priority: ", label),
            Span::styled(
                task.priority.as_str(),
                Style::default().fg(priority_color(task.priority)).add_modifier(Modifier::BOLD),
            ),
        ]),
        Line::from(vec![
            Span::styled("Due:      ", label),
            Span::styled(format_due_date(task.due_date.as_deref()), value),
        ]),
        Line::from(""),
    ];

    if task.description.is_empty() {
        lines.push(Line::from(Span::styled("No description", label.add_modifier(Modifier::ITALIC))));
    } else {
        lines.extend(task.description.lines().map(|l| Line::from(Span::styled(l.to_string(), value))));
    }

    lines.push(Line::from(""));
    lines.push(Line::from(vec![
        Span::styled("Created:  ", label),
        Span::styled(format_stamp(&task.created_at), label),
    ]));
    lines.push(Line::from(vec![
        Span::styled("Updated:  ", label),
        Span::styled(format_stamp(&task.updated_at), label),
    ]));
    lines
}

pub fn render_item_view(f: &mut Frame, area: Rect, task: Option<&Task>, palette: &Palette) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title("Details")
        .style(Style::default().fg(palette.fg).bg(palette.bg));

    let paragraph = match task {
        Some(task) => Paragraph::new(detail_lines(task, palette)),
        None => Paragraph::new("Select a task to view details").style(Style::default().fg(palette.muted)),
    };

    f.render_widget(paragraph.block(block).wrap(Wrap { trim: false }), area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Theme;
    use crate::store::demo_tasks;

    #[test]
    fn detail_shows_due_and_missing_description() {
        let palette = Palette::from_theme(&Theme::light());
        let tasks = demo_tasks();
        let groceries = tasks.iter().find(|t| t.title == "Buy groceries").unwrap();
        let text: Vec<String> = detail_lines(groceries, &palette)
            .iter()
            .map(|l| l.spans.iter().map(|s| s.content.as_ref()).collect())
            .collect();
        assert!(text.contains(&"Status:   Completed".to_string()));
        assert!(text.contains(&"Due:      Nov 11, 2025".to_string()));
        assert!(text.contains(&"No description".to_string()));
        assert!(text.contains(&"Created:  Nov 10, 2025 08:00 UTC".to_string()));
    }
}
