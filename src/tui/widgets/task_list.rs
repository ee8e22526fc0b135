use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{
    Block, Borders, List, ListItem, ListState, Paragraph, Scrollbar, ScrollbarOrientation, ScrollbarState,
    StatefulWidget, Wrap,
};
use ratatui::Frame;

use crate::models::Task;
use crate::tui::widgets::color::{Palette, priority_color};
use crate::tui::widgets::truncate_with_ellipsis;
use crate::utils::{format_due_date, format_key_binding_for_display};
use crate::Config;

/// One list row: status mark, title, priority badge and due date
fn task_line(task: &Task, max_width: usize, palette: &Palette) -> Line<'static> {
    let mark = if task.completed { "✓ " } else { "○ " };
    let badge = format!(" {} ", task.priority.as_str());
    let due = format!("  {}", format_due_date(task.due_date.as_deref()));

    let fixed = mark.chars().count() + badge.chars().count() + due.chars().count() + 1;
    let title = truncate_with_ellipsis(&task.title, max_width.saturating_sub(fixed).max(4));

    let title_style = if task.completed {
        Style::default().fg(palette.muted).add_modifier(Modifier::CROSSED_OUT)
    } else {
        Style::default().fg(palette.fg)
    };

    Line::from(vec![
        Span::styled(mark, Style::default().fg(palette.accent)),
        Span::styled(title, title_style),
        Span::raw(" "),
        Span::styled(badge, Style::default().fg(priority_color(task.priority)).add_modifier(Modifier::BOLD)),
        Span::styled(due, Style::default().fg(palette.muted)),
    ])
}

pub fn render_task_list(
    f: &mut Frame,
    area: Rect,
    tasks: &[Task],
    total_count: usize,
    list_state: &mut ListState,
    config: &Config,
    palette: &Palette,
) {
    let title = format!("Tasks ({} of {})", tasks.len(), total_count);
    let block = Block::default()
        .borders(Borders::ALL)
        .title(title)
        .style(Style::default().fg(palette.fg).bg(palette.bg));

    if tasks.is_empty() {
        let message = if total_count == 0 {
            format!(
                "No tasks yet. Press {} to add one.",
                format_key_binding_for_display(&config.key_bindings.new)
            )
        } else {
            format!(
                "No tasks match the current filters. Press {} to clear them.",
                format_key_binding_for_display(&config.key_bindings.clear_filters)
            )
        };
        let paragraph = Paragraph::new(message)
            .block(block)
            .style(Style::default().fg(palette.muted))
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true });
        f.render_widget(paragraph, area);
        return;
    }

    // Reserve a column for the scrollbar
    let list_areas = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Min(1), Constraint::Length(1)])
        .split(area);
    let list_area = list_areas[0];
    let scrollbar_area = list_areas[1];

    let max_width = list_area.width.saturating_sub(4) as usize;
    let items: Vec<ListItem> = tasks
        .iter()
        .map(|task| ListItem::new(task_line(task, max_width, palette)))
        .collect();

    let list = List::new(items)
        .block(block)
        .highlight_style(Style::default().fg(palette.highlight_fg).bg(palette.highlight_bg))
        .highlight_symbol("▌");

    StatefulWidget::render(list, list_area, f.buffer_mut(), list_state);

    let visible_items = list_area.height.saturating_sub(2) as usize;
    if tasks.len() > visible_items && visible_items > 0 && scrollbar_area.width > 0 {
        let scrollbar_inner_area = Rect::new(
            scrollbar_area.x,
            list_area.y + 1,
            scrollbar_area.width,
            list_area.height.saturating_sub(2),
        );
        let selected_index = list_state.selected().unwrap_or(0);
        let mut scrollbar_state = ScrollbarState::new(tasks.len())
            .viewport_content_length(visible_items)
            .position(selected_index);

        let scrollbar = Scrollbar::default()
            .orientation(ScrollbarOrientation::VerticalRight)
            .begin_symbol(Some("↑"))
            .end_symbol(Some("↓"))
            .track_symbol(Some("│"))
            .thumb_symbol("█");

        f.render_stateful_widget(scrollbar, scrollbar_inner_area, &mut scrollbar_state);
    }
}
