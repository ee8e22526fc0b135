use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph};
use ratatui::Frame;

use crate::models::Priority;
use crate::tui::widgets::color::Palette;
use crate::utils::format_key_binding_for_display;
use crate::view::{FilterSpec, PriorityFilter, StatusFilter};
use crate::Config;

fn pill<'a>(label: &'a str, active: bool, palette: &Palette) -> Span<'a> {
    let style = if active {
        Style::default()
            .fg(palette.highlight_fg)
            .bg(palette.highlight_bg)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(palette.muted)
    };
    Span::styled(format!(" {} ", label), style)
}

/// Status and priority pills. The active value of each filter is highlighted.
pub fn render_filters_box(f: &mut Frame, area: Rect, filter: &FilterSpec, config: &Config, palette: &Palette) {
    let mut spans = vec![Span::styled("Status ", Style::default().fg(palette.fg))];
    for status in StatusFilter::ALL {
        spans.push(pill(status.as_str(), filter.status == status, palette));
    }

    spans.push(Span::raw("   "));
    spans.push(Span::styled("Priority ", Style::default().fg(palette.fg)));
    spans.push(pill("All", filter.priority == PriorityFilter::All, palette));
    for priority in Priority::ALL {
        spans.push(pill(priority.as_str(), filter.priority == PriorityFilter::Only(priority), palette));
    }

    let title = format!(
        "Filters ({}: status, {}: priority, {}: clear)",
        format_key_binding_for_display(&config.key_bindings.cycle_status),
        format_key_binding_for_display(&config.key_bindings.cycle_priority),
        format_key_binding_for_display(&config.key_bindings.clear_filters),
    );

    let paragraph = Paragraph::new(Line::from(spans))
        .block(Block::default()
            .borders(Borders::ALL)
            .title(title)
            .style(Style::default().fg(palette.fg).bg(palette.bg)))
        .style(Style::default().fg(palette.fg));

    f.render_widget(paragraph, area);
}

/// One-line search field. Places the cursor while the search is being typed.
pub fn render_search_line(f: &mut Frame, area: Rect, query: &str, active: bool, config: &Config, palette: &Palette) {
    let label = " Search: ";
    let (text, text_style) = if query.is_empty() && !active {
        (
            format!("press {} to search titles", format_key_binding_for_display(&config.key_bindings.search)),
            Style::default().fg(palette.muted),
        )
    } else {
        (query.to_string(), Style::default().fg(palette.fg))
    };

    let line = Line::from(vec![
        Span::styled(label, Style::default().fg(palette.accent).add_modifier(Modifier::BOLD)),
        Span::styled(text, text_style),
    ]);
    f.render_widget(Paragraph::new(line).style(Style::default().bg(palette.bg)), area);

    if active {
        let offset = u16::try_from(label.chars().count() + query.chars().count()).unwrap_or(u16::MAX);
        let x = area.x.saturating_add(offset);
        f.set_cursor_position((x.min(area.right().saturating_sub(1)), area.y));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ThemeMode;
    use ratatui::Terminal;
    use ratatui::backend::TestBackend;

    #[test]
    fn search_cursor_stays_inside_line_for_huge_queries() {
        let config = Config::default();
        let palette = Palette::from_theme(&config.get_theme(ThemeMode::Dark));
        let query = "x".repeat(usize::from(u16::MAX) - 9);
        let mut terminal = Terminal::new(TestBackend::new(40, 3)).unwrap();
        let area = Rect::new(30, 1, 10, 1);

        terminal
            .draw(|f| render_search_line(f, area, &query, true, &config, &palette))
            .unwrap();

        let cursor = terminal.get_cursor_position().unwrap();
        assert_eq!((cursor.x, cursor.y), (39, 1));
    }
}
