use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use ratatui::Frame;

use crate::models::ThemeMode;
use crate::tui::widgets::color::Palette;

/// Title, task counts and the active theme on one line
pub fn render_header(
    f: &mut Frame,
    area: Rect,
    pending: usize,
    completed: usize,
    theme: ThemeMode,
    palette: &Palette,
) {
    let base = Style::default().fg(palette.fg).bg(palette.bg);
    let muted = Style::default().fg(palette.muted).bg(palette.bg);

    let left = vec![
        Span::styled(
            " taskdeck ",
            Style::default()
                .fg(palette.highlight_fg)
                .bg(palette.highlight_bg)
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled("  ", base),
        Span::styled(format!("{} pending", pending), base),
        Span::styled(" • ", muted),
        Span::styled(format!("{} completed", completed), base),
    ];
    let theme_label = match theme {
        ThemeMode::Light => "☀ Light",
        ThemeMode::Dark => "☾ Dark",
    };

    let used: usize = left.iter().map(|s| s.content.chars().count()).sum();
    let label_width = theme_label.chars().count() + 1;
    let gap = (area.width as usize).saturating_sub(used + label_width);

    let mut spans = left;
    spans.push(Span::styled(" ".repeat(gap), base));
    spans.push(Span::styled(format!("{} ", theme_label), Style::default().fg(palette.accent).bg(palette.bg)));

    f.render_widget(Paragraph::new(Line::from(spans)).style(base), area);
}
