use ratatui::layout::{Alignment, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};
use ratatui::Frame;

use crate::models::Task;
use crate::tui::widgets::color::Palette;
use crate::tui::widgets::popup_area;

pub const DELETE_OPTIONS: [&str; 2] = ["Delete", "Cancel"];

pub fn render_confirm_delete(f: &mut Frame, area: Rect, task: &Task, selection: usize, palette: &Palette) {
    let popup_area = popup_area(area, 50, 35);
    f.render_widget(Clear, popup_area);

    let base = Style::default().fg(palette.fg).bg(palette.bg);
    let mut lines = vec![
        Line::from(Span::styled("Delete this task? This cannot be undone.", base)),
        Line::from(""),
        Line::from(Span::styled(task.title.clone(), base.add_modifier(Modifier::BOLD))),
        Line::from(""),
    ];

    let options: Vec<Span> = DELETE_OPTIONS
        .iter()
        .enumerate()
        .map(|(index, option)| {
            let style = if index == selection {
                if index == 0 {
                    Style::default().fg(palette.bg).bg(palette.error).add_modifier(Modifier::BOLD)
                } else {
                    Style::default().fg(palette.highlight_fg).bg(palette.highlight_bg)
                }
            } else {
                base
            };
            Span::styled(format!("  {}  ", option), style)
        })
        .collect();
    let mut option_spans = Vec::new();
    for (i, span) in options.into_iter().enumerate() {
        if i > 0 {
            option_spans.push(Span::styled("   ", base));
        }
        option_spans.push(span);
    }
    lines.push(Line::from(option_spans));

    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        "←/→ to choose, Enter to confirm, y/n, Esc to cancel",
        Style::default().fg(palette.muted).bg(palette.bg),
    )));

    let paragraph = Paragraph::new(lines)
        .block(Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(palette.error))
            .title("Confirm Delete")
            .title_alignment(Alignment::Center)
            .style(base))
        .style(base)
        .wrap(Wrap { trim: true })
        .alignment(Alignment::Center);

    f.render_widget(paragraph, popup_area);
}
