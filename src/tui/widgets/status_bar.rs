use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::widgets::Paragraph;
use ratatui::Frame;

use crate::tui::widgets::color::Palette;
use crate::tui::widgets::truncate_with_ellipsis;

const SEPARATOR: &str = " • ";
const ELLIPSIS: &str = "...";

/// Join as many hints as fit in `max_width`, ending with "..." when some are dropped
pub fn fit_key_hints(key_hints: &[String], max_width: usize) -> String {
    let mut hints_text = String::new();
    for (i, hint) in key_hints.iter().enumerate() {
        let current_len = hints_text.chars().count();
        let would_be_len = if i == 0 {
            hint.chars().count()
        } else {
            current_len + SEPARATOR.chars().count() + hint.chars().count()
        };

        if would_be_len > max_width {
            if i == 0 {
                return truncate_with_ellipsis(hint, max_width);
            }
            if current_len + ELLIPSIS.len() <= max_width {
                hints_text.push_str(ELLIPSIS);
            } else {
                hints_text = hints_text
                    .chars()
                    .take(max_width.saturating_sub(ELLIPSIS.len()))
                    .collect::<String>();
                hints_text.push_str(ELLIPSIS);
            }
            break;
        }

        if i > 0 {
            hints_text.push_str(SEPARATOR);
        }
        hints_text.push_str(hint);
    }
    hints_text
}

/// Toast message when present, key hints otherwise
pub fn render_status_bar(f: &mut Frame, area: Rect, message: Option<&str>, key_hints: &[String], palette: &Palette) {
    let max_width = area.width as usize;
    let (content, style) = match message {
        Some(msg) => (
            truncate_with_ellipsis(msg, max_width),
            Style::default()
                .fg(palette.highlight_fg)
                .bg(palette.highlight_bg)
                .add_modifier(Modifier::BOLD),
        ),
        None => (
            fit_key_hints(key_hints, max_width),
            Style::default().fg(palette.muted).bg(palette.bg),
        ),
    };

    f.render_widget(Paragraph::new(content).style(style), area);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hints() -> Vec<String> {
        vec!["q: Quit".to_string(), "n: New".to_string(), "e: Edit".to_string()]
    }

    #[test]
    fn all_hints_fit() {
        assert_eq!(fit_key_hints(&hints(), 80), "q: Quit • n: New • e: Edit");
    }

    #[test]
    fn overflow_gets_ellipsis() {
        assert_eq!(fit_key_hints(&hints(), 20), "q: Quit • n: New...");
    }

    #[test]
    fn first_hint_truncated() {
        assert_eq!(fit_key_hints(&hints(), 5), "q:...");
    }
}
