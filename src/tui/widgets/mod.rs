pub mod color;
pub mod confirm_delete;
pub mod editor;
pub mod filters_box;
pub mod form;
pub mod header;
pub mod help;
pub mod item_view;
pub mod status_bar;
pub mod task_list;

use ratatui::layout::{Constraint, Flex, Layout, Rect};

/// Centered rect covering the given percentages of `area`
/// Based on ratatui popup example: https://ratatui.rs/examples/apps/popup/
pub fn popup_area(area: Rect, percent_x: u16, percent_y: u16) -> Rect {
    let vertical = Layout::vertical([Constraint::Percentage(percent_y)]).flex(Flex::Center);
    let horizontal = Layout::horizontal([Constraint::Percentage(percent_x)]).flex(Flex::Center);
    let [area] = vertical.areas(area);
    let [area] = horizontal.areas(area);
    area
}

/// Cut `text` to `max_width` chars, ending in "..." when shortened
pub fn truncate_with_ellipsis(text: &str, max_width: usize) -> String {
    if text.chars().count() <= max_width {
        text.to_string()
    } else {
        text.chars().take(max_width.saturating_sub(3)).collect::<String>() + "..."
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncation() {
        assert_eq!(truncate_with_ellipsis("short", 10), "short");
        assert_eq!(truncate_with_ellipsis("a long title", 8), "a lon...");
    }

    #[test]
    fn popup_is_centered() {
        let area = popup_area(Rect::new(0, 0, 100, 50), 50, 50);
        assert_eq!((area.x, area.width, area.height), (25, 50, 25));
    }
}
