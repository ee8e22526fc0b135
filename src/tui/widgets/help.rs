use ratatui::layout::{Alignment, Rect};
use ratatui::style::Style;
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};
use ratatui::Frame;

use crate::tui::widgets::color::Palette;
use crate::tui::widgets::popup_area;
use crate::utils::format_key_binding_for_display as key;
use crate::Config;

pub fn render_help(f: &mut Frame, area: Rect, config: &Config, palette: &Palette) {
    let popup_area = popup_area(area, 60, 75);
    f.render_widget(Clear, popup_area);

    let paragraph = Paragraph::new(build_help_text(config))
        .block(Block::default()
            .borders(Borders::ALL)
            .title("Help - Key Bindings")
            .title_alignment(Alignment::Center)
            .style(Style::default().fg(palette.fg).bg(palette.bg)))
        .style(Style::default().fg(palette.fg).bg(palette.bg))
        .wrap(Wrap { trim: false });

    f.render_widget(paragraph, popup_area);
}

pub fn build_help_text(config: &Config) -> String {
    let kb = &config.key_bindings;
    let mut text = String::new();

    text.push_str("Tasks:\n");
    text.push_str(&format!("  {} / {}: Move selection up/down\n", key(&kb.list_up), key(&kb.list_down)));
    text.push_str(&format!("  {}: New task\n", key(&kb.new)));
    text.push_str(&format!("  {}: Edit selected task\n", key(&kb.edit)));
    text.push_str(&format!("  {}: Delete selected task\n", key(&kb.delete)));
    text.push_str(&format!("  {}: Toggle completed\n", key(&kb.toggle_complete)));
    text.push('\n');

    text.push_str("Filtering:\n");
    text.push_str(&format!("  {}: Search titles (Enter/Esc to finish)\n", key(&kb.search)));
    text.push_str(&format!("  {}: Cycle status filter\n", key(&kb.cycle_status)));
    text.push_str(&format!("  {}: Cycle priority filter\n", key(&kb.cycle_priority)));
    text.push_str(&format!("  {}: Clear filters\n", key(&kb.clear_filters)));
    text.push('\n');

    text.push_str("Form:\n");
    text.push_str("  Tab / Shift+Tab: Next/previous field\n");
    text.push_str("  Left / Right: Change priority\n");
    text.push_str(&format!("  {}: Save\n", key(&kb.save)));
    text.push_str("  Esc: Cancel\n");
    text.push('\n');

    text.push_str("General:\n");
    text.push_str(&format!("  {}: Toggle light/dark theme\n", key(&kb.toggle_theme)));
    text.push_str(&format!("  {}: Show/hide help\n", key(&kb.help)));
    text.push_str(&format!("  {}: Quit\n", key(&kb.quit)));

    text
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn help_lists_configured_keys() {
        let mut config = Config::default();
        config.key_bindings.quit = "x".to_string();
        let text = build_help_text(&config);
        assert!(text.contains("  x: Quit"));
        assert!(text.contains("Space: Toggle completed"));
    }
}
