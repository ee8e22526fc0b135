use ratatui::layout::{Constraint, Direction, Layout as RatLayout, Rect};

pub struct Layout {
    pub header_area: Rect,
    pub search_area: Rect,
    pub filters_area: Rect,
    pub list_area: Rect,
    pub detail_area: Rect,
    pub status_area: Rect,
}

impl Layout {
    /// Smallest terminal the list and detail panes still fit in
    pub const MIN_WIDTH: u16 = 50;
    pub const MIN_HEIGHT: u16 = 14;

    /// Share of the content row given to the task list
    const LIST_PERCENT: u16 = 45;

    pub fn calculate(size: Rect) -> Self {
        let width = size.width.max(Self::MIN_WIDTH);
        let height = size.height.max(Self::MIN_HEIGHT);
        let size = Rect::new(size.x, size.y, width, height);

        let vertical = RatLayout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1), // Header
                Constraint::Length(1), // Search
                Constraint::Length(3), // Filter pills
                Constraint::Min(1),    // List + detail
                Constraint::Length(1), // Status
            ])
            .split(size);

        let horizontal = RatLayout::default()
            .direction(Direction::Horizontal)
            .constraints([
                Constraint::Percentage(Self::LIST_PERCENT),
                Constraint::Min(1),
            ])
            .split(vertical[3]);

        Self {
            header_area: vertical[0],
            search_area: vertical[1],
            filters_area: vertical[2],
            list_area: horizontal[0],
            detail_area: horizontal[1],
            status_area: vertical[4],
        }
    }
}
