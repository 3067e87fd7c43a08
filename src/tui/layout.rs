use ratatui::layout::{Constraint, Direction, Layout, Rect};

/// Browser screen layout
pub struct AppLayout {
    pub tabs_area: Rect,
    pub messages_area: Rect,
    pub preview_area: Rect,
    pub nav_area: Rect,
    pub status_area: Rect,
}

impl AppLayout {
    /// - Conversation tabs: top row
    /// - Messages table: 60% width (left)
    /// - Preview pane: 40% width (right)
    /// - Page navigation and status bar: bottom two rows
    pub fn new(area: Rect) -> Self {
        let vertical_chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1), // Tabs
                Constraint::Min(3),    // Main area (at least 3 rows)
                Constraint::Length(1), // Page navigation
                Constraint::Length(1), // Status bar
            ])
            .split(area);

        let horizontal_chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
            .split(vertical_chunks[1]);

        Self {
            tabs_area: vertical_chunks[0],
            messages_area: horizontal_chunks[0],
            preview_area: horizontal_chunks[1],
            nav_area: vertical_chunks[2],
            status_area: vertical_chunks[3],
        }
    }
}

/// Centered box of at most `width` x `height` inside `area`.
pub fn centered_rect(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}
