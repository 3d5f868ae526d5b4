use ratatui::layout::{Constraint, Direction, Layout as RatLayout, Rect};

pub struct Layout {
    pub inner_area: Rect, // Area inside the outer border
    pub sidebar_area: Rect,
    pub main_area: Rect,
    pub status_area: Rect,
}

impl Layout {
    /// Minimum inner dimensions: a 20 column sidebar plus a usable note,
    /// and a few note lines above the status bar
    pub const MIN_WIDTH: u16 = 40;
    pub const MIN_HEIGHT: u16 = 8;

    const SIDEBAR_MIN: u16 = 20;
    const SIDEBAR_PERCENT: u16 = 25;

    pub fn calculate(size: Rect) -> Self {
        let width = size.width.max(Self::MIN_WIDTH + 2);
        let height = size.height.max(Self::MIN_HEIGHT + 2);
        let size = Rect::new(size.x, size.y, width, height);

        let inner_area = Rect::new(
            size.x + 1,
            size.y + 1,
            size.width.saturating_sub(2),
            size.height.saturating_sub(2),
        );

        // Leave the note at least 20 columns
        let sidebar_width = (inner_area.width * Self::SIDEBAR_PERCENT / 100)
            .max(Self::SIDEBAR_MIN)
            .min(inner_area.width.saturating_sub(20));

        let vertical = RatLayout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Min(1),    // Sidebar + note
                Constraint::Length(1), // Status
            ])
            .split(inner_area);

        let horizontal = RatLayout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Length(sidebar_width), Constraint::Min(1)])
            .split(vertical[0]);

        Self {
            inner_area,
            sidebar_area: horizontal[0],
            main_area: horizontal[1],
            status_area: vertical[1],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn areas_fit_inside_border() {
        let layout = Layout::calculate(Rect::new(0, 0, 120, 40));
        assert_eq!(layout.inner_area, Rect::new(1, 1, 118, 38));
        assert_eq!(layout.sidebar_area.width, 29);
        assert_eq!(layout.main_area.width, 118 - 29);
        assert_eq!(layout.status_area.height, 1);
        assert_eq!(layout.status_area.y, 38);
    }

    #[test]
    fn small_terminal_keeps_note_usable() {
        let layout = Layout::calculate(Rect::new(0, 0, 42, 10));
        assert_eq!(layout.sidebar_area.width, 20);
        assert!(layout.main_area.width >= 20);
    }
}
