//! Shared layout helpers for the main screen and popups

use ratatui::layout::{Constraint, Direction, Layout, Rect};

/// Rect covering the given percentages of `r`, centered
pub fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}

/// Rect of a fixed size, centered in `r` and clipped to it
pub fn centered_fixed(width: u16, height: u16, r: Rect) -> Rect {
    let width = width.min(r.width);
    let height = height.min(r.height);
    Rect {
        x: r.x + (r.width - width) / 2,
        y: r.y + (r.height - height) / 2,
        width,
        height,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_centered_fixed_is_clipped_and_centered() {
        let area = Rect::new(0, 0, 80, 24);
        let rect = centered_fixed(20, 6, area);
        assert_eq!(rect, Rect::new(30, 9, 20, 6));

        // Never larger than the surrounding area
        let rect = centered_fixed(200, 50, area);
        assert_eq!(rect, area);
    }
}
