use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::text::{Line, Span};
use ratatui::widgets::Clear;

use crate::theme;
use crate::ui::text::{key_hint_height, key_hint_paragraph, wrapped_paragraph};

pub(crate) fn render_error_modal(frame: &mut Frame<'_>, message: &str, key_hint: &str) {
    let area = centered_rect(80, 60, frame.area());
    let footer_height = key_hint_height(area.width, key_hint);
    let [body, footer] = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(3), Constraint::Length(footer_height)])
        .areas(area);

    let title = Line::from(Span::styled("Error", theme::error_prompt()));
    frame.render_widget(Clear, area);
    frame.render_widget(
        wrapped_paragraph(message.to_string()).block(theme::chrome(title)),
        body,
    );
    frame.render_widget(key_hint_paragraph(key_hint).block(theme::key_block()), footer);
}

pub(crate) fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let pct_x = percent_x.min(100);
    let pct_y = percent_y.min(100);

    let [_, vertical, _] = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - pct_y) / 2),
            Constraint::Percentage(pct_y),
            Constraint::Percentage((100 - pct_y) / 2),
        ])
        .areas(area);
    let [_, horizontal, _] = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - pct_x) / 2),
            Constraint::Percentage(pct_x),
            Constraint::Percentage((100 - pct_x) / 2),
        ])
        .areas(vertical);
    horizontal
}

#[cfg(test)]
mod tests {
    use ratatui::layout::Rect;

    use super::centered_rect;

    #[test]
    fn centered_rect_returns_middle_segment() {
        let centered = centered_rect(80, 60, Rect::new(0, 0, 100, 50));
        assert_eq!(centered, Rect::new(10, 10, 80, 30));
    }

    #[test]
    fn centered_rect_clamps_percentages_over_100() {
        let area = Rect::new(3, 4, 40, 20);
        assert_eq!(centered_rect(120, 150, area), area);
    }
}
