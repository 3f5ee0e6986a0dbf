use ratatui::{
    layout::{Alignment, Rect},
    style::Modifier,
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

use crate::tui::theme;

/// Key hints, or the banner while one is showing.
pub fn render(frame: &mut Frame, area: Rect, banner: Option<&str>) {
    let line = match banner {
        Some(message) => Line::from(Span::styled(
            message,
            theme::green().add_modifier(Modifier::BOLD),
        )),
        None => {
            let hints = [
                ("[Enter]", " click  "),
                ("[c]", " complete  "),
                ("[r]", " read  "),
                ("[s]", " stats  "),
                ("[?]", " help  "),
                ("[q]", " quit"),
            ];
            let mut spans = Vec::new();
            for (key, label) in &hints {
                spans.push(Span::styled(*key, theme::gold()));
                spans.push(Span::styled(*label, theme::dim()));
            }
            Line::from(spans)
        }
    };

    let paragraph = Paragraph::new(line).alignment(Alignment::Center);
    frame.render_widget(paragraph, area);
}
