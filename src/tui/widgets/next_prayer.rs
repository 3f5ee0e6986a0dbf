use ratatui::{
    layout::{Alignment, Rect},
    style::Modifier,
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Paragraph},
    Frame,
};

use crate::tui::theme;
use crate::utils::format::format_countdown;

pub fn render(frame: &mut Frame, area: Rect, next_prayer: Option<(&str, u32)>) {
    let block = Block::default()
        .title(Span::styled(" Next Prayer ", theme::gold()))
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(theme::border())
        .style(theme::surface());

    let content: Vec<Line> = match next_prayer {
        None => vec![
            Line::from(""),
            Line::from(Span::styled("  None left today", theme::dim())),
        ],
        Some((name, mins)) => vec![
            Line::from(""),
            Line::from(Span::styled(
                format!("  {}", name.to_uppercase()),
                theme::gold().add_modifier(Modifier::BOLD),
            )),
            Line::from(""),
            Line::from(vec![
                Span::styled("  in  ", theme::dim()),
                Span::styled(
                    format_countdown(mins),
                    theme::amber().add_modifier(Modifier::BOLD),
                ),
            ]),
        ],
    };

    let paragraph = Paragraph::new(content)
        .block(block)
        .alignment(Alignment::Left);

    frame.render_widget(paragraph, area);
}
