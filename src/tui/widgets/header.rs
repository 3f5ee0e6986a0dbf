use ratatui::{
    layout::{Alignment, Rect},
    style::Modifier,
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Paragraph},
    Frame,
};

use crate::models::DailyProgress;
use crate::tui::theme;
use crate::utils::format::progress_bar;

pub fn render(
    frame: &mut Frame,
    area: Rect,
    date_line: &str,
    obligation: Option<&str>,
    progress: &DailyProgress,
) {
    let title_line = Line::from(vec![
        Span::styled("  نورنا  ", theme::gold().add_modifier(Modifier::BOLD)),
        Span::styled("nooruna", theme::gold()),
        Span::styled("  ·  ", theme::dim()),
        Span::styled(date_line, theme::amber()),
    ]);

    let now_line = match obligation {
        Some(title) => Line::from(vec![
            Span::styled("Now: ", theme::dim()),
            Span::styled(title, theme::gold().add_modifier(Modifier::BOLD)),
        ]),
        None => Line::from(Span::styled("Nothing pressing right now", theme::dim())),
    };

    let progress_line = Line::from(vec![
        Span::styled(
            progress_bar(progress.completed() as u32, progress.total() as u32, 20),
            theme::green(),
        ),
        Span::styled(
            format!("  {}/{}  {}%", progress.completed(), progress.total(), progress.percent()),
            theme::bold(),
        ),
    ]);

    let text = vec![title_line, now_line, progress_line];

    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(theme::gold().add_modifier(Modifier::BOLD))
        .style(theme::base());

    let paragraph = Paragraph::new(text)
        .block(block)
        .alignment(Alignment::Center);

    frame.render_widget(paragraph, area);
}
