use ratatui::{
    layout::Rect,
    style::Modifier,
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Paragraph},
    Frame,
};

use crate::models::{DailyProgress, WeeklyDay};
use crate::tui::theme;
use crate::utils::format::progress_bar;

/// Partner's progress today above your own last seven days.
pub fn render(
    frame: &mut Frame,
    area: Rect,
    partner: Option<&(String, DailyProgress)>,
    weekly: &[WeeklyDay],
) {
    let block = Block::default()
        .title(Span::styled(" Partner ", theme::gold()))
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(theme::border())
        .style(theme::surface());

    let mut text = vec![Line::from("")];

    match partner {
        Some((name, progress)) => {
            text.push(Line::from(Span::styled(
                format!("  {}", name),
                theme::bold(),
            )));
            text.push(Line::from(vec![
                Span::styled("  ", theme::dim()),
                Span::styled(
                    progress_bar(progress.completed() as u32, progress.total() as u32, 12),
                    theme::green(),
                ),
                Span::styled(
                    format!("  {}%", progress.percent()),
                    theme::green().add_modifier(Modifier::BOLD),
                ),
            ]));
            text.push(Line::from(Span::styled(
                format!(
                    "  prayers {}/{}  athkar {}/{}  quran {}/{}",
                    progress.prayers.done,
                    progress.prayers.total,
                    progress.athkar.done,
                    progress.athkar.total,
                    progress.quran.done,
                    progress.quran.total
                ),
                theme::dim(),
            )));
        }
        None => {
            text.push(Line::from(Span::styled(
                "  No partner set (nooruna setup --partner <id>)",
                theme::dim(),
            )));
        }
    }

    // Your week, one dot per day, oldest first
    let mut dot_spans = vec![Span::styled("  ", theme::dim())];
    for day in weekly {
        let (dot, style) = match day.prayers_done {
            5 => ("●", theme::green().add_modifier(Modifier::BOLD)),
            3 | 4 => ("●", theme::amber()),
            1 | 2 => ("◑", theme::amber()),
            _ => ("○", theme::dim()),
        };
        dot_spans.push(Span::styled(dot, style));
        dot_spans.push(Span::styled("  ", theme::dim()));
    }
    let full_days = weekly.iter().filter(|d| d.prayers_done >= 5).count();

    text.push(Line::from(""));
    text.push(Line::from(Span::styled("  Your week", theme::gold())));
    text.push(Line::from(dot_spans));
    text.push(Line::from(Span::styled(
        format!("  All five prayers: {}/7 days", full_days),
        theme::dim(),
    )));

    let paragraph = Paragraph::new(text).block(block);
    frame.render_widget(paragraph, area);
}
