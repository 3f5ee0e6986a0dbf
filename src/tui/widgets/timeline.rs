use ratatui::{
    layout::Rect,
    style::Modifier,
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, List, ListItem},
    Frame,
};

use crate::timeline::window::format_minutes;
use crate::timeline::TaskView;
use crate::tui::theme;

pub fn render(frame: &mut Frame, area: Rect, tasks: &[TaskView], focused_idx: usize) {
    let block = Block::default()
        .title(Span::styled(" Today ", theme::gold()))
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(theme::gold())
        .style(theme::surface());

    if tasks.is_empty() {
        let empty = List::new(vec![ListItem::new(Line::from(Span::styled(
            "  No timeline data",
            theme::red(),
        )))])
        .block(block);
        frame.render_widget(empty, area);
        return;
    }

    let items: Vec<ListItem> = tasks
        .iter()
        .enumerate()
        .map(|(i, view)| {
            let is_focused = i == focused_idx;

            let (icon, icon_style) = theme::marker(view.completed, view.status);
            let (label, row_style) = theme::status(view.status);

            let name_style = if is_focused {
                row_style.add_modifier(Modifier::REVERSED)
            } else {
                row_style
            };

            let line = Line::from(vec![
                Span::styled(if is_focused { " ▸" } else { "  " }, theme::gold()),
                Span::styled(
                    format!("{:<7}", format_minutes(view.task.scheduled_minute)),
                    theme::dim(),
                ),
                Span::styled(icon, icon_style),
                Span::styled(format!(" {:<20}", view.task.title), name_style),
                Span::styled(format!("{:<15}", view.task.display_time), theme::dim()),
                Span::styled(label, row_style),
            ]);

            ListItem::new(line)
        })
        .collect();

    let list = List::new(items).block(block);
    frame.render_widget(list, area);
}
