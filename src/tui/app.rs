use anyhow::Result;
use chrono::{Datelike, NaiveDateTime};
use crossterm::event::{
    DisableMouseCapture, EnableMouseCapture, KeyCode, KeyEvent, KeyEventKind, MouseButton,
    MouseEvent, MouseEventKind,
};
use crossterm::execute;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::Modifier,
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Clear, Paragraph},
    DefaultTerminal, Frame,
};
use std::io::stdout;
use std::time::{Duration, Instant};

use crate::context::AppContext;
use crate::models::{DailyProgress, Task, TaskId, WeeklyDay};
use crate::timeline::dispatch::reader_request;
use crate::timeline::{
    baqarah_target_page, minute_of_day, ClickRecognizer, Clock, CompletionEffects, Dispatcher,
    Gesture, Outcome, Point, ReaderRequest, SwipeRule, SystemClock, Timeline,
};
use crate::tui::events::{Event, EventHandler};
use crate::tui::theme;
use crate::tui::widgets::{header, next_prayer, partner, statusbar, timeline as timeline_list};
use crate::utils::hijri::dual_date;

const BANNER_FOR: Duration = Duration::from_secs(3);
// Must stay well under the double-click window so single clicks resolve promptly.
const TICK_RATE: Duration = Duration::from_millis(100);

#[derive(Debug, Clone, PartialEq)]
pub enum View {
    Dashboard,
    Stats,
    Help,
}

/// Completion effects in the dashboard: a banner in the status bar.
#[derive(Debug, Default)]
pub struct Flash {
    pub banner: Option<String>,
    pub pulses: u32,
}

impl CompletionEffects for Flash {
    fn haptic(&mut self) {
        self.pulses += 1;
    }

    fn celebrate(&mut self, task: &Task) {
        self.banner = Some(format!("✦ {} complete ✦", task.title));
    }
}

/// Reader overlay for a Quran or athkar task.
#[derive(Debug, Clone, PartialEq)]
pub struct Reader {
    pub task: TaskId,
    pub request: ReaderRequest,
    pub input: String,
    pub error: Option<String>,
}

impl Reader {
    fn new(task: TaskId, request: ReaderRequest) -> Self {
        Self {
            task,
            request,
            input: String::new(),
            error: None,
        }
    }
}

pub struct App<'a> {
    ctx: &'a AppContext,
    pub view: View,
    pub timeline: Timeline,
    pub clicks: ClickRecognizer,
    pub swipe: SwipeRule,
    pub focus_idx: usize,
    pub should_quit: bool,
    pub reader: Option<Reader>,
    pub flash: Flash,
    banner_since: Option<Instant>,
    pub partner: Option<(String, DailyProgress)>,
    pub weekly: Vec<WeeklyDay>,
    pub now: NaiveDateTime,
    drag: Option<(TaskId, Point)>,
    timeline_area: Rect,
}

impl<'a> App<'a> {
    pub fn new(ctx: &'a AppContext, now: NaiveDateTime) -> Self {
        let settings = &ctx.config.timeline;
        let timeline = ctx.timeline(now.date());
        let focus_idx = timeline
            .day
            .catalog
            .iter()
            .rposition(|t| t.scheduled_minute <= minute_of_day(now.time()))
            .unwrap_or(0);

        let mut app = App {
            ctx,
            view: View::Dashboard,
            timeline,
            clicks: ClickRecognizer::new(settings.double_click_window()),
            swipe: SwipeRule {
                min_dx: settings.swipe_min_dx,
                max_dy: settings.swipe_max_dy,
            },
            focus_idx,
            should_quit: false,
            reader: None,
            flash: Flash::default(),
            banner_since: None,
            partner: None,
            weekly: Vec::new(),
            now,
            drag: None,
            timeline_area: Rect::default(),
        };
        app.refresh_stats();
        app
    }

    fn refresh_stats(&mut self) {
        let date = self.timeline.day.date;
        self.partner = self.ctx.partner_progress(date);
        self.weekly = self.ctx.weekly(self.ctx.user(), date).unwrap_or_else(|e| {
            log::warn!("weekly summary unavailable: {}", e);
            Vec::new()
        });
    }

    pub fn tick(&mut self, now: NaiveDateTime, instant: Instant) {
        self.now = now;

        for (id, gesture) in self.clicks.poll(instant) {
            self.dispatch(id, gesture, instant);
        }

        let outcome = self.timeline.tick(now, instant);
        if outcome.rebuilt {
            // Yesterday's reader and drag would write to the new day.
            self.focus_idx = 0;
            self.reader = None;
            self.drag = None;
        }
        if outcome.stats_due {
            self.refresh_stats();
        }

        if let Some(since) = self.banner_since {
            if instant.saturating_duration_since(since) >= BANNER_FOR {
                self.flash.banner = None;
                self.banner_since = None;
            }
        }
    }

    fn focused(&self) -> Option<TaskId> {
        self.timeline.day.catalog.get(self.focus_idx).map(|t| t.id)
    }

    fn show(&mut self, message: String, instant: Instant) {
        self.flash.banner = Some(message);
        self.banner_since = Some(instant);
    }

    fn dispatch(&mut self, id: TaskId, gesture: Gesture, instant: Instant) {
        let ctx = self.ctx;
        let outcome = Dispatcher::new(&ctx.reconciler, ctx.user(), &mut self.flash)
            .dispatch(&mut self.timeline.day, id, gesture);

        let title = self
            .timeline
            .day
            .task(id)
            .map(|t| t.title.clone())
            .unwrap_or_else(|| id.to_string());

        match outcome {
            Outcome::Changed { completed: true, .. } => self.banner_since = Some(instant),
            Outcome::Changed { completed: false, .. } => {
                self.show(format!("○ {} unmarked", title), instant);
            }
            Outcome::OpenReader(request) => self.reader = Some(Reader::new(id, request)),
            Outcome::Failed(_) => self.show(format!("✗ Could not save {}", title), instant),
            Outcome::Ignored => {}
        }
    }

    pub fn handle_key(&mut self, key: KeyEvent, instant: Instant) {
        // Only handle actual key presses — ignore release/repeat events from some terminals
        if key.kind != KeyEventKind::Press {
            return;
        }
        if self.reader.is_some() {
            self.handle_reader_key(key, instant);
            return;
        }
        match self.view {
            View::Dashboard => self.handle_dashboard_key(key, instant),
            View::Stats => {
                if matches!(key.code, KeyCode::Esc | KeyCode::Char('s')) {
                    self.view = View::Dashboard;
                }
            }
            View::Help => {
                if matches!(key.code, KeyCode::Esc | KeyCode::Char('?')) {
                    self.view = View::Dashboard;
                }
            }
        }
    }

    fn handle_dashboard_key(&mut self, key: KeyEvent, instant: Instant) {
        match key.code {
            KeyCode::Esc | KeyCode::Char('q') => {
                self.should_quit = true;
            }
            KeyCode::Char('?') => {
                self.view = View::Help;
            }
            KeyCode::Char('s') => {
                self.view = View::Stats;
            }
            KeyCode::Up | KeyCode::Char('k') => {
                self.focus_idx = self.focus_idx.saturating_sub(1);
            }
            KeyCode::Down | KeyCode::Char('j') => {
                let max = self.timeline.day.catalog.len().saturating_sub(1);
                if self.focus_idx < max {
                    self.focus_idx += 1;
                }
            }
            KeyCode::Enter | KeyCode::Char(' ') => {
                if let Some(id) = self.focused() {
                    for (task, gesture) in self.clicks.click(id, instant) {
                        self.dispatch(task, gesture, instant);
                    }
                }
            }
            KeyCode::Char('c') => {
                if let Some(id) = self.focused() {
                    self.dispatch(id, Gesture::SwipeLeft, instant);
                }
            }
            KeyCode::Char('r') => {
                if let Some(id) = self.focused() {
                    if let Some(request) = reader_request(&self.timeline.day, id) {
                        self.reader = Some(Reader::new(id, request));
                    }
                }
            }
            // Jump to whatever the header says is due now
            KeyCode::Char('o') => {
                let minute = minute_of_day(self.now.time());
                if let Some(id) = self.timeline.day.obligation(minute) {
                    if let Some(idx) = self.timeline.day.catalog.iter().position(|t| t.id == id) {
                        self.focus_idx = idx;
                    }
                    if let Some(request) = reader_request(&self.timeline.day, id) {
                        self.reader = Some(Reader::new(id, request));
                    }
                }
            }
            _ => {}
        }
    }

    fn handle_reader_key(&mut self, key: KeyEvent, instant: Instant) {
        let Some(reader) = self.reader.as_mut() else {
            return;
        };
        match key.code {
            KeyCode::Esc => {
                self.reader = None;
            }
            KeyCode::Enter => self.finish_reader(instant),
            KeyCode::Backspace => {
                reader.input.pop();
                reader.error = None;
            }
            KeyCode::Char(c) if c.is_ascii_digit() => {
                if matches!(reader.request, ReaderRequest::Quran { .. }) {
                    reader.input.push(c);
                    reader.error = None;
                }
            }
            _ => {}
        }
    }

    /// Report the reader's result through the reconciler.
    fn finish_reader(&mut self, instant: Instant) {
        let Some(mut reader) = self.reader.take() else {
            return;
        };

        // Finishing only ever completes; a reread of a done task leaves it as is.
        if self.timeline.day.is_completed(reader.task) {
            if let Some(task) = self.timeline.day.task(reader.task) {
                let message = format!("✓ {} already complete", task.title);
                self.show(message, instant);
            }
            return;
        }

        match reader.request {
            ReaderRequest::Athkar(_) => self.dispatch(reader.task, Gesture::SwipeLeft, instant),
            ReaderRequest::Quran { surah, page } => {
                let trimmed = reader.input.trim();
                let reached = if trimmed.is_empty() {
                    page.unwrap_or(1) as i32
                } else {
                    match trimmed.parse::<i32>() {
                        Ok(p) if p > 0 => p,
                        _ => {
                            reader.error = Some(format!("'{}' is not a page number", trimmed));
                            self.reader = Some(reader);
                            return;
                        }
                    }
                };

                let ctx = self.ctx;
                let date = self.timeline.day.date;
                if let Err(e) = ctx.reconciler.record_reading(ctx.user(), date, surah, reached, true) {
                    log::error!("could not save reading: {}", e);
                    self.show(format!("✗ Could not save {}", surah.display_name()), instant);
                    return;
                }

                self.timeline.day.reload(&ctx.reconciler, ctx.user());
                match self.timeline.day.task(reader.task).cloned() {
                    Some(task) if self.timeline.day.is_completed(task.id) => {
                        self.flash.haptic();
                        self.flash.celebrate(&task);
                        self.banner_since = Some(instant);
                    }
                    _ => {
                        let target = baqarah_target_page(date.weekday());
                        self.show(
                            format!("Saved page {}. Today's target is page {}", reached, target),
                            instant,
                        );
                    }
                }
            }
        }
    }

    pub fn handle_mouse(&mut self, mouse: MouseEvent, instant: Instant) {
        if self.reader.is_some() || self.view != View::Dashboard {
            return;
        }
        let settings = &self.ctx.config.timeline;
        let point = Point::new(
            mouse.column as f64 * settings.cell_width_px,
            mouse.row as f64 * settings.cell_height_px,
        );

        match mouse.kind {
            MouseEventKind::Down(MouseButton::Left) => {
                self.drag = self.task_at(mouse.column, mouse.row).map(|id| (id, point));
            }
            MouseEventKind::Up(MouseButton::Left) => {
                let Some((id, start)) = self.drag.take() else {
                    return;
                };
                if let Some(gesture) = self.swipe.detect(start, point) {
                    self.dispatch(id, gesture, instant);
                } else if (start.x - point.x).abs() < settings.cell_width_px
                    && (start.y - point.y).abs() < settings.cell_height_px
                {
                    if let Some(idx) = self.timeline.day.catalog.iter().position(|t| t.id == id) {
                        self.focus_idx = idx;
                    }
                    for (task, gesture) in self.clicks.click(id, instant) {
                        self.dispatch(task, gesture, instant);
                    }
                }
            }
            _ => {}
        }
    }

    fn task_at(&self, column: u16, row: u16) -> Option<TaskId> {
        let area = self.timeline_area;
        let inside = column > area.x
            && column < area.x + area.width.saturating_sub(1)
            && row > area.y
            && row < area.y + area.height.saturating_sub(1);
        if !inside {
            return None;
        }
        let idx = (row - area.y - 1) as usize;
        self.timeline.day.catalog.get(idx).map(|t| t.id)
    }

    pub fn draw(&mut self, frame: &mut Frame) {
        match self.view {
            View::Dashboard => self.draw_dashboard(frame),
            View::Stats => self.draw_stats(frame),
            View::Help => {
                self.draw_dashboard(frame);
                self.draw_help_overlay(frame);
            }
        }

        if let Some(reader) = &self.reader {
            self.draw_reader(frame, reader);
        }
    }

    fn draw_dashboard(&mut self, frame: &mut Frame) {
        let area = frame.area();
        frame.render_widget(Block::default().style(theme::base()), area);

        let outer_chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(5), // header
                Constraint::Min(0),    // body
                Constraint::Length(1), // status bar
            ])
            .split(area);

        let day = &self.timeline.day;
        let minute = minute_of_day(self.now.time());

        let date_line = self.date_line();
        let obligation = day
            .obligation(minute)
            .and_then(|id| day.task(id))
            .map(|t| t.title.as_str());
        header::render(frame, outer_chunks[0], &date_line, obligation, &day.progress());

        statusbar::render(frame, outer_chunks[2], self.flash.banner.as_deref());

        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
            .split(outer_chunks[1]);

        timeline_list::render(frame, columns[0], &self.timeline.now_view(self.now), self.focus_idx);

        let right_chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(7), // next prayer
                Constraint::Min(0),    // partner + week
            ])
            .split(columns[1]);

        let next = day
            .next_prayer(minute)
            .and_then(|(id, mins)| day.task(id).map(|t| (t.title.as_str(), mins)));
        next_prayer::render(frame, right_chunks[0], next);
        partner::render(frame, right_chunks[1], self.partner.as_ref(), &self.weekly);

        self.timeline_area = columns[0];
    }

    fn date_line(&self) -> String {
        let dates = dual_date(self.timeline.day.date, self.ctx.config.location.hijri_offset);
        match &self.ctx.config.user.display_name {
            Some(name) => format!("{}  ·  {}", name, dates),
            None => dates,
        }
    }

    fn draw_stats(&self, frame: &mut Frame) {
        let area = frame.area();
        frame.render_widget(Block::default().style(theme::base()), area);

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),
                Constraint::Min(0),
                Constraint::Length(1),
            ])
            .split(area);

        let title = Paragraph::new(Line::from(vec![
            Span::styled("  Stats  ", theme::gold().add_modifier(Modifier::BOLD)),
            Span::styled("  [Esc] back", theme::dim()),
        ]));
        frame.render_widget(title, chunks[0]);

        let progress = self.timeline.day.progress();
        let mut lines = vec![
            Line::from(""),
            Line::from(vec![
                Span::styled("  Prayers today:  ", theme::dim()),
                Span::styled(
                    format!("{}/{}", progress.prayers.done, progress.prayers.total),
                    theme::green().add_modifier(Modifier::BOLD),
                ),
            ]),
            Line::from(vec![
                Span::styled("  Athkar today:   ", theme::dim()),
                Span::styled(
                    format!("{}/{}", progress.athkar.done, progress.athkar.total),
                    theme::amber(),
                ),
            ]),
            Line::from(vec![
                Span::styled("  Quran today:    ", theme::dim()),
                Span::styled(
                    format!("{}/{}", progress.quran.done, progress.quran.total),
                    theme::amber(),
                ),
            ]),
            Line::from(""),
            Line::from(Span::styled("  Last 7 Days", theme::gold())),
            Line::from(""),
        ];

        for day in &self.weekly {
            let bar = match day.prayers_done {
                5 => Span::styled("  █████  ", theme::green()),
                4 => Span::styled("  ████░  ", theme::green()),
                3 => Span::styled("  ███░░  ", theme::amber()),
                2 => Span::styled("  ██░░░  ", theme::amber()),
                1 => Span::styled("  █░░░░  ", theme::dim()),
                _ => Span::styled("  ░░░░░  ", theme::dim()),
            };
            lines.push(Line::from(vec![
                bar,
                Span::styled(
                    format!(
                        "{}  prayers {}/5  athkar {}/2  pages {}",
                        day.date.format("%a %d %b"),
                        day.prayers_done,
                        day.athkar_done,
                        day.quran_pages
                    ),
                    theme::dim(),
                ),
            ]));
        }

        frame.render_widget(Paragraph::new(lines), chunks[1]);
    }

    fn draw_help_overlay(&self, frame: &mut Frame) {
        let area = frame.area();

        let popup_area = Rect {
            x: area.width / 4,
            y: area.height / 4,
            width: area.width / 2,
            height: area.height / 2,
        };

        frame.render_widget(Clear, popup_area);

        let bindings = [
            ("  [Enter]/click ", "Toggle; open reader for unread Quran/athkar"),
            ("  double        ", "Mark Quran/athkar done without reading"),
            ("  [c]/swipe ←   ", "Complete"),
            ("  [r]           ", "Open reader"),
            ("  [o]           ", "Jump to what's due now"),
            ("  [↑ ↓]         ", "Move focus"),
            ("  [s]           ", "Stats view"),
            ("  [?]           ", "Toggle help"),
            ("  [q]/[Esc]     ", "Quit"),
        ];

        let mut help_text = vec![
            Line::from(Span::styled(
                "  Keybindings",
                theme::gold().add_modifier(Modifier::BOLD),
            )),
            Line::from(""),
        ];
        for (key, what) in bindings {
            help_text.push(Line::from(vec![
                Span::styled(key, theme::gold()),
                Span::styled(what, theme::dim()),
            ]));
        }

        let block = Block::default()
            .title(Span::styled(" Help ", theme::gold()))
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(theme::gold())
            .style(theme::surface());

        frame.render_widget(Paragraph::new(help_text).block(block), popup_area);
    }

    fn draw_reader(&self, frame: &mut Frame, reader: &Reader) {
        let area = frame.area();
        let height = if reader.error.is_some() { 8 } else { 6 };

        let popup_area = Rect {
            x: area.width / 4,
            y: (area.height / 2).saturating_sub(3),
            width: area.width / 2,
            height: height.min(area.height),
        };

        frame.render_widget(Clear, popup_area);

        let (title, mut text) = match &reader.request {
            ReaderRequest::Quran { surah, page } => {
                let hint = match page {
                    Some(p) => format!("  Today's page: {}", p),
                    None => "  Read the whole surah".to_string(),
                };
                (
                    format!(" {} ", surah.display_name()),
                    vec![
                        Line::from(Span::styled(hint, theme::dim())),
                        Line::from(vec![
                            Span::styled("  Page reached: ", theme::dim()),
                            Span::styled(
                                reader.input.as_str(),
                                theme::gold().add_modifier(Modifier::BOLD),
                            ),
                            Span::styled("█", theme::amber()),
                        ]),
                    ],
                )
            }
            ReaderRequest::Athkar(kind) => (
                format!(" {} athkar ", if kind.as_str() == "morning" { "Morning" } else { "Evening" }),
                vec![
                    Line::from(""),
                    Line::from(Span::styled("  Recite, then mark as finished", theme::dim())),
                ],
            ),
        };

        text.insert(0, Line::from(""));
        text.push(Line::from(""));
        text.push(Line::from(Span::styled(
            "  [Enter] finished  ·  [Esc] close",
            theme::dim(),
        )));

        if let Some(err) = &reader.error {
            text.push(Line::from(""));
            text.push(Line::from(Span::styled(format!("  ✗ {}", err), theme::red())));
        }

        let border_style = if reader.error.is_some() {
            theme::red()
        } else {
            theme::amber()
        };

        let block = Block::default()
            .title(Span::styled(title, theme::gold()))
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(border_style)
            .style(theme::surface());

        frame.render_widget(Paragraph::new(text).block(block), popup_area);
    }
}

/// Run the TUI event loop.
pub fn run(ctx: &AppContext) -> Result<()> {
    let clock = SystemClock;
    let mut app = App::new(ctx, clock.now());

    let mut terminal = ratatui::init();
    execute!(stdout(), EnableMouseCapture)?;

    let result = event_loop(&mut terminal, &mut app, &clock);

    if let Err(e) = execute!(stdout(), DisableMouseCapture) {
        log::warn!("could not release mouse: {}", e);
    }
    ratatui::restore();
    result
}

fn event_loop(terminal: &mut DefaultTerminal, app: &mut App, clock: &dyn Clock) -> Result<()> {
    let events = EventHandler::new(TICK_RATE);

    loop {
        terminal.draw(|frame| app.draw(frame))?;

        match events.next()? {
            Event::Key(key) => app.handle_key(key, clock.instant()),
            Event::Mouse(mouse) => app.handle_mouse(mouse, clock.instant()),
            Event::Tick => app.tick(clock.now(), clock.instant()),
        }

        if app.should_quit {
            return Ok(());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;
    use crate::db::repository::CacheRepo;
    use crate::db::SqliteStore;
    use crate::models::{PrayerTimes, Surah};
    use crossterm::event::KeyModifiers;

    fn context() -> AppContext {
        let ctx = AppContext::new(AppConfig::default(), SqliteStore::open_in_memory().unwrap());
        CacheRepo::store_times(&ctx.store.conn(), at(0, 0).date(), &PrayerTimes::fallback()).unwrap();
        ctx
    }

    // Tuesday: Baqarah page 4
    fn at(h: u32, m: u32) -> NaiveDateTime {
        chrono::NaiveDate::from_ymd_opt(2024, 3, 12)
            .unwrap()
            .and_hms_opt(h, m, 0)
            .unwrap()
    }

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn mouse(kind: MouseEventKind, column: u16, row: u16) -> MouseEvent {
        MouseEvent {
            kind,
            column,
            row,
            modifiers: KeyModifiers::NONE,
        }
    }

    #[test]
    fn starts_focused_on_the_active_task() {
        let ctx = context();
        let app = App::new(&ctx, at(6, 30));
        assert_eq!(app.focused(), Some(TaskId::Baqarah));
    }

    #[test]
    fn two_quick_enters_complete_without_reader() {
        let ctx = context();
        let mut app = App::new(&ctx, at(6, 30));
        let t0 = Instant::now();
        app.handle_key(key(KeyCode::Enter), t0);
        app.handle_key(key(KeyCode::Enter), t0 + Duration::from_millis(120));

        assert!(app.reader.is_none());
        assert!(app.timeline.day.is_completed(TaskId::Baqarah));
        assert_eq!(app.flash.pulses, 1);
        assert!(app.flash.banner.as_deref().unwrap().contains("Surah Al-Baqarah"));
    }

    #[test]
    fn single_enter_opens_reader_once_the_window_passes() {
        let ctx = context();
        let mut app = App::new(&ctx, at(6, 30));
        let t0 = Instant::now();
        app.handle_key(key(KeyCode::Enter), t0);
        assert!(app.reader.is_none());

        app.tick(at(6, 30), t0 + Duration::from_millis(350));
        let reader = app.reader.clone().unwrap();
        assert_eq!(
            reader.request,
            ReaderRequest::Quran { surah: Surah::Baqarah, page: Some(4) }
        );

        // page 3 is short of today's target
        app.handle_key(key(KeyCode::Char('3')), t0 + Duration::from_millis(400));
        app.handle_key(key(KeyCode::Enter), t0 + Duration::from_millis(450));
        assert!(app.reader.is_none());
        assert!(!app.timeline.day.is_completed(TaskId::Baqarah));

        app.handle_key(key(KeyCode::Char('r')), t0 + Duration::from_millis(500));
        app.handle_key(key(KeyCode::Enter), t0 + Duration::from_millis(550));
        assert!(app.timeline.day.is_completed(TaskId::Baqarah));
    }

    #[test]
    fn athkar_reader_finishes_through_the_store() {
        let ctx = context();
        let mut app = App::new(&ctx, at(5, 50));
        assert_eq!(app.focused(), Some(TaskId::MorningAthkar));
        app.handle_key(key(KeyCode::Char('r')), Instant::now());
        assert_eq!(
            app.reader.as_ref().map(|r| r.request.clone()),
            Some(ReaderRequest::Athkar(crate::models::AthkarType::Morning))
        );
        app.handle_key(key(KeyCode::Enter), Instant::now());

        let snapshot = ctx.reconciler.snapshot("local", at(0, 0).date());
        assert!(snapshot.is_completed(TaskId::MorningAthkar));
    }

    #[test]
    fn complete_key_is_a_one_way_swipe() {
        let ctx = context();
        let mut app = App::new(&ctx, at(12, 40));
        assert_eq!(app.focused(), Some(TaskId::Dhuhr));
        app.handle_key(key(KeyCode::Char('c')), Instant::now());
        app.handle_key(key(KeyCode::Char('c')), Instant::now());
        assert!(app.timeline.day.is_completed(TaskId::Dhuhr));
        assert_eq!(app.flash.pulses, 1);
    }

    #[test]
    fn left_drag_across_a_row_is_a_swipe() {
        let ctx = context();
        let mut app = App::new(&ctx, at(6, 30));
        app.timeline_area = Rect::new(0, 5, 60, 12);
        let t0 = Instant::now();

        // row 6 is the first task; 20 cells at 8px is 160px leftwards
        app.handle_mouse(mouse(MouseEventKind::Down(MouseButton::Left), 30, 6), t0);
        app.handle_mouse(mouse(MouseEventKind::Up(MouseButton::Left), 10, 6), t0);
        assert!(app.timeline.day.is_completed(TaskId::Fajr));

        // a short drag is neither swipe nor click
        app.handle_mouse(mouse(MouseEventKind::Down(MouseButton::Left), 30, 8), t0);
        app.handle_mouse(mouse(MouseEventKind::Up(MouseButton::Left), 25, 8), t0);
        assert!(!app.timeline.day.is_completed(TaskId::Baqarah));
        assert!(!app.clicks.is_pending());
    }

    #[test]
    fn mouse_click_feeds_the_recognizer() {
        let ctx = context();
        let mut app = App::new(&ctx, at(6, 30));
        app.timeline_area = Rect::new(0, 5, 60, 12);
        let t0 = Instant::now();

        // row 9 is Dhuhr
        app.handle_mouse(mouse(MouseEventKind::Down(MouseButton::Left), 20, 9), t0);
        app.handle_mouse(mouse(MouseEventKind::Up(MouseButton::Left), 20, 9), t0);
        assert!(app.clicks.is_pending());
        assert_eq!(app.focused(), Some(TaskId::Dhuhr));

        app.tick(at(6, 30), t0 + Duration::from_millis(400));
        assert!(app.timeline.day.is_completed(TaskId::Dhuhr));
    }

    #[test]
    fn escape_quits_and_closes_overlays_first() {
        let ctx = context();
        let mut app = App::new(&ctx, at(6, 30));
        app.handle_key(key(KeyCode::Char('r')), Instant::now());
        app.handle_key(key(KeyCode::Esc), Instant::now());
        assert!(app.reader.is_none());
        assert!(!app.should_quit);
        app.handle_key(key(KeyCode::Esc), Instant::now());
        assert!(app.should_quit);
    }

    #[test]
    fn banner_expires() {
        let ctx = context();
        let mut app = App::new(&ctx, at(12, 40));
        let t0 = Instant::now();
        app.handle_key(key(KeyCode::Char('c')), t0);
        assert!(app.flash.banner.is_some());
        app.tick(at(12, 40), t0 + Duration::from_secs(1));
        assert!(app.flash.banner.is_some());
        app.tick(at(12, 41), t0 + Duration::from_secs(4));
        assert!(app.flash.banner.is_none());
    }

    #[test]
    fn finishing_the_reader_never_unmarks_athkar() {
        let ctx = context();
        let mut app = App::new(&ctx, at(5, 50));
        let t0 = Instant::now();
        app.handle_key(key(KeyCode::Char('c')), t0);
        assert!(app.timeline.day.is_completed(TaskId::MorningAthkar));

        app.handle_key(key(KeyCode::Char('r')), t0);
        assert!(app.reader.is_some());
        app.handle_key(key(KeyCode::Enter), t0);

        assert!(app.timeline.day.is_completed(TaskId::MorningAthkar));
        let snapshot = ctx.reconciler.snapshot("local", at(0, 0).date());
        assert!(snapshot.is_completed(TaskId::MorningAthkar));
        assert_eq!(app.flash.pulses, 1);
    }

    #[test]
    fn rereading_a_finished_surah_keeps_its_record() {
        use crate::models::FULLY_READ_PAGES;
        use crate::timeline::CompletionStore;

        let ctx = context();
        let mut app = App::new(&ctx, at(23, 59));
        app.focus_idx = app
            .timeline
            .day
            .catalog
            .iter()
            .position(|t| t.id == TaskId::Mulk)
            .unwrap();
        let t0 = Instant::now();
        app.handle_key(key(KeyCode::Char('c')), t0);

        app.handle_key(key(KeyCode::Char('r')), t0);
        app.handle_key(key(KeyCode::Char('1')), t0);
        app.handle_key(key(KeyCode::Enter), t0);

        assert!(app.timeline.day.is_completed(TaskId::Mulk));
        let stored = ctx.store.quran("local", at(0, 0).date()).unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].surah, Surah::Mulk);
        assert_eq!(stored[0].pages_read, FULLY_READ_PAGES);
        assert!(stored[0].completed);
    }

    #[test]
    fn rollover_closes_an_open_reader() {
        let ctx = context();
        let mut app = App::new(&ctx, at(23, 59));
        app.focus_idx = 8;
        app.handle_key(key(KeyCode::Char('r')), Instant::now());
        assert!(app.reader.is_some());

        let tomorrow = at(0, 1) + chrono::Duration::days(1);
        app.tick(tomorrow, Instant::now());
        assert_eq!(app.timeline.day.date, tomorrow.date());
        assert!(app.reader.is_none());
        assert_eq!(app.focus_idx, 0);
    }

    #[test]
    fn header_greets_by_display_name() {
        let mut config = AppConfig::default();
        config.user.display_name = Some("Amina".to_string());
        let ctx = AppContext::new(config, SqliteStore::open_in_memory().unwrap());
        let app = App::new(&ctx, at(6, 30));
        assert!(app.date_line().starts_with("Amina  ·  "));
        assert!(app.date_line().ends_with("Tue 12 Mar 2024"));

        let plain = context();
        assert_eq!(App::new(&plain, at(6, 30)).date_line(), dual_date(at(0, 0).date(), 0));
    }
}
