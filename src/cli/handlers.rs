use anyhow::{anyhow, bail, Context, Result};
use chrono::{Datelike, Local, NaiveDate, NaiveDateTime};
use serde::Serialize;
use std::io::{self, Write};
use std::str::FromStr;
use std::time::{Duration, Instant};

use crate::cli::args::SetupArgs;
use crate::config::AppConfig;
use crate::context::AppContext;
use crate::models::{DailyProgress, Surah, Task, TaskId};
use crate::prayer_times::PrayerCalculator;
use crate::timeline::{
    baqarah_target_page, minute_of_day, ClickRecognizer, CompletionEffects, Dispatcher, Gesture,
    Outcome, Point, ReaderRequest, SwipeRule, TaskStatus, TaskView,
};
use crate::timeline::window::{format_minutes, to_minutes};
use crate::utils::format::{check_mark, format_countdown, progress_bar};
use crate::utils::hijri::dual_date;

// ─── ANSI helpers ────────────────────────────────────────────────────────────

macro_rules! println_colored {
    ($color:expr, $($arg:tt)*) => {{
        print!("{}", $color);
        print!($($arg)*);
        println!("\x1b[0m");
    }};
}

const GREEN: &str = "\x1b[32m";
const AMBER: &str = "\x1b[33m";
const RED: &str = "\x1b[31m";
const DIM: &str = "\x1b[2m";
const BOLD: &str = "\x1b[1m";
const GOLD: &str = "\x1b[38;2;196;160;68m";

// ─── Effects ─────────────────────────────────────────────────────────────────

/// Terminal bell for the haptic tick, a printed line for the celebration.
pub struct CliEffects;

impl CompletionEffects for CliEffects {
    fn haptic(&mut self) {
        print!("\x07");
        let _ = io::stdout().flush();
    }

    fn celebrate(&mut self, task: &Task) {
        println_colored!(GREEN, "  ✓ {} done", task.title);
    }
}

// ─── Setup ───────────────────────────────────────────────────────────────────

pub fn handle_setup(ctx: &mut AppContext, args: &SetupArgs) -> Result<()> {
    if !args.reset && args.is_empty() && ctx.is_setup_done() {
        println!("Nooruna is already configured. Pass options to change it, or --reset.");
        return Ok(());
    }

    let location_changed = apply_setup(&mut ctx.config, args)?;
    ctx.config.save().context("Saving config")?;
    if location_changed {
        ctx.times_source().invalidate()?;
    }
    ctx.mark_setup_done()?;

    let config = &ctx.config;
    println!();
    println_colored!(GOLD, "  Nooruna configured");
    println!();
    match &config.user.display_name {
        Some(name) => println!("  User:      {} ({})", name, config.user.id),
        None => println!("  User:      {}", config.user.id),
    }
    if let Some(partner) = &config.user.partner_id {
        println!("  Partner:   {}", partner);
    }
    println!(
        "  Location:  {:.4}, {:.4}  (UTC{})",
        config.location.latitude,
        config.location.longitude,
        format_tz_offset(config.location.timezone_offset)
    );
    println!("  Method:    {} / {}", config.location.calc_method, config.location.madhab);
    println!();
    Ok(())
}

/// Fold the given options into `config`. Returns whether the prayer times
/// need recomputing.
pub fn apply_setup(config: &mut AppConfig, args: &SetupArgs) -> Result<bool> {
    if args.reset {
        *config = AppConfig::default();
    }
    let before = config.location.clone();

    if let Some(user) = &args.user {
        let user = user.trim();
        if user.is_empty() {
            bail!("User id cannot be empty");
        }
        config.user.id = user.to_string();
    }
    if let Some(partner) = &args.partner {
        let partner = partner.trim();
        config.user.partner_id = (!partner.is_empty()).then(|| partner.to_string());
    }
    if config.user.partner_id.as_deref() == Some(config.user.id.as_str()) {
        bail!("Partner id must differ from your own");
    }
    if let Some(name) = &args.name {
        config.user.display_name = Some(name.trim().to_string());
    }

    if let (Some(lat), Some(lng)) = (args.lat, args.lng) {
        if !(-90.0..=90.0).contains(&lat) || !(-180.0..=180.0).contains(&lng) {
            bail!("Coordinates out of range: {}, {}", lat, lng);
        }
        config.location.latitude = lat;
        config.location.longitude = lng;
    }
    if let Some(method) = &args.method {
        config.location.calc_method = method.clone();
    }
    if let Some(madhab) = &args.madhab {
        config.location.madhab = madhab.clone();
    }
    if let Some(tz) = &args.tz {
        config.location.timezone_offset =
            parse_tz_offset(tz).with_context(|| format!("Invalid UTC offset '{}'", tz))?;
    }

    PrayerCalculator::from_config(&config.location)?;
    Ok(args.reset || config.location != before)
}

// ─── Times ───────────────────────────────────────────────────────────────────

pub fn handle_times(ctx: &AppContext) -> Result<()> {
    let now = Local::now().naive_local();
    let timeline = ctx.timeline(now.date());
    let day = &timeline.day;
    let now_min = minute_of_day(now.time());

    println!();
    println_colored!(
        GOLD,
        "  Prayer Times — {}",
        dual_date(day.date, ctx.config.location.hijri_offset)
    );
    println!();

    if !day.has_data() {
        println_colored!(RED, "  No prayer times available for today");
        println!();
        return Ok(());
    }

    for task in day.catalog.iter().filter(|t| t.storage_field.is_some()) {
        let mark = check_mark(day.is_completed(task.id));
        if task.scheduled_minute < now_min {
            println_colored!(DIM, "  {} {:<10}  {}", mark, task.title, task.display_time);
        } else {
            println_colored!(BOLD, "  {} {:<10}  {}", mark, task.title, task.display_time);
        }
    }

    println!();
    match day.next_prayer(now_min) {
        Some((id, mins)) => {
            let name = day.task(id).map(|t| t.title.as_str()).unwrap_or(id.as_str());
            println_colored!(AMBER, "  Next: {} in {}", name, format_countdown(mins));
        }
        None => println_colored!(DIM, "  No prayers left today"),
    }
    println!();
    Ok(())
}

// ─── Timeline ────────────────────────────────────────────────────────────────

#[derive(Serialize)]
struct TimelineReport<'a> {
    date: NaiveDate,
    now: String,
    obligation: Option<TaskId>,
    progress: &'a DailyProgress,
    percent: u8,
    tasks: Vec<TaskView>,
}

pub fn handle_timeline(ctx: &AppContext, at: Option<&str>, json: bool) -> Result<()> {
    let now = Local::now().naive_local();
    let now_min = match at {
        Some(at) => to_minutes(at).with_context(|| format!("--at expects HH:MM, got '{}'", at))?,
        None => minute_of_day(now.time()),
    };

    let timeline = ctx.timeline(now.date());
    let day = &timeline.day;
    if let Some(e) = &day.error {
        bail!("No timeline data for {}: {}", day.date, e);
    }

    let progress = day.progress();
    let tasks = day.view(now_min);

    if json {
        let report = TimelineReport {
            date: day.date,
            now: format_minutes(now_min),
            obligation: day.obligation(now_min),
            progress: &progress,
            percent: progress.percent(),
            tasks,
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!();
    println_colored!(
        GOLD,
        "  {}   now {}",
        dual_date(day.date, ctx.config.location.hijri_offset),
        format_minutes(now_min)
    );
    println!();
    for view in &tasks {
        println!("{}", timeline_row(view));
    }
    println!();
    if let Some(id) = day.obligation(now_min) {
        let title = day.task(id).map(|t| t.title.as_str()).unwrap_or(id.as_str());
        println_colored!(AMBER, "  Now: {}", title);
    }
    println!(
        "  Progress: {}  {}/{} ({}%)",
        progress_bar(progress.completed() as u32, progress.total() as u32, 18),
        progress.completed(),
        progress.total(),
        progress.percent()
    );
    println!();
    Ok(())
}

fn timeline_row(view: &TaskView) -> String {
    let color = match view.status {
        TaskStatus::Active => GOLD,
        TaskStatus::Missed if !view.completed => RED,
        TaskStatus::Past | TaskStatus::Missed => DIM,
        TaskStatus::Upcoming => "",
    };
    let status = match view.status {
        TaskStatus::Past => "past",
        TaskStatus::Missed => "missed",
        TaskStatus::Active => "now",
        TaskStatus::Upcoming => "",
    };
    format!(
        "{}  {}  {}  {:<22} {:<14} {}\x1b[0m",
        color,
        format_minutes(view.task.scheduled_minute),
        check_mark(view.completed),
        view.task.title,
        view.task.display_time,
        status
    )
}

// ─── Gestures ────────────────────────────────────────────────────────────────

pub fn handle_click(ctx: &AppContext, task: &str, clicks: usize) -> Result<()> {
    let id = parse_task(task)?;
    let gesture = recognize_clicks(id, clicks, ctx.config.timeline.double_click_window())
        .ok_or_else(|| anyhow!("Clicks on {} did not resolve to a gesture", id))?;
    dispatch(ctx, id, gesture)
}

pub fn handle_swipe(ctx: &AppContext, task: &str, dx: f64, dy: f64) -> Result<()> {
    let id = parse_task(task)?;
    let rule = SwipeRule {
        min_dx: ctx.config.timeline.swipe_min_dx,
        max_dy: ctx.config.timeline.swipe_max_dy,
    };
    match swipe_gesture(&rule, dx, dy) {
        Some(gesture) => dispatch(ctx, id, gesture),
        None => {
            println_colored!(
                DIM,
                "  Not a swipe (needs more than {}px left, under {}px vertical)",
                rule.min_dx,
                rule.max_dy
            );
            Ok(())
        }
    }
}

/// A drag by (`dx`, `dy`) pixels from the origin; negative `dx` is leftwards.
pub fn swipe_gesture(rule: &SwipeRule, dx: f64, dy: f64) -> Option<Gesture> {
    rule.detect(Point::new(0.0, 0.0), Point::new(dx, dy))
}

/// Feed `clicks` presses spaced well inside the double-click window, then
/// let the window run out.
pub fn recognize_clicks(id: TaskId, clicks: usize, window: Duration) -> Option<Gesture> {
    let mut recognizer = ClickRecognizer::new(window);
    let start = Instant::now();
    let spacing = window / 4;
    let mut resolved = Vec::new();
    for i in 0..clicks {
        resolved.extend(recognizer.click(id, start + spacing * i as u32));
    }
    resolved.extend(recognizer.poll(start + window * 2 + spacing * clicks as u32));
    resolved.into_iter().find(|(task, _)| *task == id).map(|(_, gesture)| gesture)
}

fn dispatch(ctx: &AppContext, id: TaskId, gesture: Gesture) -> Result<()> {
    let now = Local::now().naive_local();
    let mut timeline = ctx.timeline(now.date());
    if let Some(e) = &timeline.day.error {
        bail!("No timeline data for {}: {}", timeline.day.date, e);
    }

    let mut effects = CliEffects;
    let outcome = Dispatcher::new(&ctx.reconciler, ctx.user(), &mut effects)
        .dispatch(&mut timeline.day, id, gesture);
    report_outcome(&timeline.day.catalog, id, outcome, now)
}

fn report_outcome(catalog: &[Task], id: TaskId, outcome: Outcome, now: NaiveDateTime) -> Result<()> {
    let title = catalog
        .iter()
        .find(|t| t.id == id)
        .map(|t| t.title.clone())
        .unwrap_or_else(|| id.to_string());

    match outcome {
        Outcome::Changed { completed: true, .. } => {}
        Outcome::Changed { completed: false, .. } => {
            println_colored!(DIM, "  ○ {} unmarked", title);
        }
        Outcome::OpenReader(ReaderRequest::Quran { surah, page }) => {
            match page {
                Some(page) => println_colored!(AMBER, "  Open {} at page {}", surah.display_name(), page),
                None => println_colored!(AMBER, "  Open {}", surah.display_name()),
            }
            println_colored!(
                DIM,
                "  Report progress with: nooruna read {} <page> --done",
                surah.as_str()
            );
        }
        Outcome::OpenReader(ReaderRequest::Athkar(athkar)) => {
            println_colored!(AMBER, "  Open the {} athkar", athkar.as_str());
            println_colored!(DIM, "  When finished: nooruna double-click {}", id);
        }
        Outcome::Ignored => {
            println_colored!(DIM, "  Nothing to do for {} at {}", title, now.format("%H:%M"));
        }
        Outcome::Failed(_) => bail!("Could not save {}", title),
    }
    Ok(())
}

fn parse_task(s: &str) -> Result<TaskId> {
    TaskId::from_str(s).map_err(|_| {
        let ids: Vec<&str> = TaskId::all().iter().map(|t| t.as_str()).collect();
        anyhow!("Unknown task '{}'. Use one of: {}", s, ids.join(", "))
    })
}

// ─── Reading ─────────────────────────────────────────────────────────────────

pub fn handle_read(ctx: &AppContext, surah: &str, page: i32, done: bool) -> Result<()> {
    let surah = Surah::from_str(surah)
        .map_err(|_| anyhow!("Unknown surah '{}'. Use: baqarah, mulk, kahf", surah))?;
    if page < 0 {
        bail!("Page cannot be negative");
    }
    let today = Local::now().date_naive();
    ctx.reconciler
        .record_reading(ctx.user(), today, surah, page, done)
        .context("Saving reading progress")?;

    let counted = ctx
        .reconciler
        .snapshot(ctx.user(), today)
        .quran
        .iter()
        .any(|q| q.surah == surah && q.completed);

    if counted {
        println_colored!(GREEN, "  ✓ {} complete for today", surah.display_name());
    } else if done {
        let target = baqarah_target_page(today.weekday());
        println_colored!(AMBER, "  Saved page {}. Today's target is page {}", page, target);
    } else {
        println_colored!(DIM, "  Saved: {} page {}", surah.display_name(), page);
    }
    Ok(())
}

// ─── Stats ───────────────────────────────────────────────────────────────────

pub fn handle_stats(ctx: &AppContext) -> Result<()> {
    let today = Local::now().date_naive();
    let progress = ctx.reconciler.snapshot(ctx.user(), today).progress(today);

    println!();
    println_colored!(GOLD, "  Today");
    println!();
    print_progress(&progress);

    let week = ctx.weekly(ctx.user(), today)?;
    println!();
    println_colored!(GOLD, "  Last 7 days");
    println!();
    println_colored!(DIM, "  {:<12} {:<8} {:<8} {}", "date", "prayers", "athkar", "pages");
    for day in &week {
        let color = match day.prayers_done {
            5 => GREEN,
            1..=4 => AMBER,
            _ => DIM,
        };
        println_colored!(
            color,
            "  {:<12} {:<8} {:<8} {}",
            day.date.format("%a %d %b").to_string(),
            format!("{}/5", day.prayers_done),
            format!("{}/2", day.athkar_done),
            day.quran_pages
        );
    }
    println!();
    Ok(())
}

pub fn handle_partner(ctx: &AppContext) -> Result<()> {
    let today = Local::now().date_naive();
    println!();
    match ctx.partner_progress(today) {
        Some((partner, progress)) => {
            println_colored!(GOLD, "  {} today", partner);
            println!();
            print_progress(&progress);
        }
        None => {
            println_colored!(DIM, "  No partner configured. Use: nooruna setup --partner <id>");
        }
    }
    println!();
    Ok(())
}

fn print_progress(progress: &DailyProgress) {
    println!("  Prayers:  {}/{}", progress.prayers.done, progress.prayers.total);
    println!("  Athkar:   {}/{}", progress.athkar.done, progress.athkar.total);
    println!("  Quran:    {}/{}", progress.quran.done, progress.quran.total);
    println_colored!(
        BOLD,
        "  {}  {}%",
        progress_bar(progress.completed() as u32, progress.total() as u32, 20),
        progress.percent()
    );
}

// ─── Helpers ─────────────────────────────────────────────────────────────────

/// Parse a UTC offset string into total minutes.
/// Accepts: "5:30", "+5:30", "-5:30", "5", "+5", "5.5"
fn parse_tz_offset(s: &str) -> Result<i32> {
    let s = s.trim().trim_start_matches('+');
    let negative = s.starts_with('-');
    let s = s.trim_start_matches('-');
    let sign = if negative { -1 } else { 1 };

    let minutes = if s.contains(':') {
        let mut parts = s.splitn(2, ':');
        let hours: i32 = parts.next().unwrap_or("0").parse()?;
        let mins: i32 = parts.next().unwrap_or("0").parse()?;
        hours * 60 + mins
    } else if s.contains('.') {
        let hours: f64 = s.parse()?;
        (hours * 60.0).round() as i32
    } else {
        let hours: i32 = s.parse()?;
        hours * 60
    };

    Ok(sign * minutes)
}

/// Format total minutes as "+H:MM" string
fn format_tz_offset(minutes: i32) -> String {
    let sign = if minutes < 0 { "-" } else { "+" };
    let abs = minutes.abs();
    let h = abs / 60;
    let m = abs % 60;
    if m == 0 {
        format!("{}{}", sign, h)
    } else {
        format!("{}{}:{:02}", sign, h, m)
    }
}
