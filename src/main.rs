mod cli;
mod config;
mod context;
mod db;
mod models;
mod prayer_times;
mod timeline;
mod tui;
mod utils;

use anyhow::{Context, Result};
use chrono::Local;
use clap::Parser;

use cli::args::{Cli, Commands, SetupArgs};
use cli::handlers;
use config::AppConfig;
use context::AppContext;
use db::SqliteStore;

fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    let config = AppConfig::load().context("Loading config")?;

    // Ensure data directory exists and open DB
    AppConfig::ensure_data_dir()?;
    let db_path = AppConfig::db_path()?;
    let store = SqliteStore::open(&db_path)
        .with_context(|| format!("Opening database at {:?}", db_path))?;

    let mut ctx = AppContext::new(config, store);

    match cli.command {
        Some(Commands::Setup(args)) => {
            handlers::handle_setup(&mut ctx, &args)?;
        }

        // Explicit subcommands — check setup first
        Some(cmd) => {
            ensure_setup(&mut ctx)?;
            match cmd {
                Commands::Times => handlers::handle_times(&ctx)?,
                Commands::Timeline { at, json } => {
                    handlers::handle_timeline(&ctx, at.as_deref(), json)?;
                }
                Commands::Click { task } => handlers::handle_click(&ctx, &task, 1)?,
                Commands::DoubleClick { task } => handlers::handle_click(&ctx, &task, 2)?,
                Commands::Swipe { task, dx, dy } => handlers::handle_swipe(&ctx, &task, dx, dy)?,
                Commands::Read { surah, page, done } => {
                    handlers::handle_read(&ctx, &surah, page, done)?;
                }
                Commands::Stats => handlers::handle_stats(&ctx)?,
                Commands::Partner => handlers::handle_partner(&ctx)?,
                Commands::Setup(_) => unreachable!(),
            }
        }

        // No subcommand → launch TUI
        None => {
            ensure_setup(&mut ctx)?;
            // Ensure prayer times are cached for today+7 days
            let today = Local::now().date_naive();
            if let Err(e) = ctx.times_source().warm(today, 7) {
                log::warn!("could not precompute prayer times: {}", e);
            }
            tui::app::run(&ctx)?;
        }
    }

    Ok(())
}

/// First run writes the default settings so every command has a location.
fn ensure_setup(ctx: &mut AppContext) -> Result<()> {
    if !ctx.is_setup_done() {
        eprintln!("No configuration found. Writing defaults; run `nooruna setup` to change them.");
        eprintln!();
        handlers::handle_setup(ctx, &SetupArgs::default())?;
    }
    Ok(())
}
