// Cruise Schedule
// Command line entry point

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use cruise_schedule::models::custom_event::{CustomEventDraft, CustomEventId};
use cruise_schedule::models::performance::PerformanceKey;
use cruise_schedule::services::app::{ScheduleApp, ViewMode};
use cruise_schedule::services::feed::feed_from_settings;
use cruise_schedule::services::itinerary::EntryId;
use cruise_schedule::services::settings::load_config;
use cruise_schedule::services::storage::{store_from_settings, PreferenceStore};
use cruise_schedule::ui::text::{render_itinerary, render_keys, render_timeline};

#[derive(Parser)]
#[command(name = "cruise-schedule", version, about = "Browse the cruise schedule and build your itinerary")]
struct Cli {
    /// Path to config.toml
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Show the venue/time grid
    Timeline {
        /// Include shows you have hidden
        #[arg(long)]
        show_hidden: bool,
    },
    /// Show favourites and personal events by day
    Itinerary,
    /// List performance identity keys
    Keys,
    /// Toggle a performance as favourite
    Favorite { key: String },
    /// Toggle a performance as hidden
    Hide { key: String },
    /// Remove a favourite
    Unfavorite { key: String },
    /// Add a personal event
    AddEvent {
        #[arg(long)]
        name: String,
        /// Cruise day, 1-4
        #[arg(long)]
        day: i64,
        /// Start time, HH:MM
        #[arg(long)]
        time: String,
        /// Length in minutes
        #[arg(long)]
        duration: i64,
        /// Hex colour, e.g. #ff8800
        #[arg(long)]
        color: Option<String>,
    },
    /// Remove a personal event by id
    RemoveEvent { id: String },
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    match run(Cli::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            log::error!("{:#}", err);
            eprintln!("error: {:#}", err);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    let config = load_config(cli.config.as_deref())?;
    let feed = feed_from_settings(&config.feed)?;
    let store = store_from_settings(&config.storage)?;

    let mut app = ScheduleApp::startup(&config, feed.as_ref(), store);
    for reason in app.degraded() {
        log::warn!("Running with fallback data ({})", reason);
    }

    let timezone = config.tz();
    match cli.command {
        Command::Timeline { show_hidden } => {
            app.switch_view(ViewMode::Timeline);
            app.set_show_hidden(show_hidden);
            print!("{}", render_timeline(&app.timeline(), app.venues(), timezone));
        }
        Command::Itinerary => {
            app.switch_view(ViewMode::Itinerary);
            print!("{}", render_itinerary(&app.itinerary(), timezone));
        }
        Command::Keys => print!("{}", render_keys(app.schedule())),
        Command::Favorite { key } => {
            let key = known_key(&app, key);
            let now = app.toggle_favorite(&key)?;
            println!("{} {}", if now { "Favorited" } else { "Unfavorited" }, key);
        }
        Command::Hide { key } => {
            let key = known_key(&app, key);
            let now = app.toggle_hidden(&key)?;
            println!("{} {}", if now { "Hid" } else { "Unhid" }, key);
        }
        Command::Unfavorite { key } => {
            let removed = app.remove_entry(&EntryId::Performance(PerformanceKey::from(key.clone())))?;
            println!("{}", if removed { format!("Removed {}", key) } else { format!("{} was not a favorite", key) });
        }
        Command::AddEvent {
            name,
            day,
            time,
            duration,
            color,
        } => {
            let mut draft = CustomEventDraft::new(name, day, time, duration);
            draft.color = color;
            let id = app.add_custom_event(draft)?;
            println!("Added {}", id.entry_key());
        }
        Command::RemoveEvent { id } => {
            let id: CustomEventId = id.parse().context("Event id must be a UUID")?;
            let removed = app.remove_entry(&EntryId::Custom(id))?;
            println!("{}", if removed { "Removed" } else { "No such event" });
        }
    }

    Ok(())
}

/// Warn (but carry on) when a key matches nothing in the current feed.
fn known_key<S: PreferenceStore>(app: &ScheduleApp<S>, key: String) -> PerformanceKey {
    let key = PerformanceKey::from(key);
    if !app.schedule().contains(&key) {
        log::warn!("{} does not match any performance in the current schedule", key);
    }
    key
}
