//! Application state and view controller.
//!
//! Holds the schedule and the preference state, and hands out the two
//! read-only projections (timeline grid, itinerary). Renderers never
//! mutate collections directly; every change goes through the methods
//! here, which forward to [`PreferenceState`].

use std::fmt;
use std::str::FromStr;

use anyhow::Result;

use super::feed::{load_schedule, FeedSource};
use super::grid::{GridLayout, GridParams, GridRow, RenderMarks};
use super::itinerary::{compose, DayCalendar, EntryId, Itinerary};
use super::preferences::{AddEventError, EventAnchor, PreferenceState};
use super::schedule::PerformanceStore;
use super::storage::PreferenceStore;
use super::LoadOutcome;
use crate::models::custom_event::{CustomEventDraft, CustomEventId};
use crate::models::performance::PerformanceKey;
use crate::models::settings::ScheduleConfig;

/// Which projection is active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ViewMode {
    #[default]
    Timeline,
    Itinerary,
}

impl fmt::Display for ViewMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Timeline => f.write_str("timeline"),
            Self::Itinerary => f.write_str("itinerary"),
        }
    }
}

impl FromStr for ViewMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "timeline" => Ok(Self::Timeline),
            "itinerary" => Ok(Self::Itinerary),
            other => Err(format!("Unknown view '{}'", other)),
        }
    }
}

pub struct ScheduleApp<S: PreferenceStore> {
    schedule: PerformanceStore,
    prefs: PreferenceState<S>,
    params: GridParams,
    venues: Vec<String>,
    calendar: DayCalendar,
    anchor: EventAnchor,
    view: ViewMode,
    show_hidden: bool,
    degraded: Vec<String>,
}

impl<S: PreferenceStore> ScheduleApp<S> {
    /// Load the feed and the stored preferences, degrading on failure.
    pub fn startup(config: &ScheduleConfig, feed: &dyn FeedSource, store: S) -> Self {
        let schedule = load_schedule(feed);
        let prefs = PreferenceState::load(store);
        Self::from_outcomes(config, schedule, prefs)
    }

    pub fn from_outcomes(
        config: &ScheduleConfig,
        schedule: LoadOutcome<PerformanceStore>,
        prefs: LoadOutcome<PreferenceState<S>>,
    ) -> Self {
        let mut degraded = Vec::new();
        if let Some(reason) = schedule.reason() {
            degraded.push(format!("schedule: {}", reason));
        }
        if let Some(reason) = prefs.reason() {
            degraded.push(format!("preferences: {}", reason));
        }

        let schedule = schedule.into_inner();
        let venues = if config.venues.is_empty() {
            schedule.venues()
        } else {
            config.venues.clone()
        };

        log::info!(
            "Schedule ready: {} performances across {} venues",
            schedule.len(),
            venues.len()
        );

        Self {
            schedule,
            prefs: prefs.into_inner(),
            params: GridParams::from_config(config),
            venues,
            calendar: DayCalendar::new(config.baseline_date, config.grid.days),
            anchor: EventAnchor {
                baseline: config.baseline_date,
                timezone: config.tz(),
                default_color: config.default_color.clone(),
            },
            view: ViewMode::default(),
            show_hidden: false,
            degraded,
        }
    }

    /// Reasons the app is running on fallback data, if any.
    pub fn degraded(&self) -> &[String] {
        &self.degraded
    }

    pub fn schedule(&self) -> &PerformanceStore {
        &self.schedule
    }

    pub fn preferences(&self) -> &PreferenceState<S> {
        &self.prefs
    }

    pub fn venues(&self) -> &[String] {
        &self.venues
    }

    pub fn params(&self) -> &GridParams {
        &self.params
    }

    pub fn calendar(&self) -> &DayCalendar {
        &self.calendar
    }

    pub fn view(&self) -> ViewMode {
        self.view
    }

    pub fn switch_view(&mut self, view: ViewMode) {
        log::debug!("Switching view to {}", view);
        self.view = view;
    }

    pub fn show_hidden(&self) -> bool {
        self.show_hidden
    }

    pub fn set_show_hidden(&mut self, show: bool) {
        self.show_hidden = show;
    }

    pub fn layout(&self) -> GridLayout<'_> {
        GridLayout::place(self.schedule.performances(), &self.venues, self.params)
    }

    /// Timeline rows with the current favourite/hidden marks applied.
    pub fn timeline(&self) -> Vec<GridRow<'_>> {
        let marks = RenderMarks {
            favorites: self.prefs.favorites(),
            hidden: self.prefs.hidden(),
            show_hidden: self.show_hidden,
        };
        self.layout().rows(&marks)
    }

    pub fn itinerary(&self) -> Itinerary {
        compose(
            self.prefs.favorites(),
            self.prefs.custom_events(),
            &self.schedule,
            &self.calendar,
        )
    }

    /// Click on a card.
    pub fn toggle_favorite(&mut self, key: &PerformanceKey) -> Result<bool> {
        self.prefs.toggle_favorite(key)
    }

    /// Right-click or long-press on a card.
    pub fn toggle_hidden(&mut self, key: &PerformanceKey) -> Result<bool> {
        self.prefs.toggle_hidden(key)
    }

    pub fn add_custom_event(&mut self, draft: CustomEventDraft) -> Result<CustomEventId, AddEventError> {
        self.prefs.add_custom_event(draft, &self.anchor)
    }

    /// Remove button on an itinerary row.
    pub fn remove_entry(&mut self, id: &EntryId) -> Result<bool> {
        match id {
            EntryId::Performance(key) => self.prefs.remove_favorite(key),
            EntryId::Custom(custom_id) => self.prefs.remove_custom_event(*custom_id),
        }
    }
}
