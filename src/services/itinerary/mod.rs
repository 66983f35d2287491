//! Itinerary composition: favourites plus personal events, by day.

use std::collections::BTreeSet;
use std::fmt;

use chrono::{Duration, NaiveDate};

use super::schedule::PerformanceStore;
use crate::models::custom_event::{CustomEvent, CustomEventId};
use crate::models::performance::{Performance, PerformanceKey};

/// What an itinerary row points back to, for removal.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum EntryId {
    Performance(PerformanceKey),
    Custom(CustomEventId),
}

impl fmt::Display for EntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Performance(key) => write!(f, "{}", key),
            Self::Custom(id) => write!(f, "{}", id.entry_key()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItineraryEntry {
    pub id: EntryId,
    pub name: String,
    pub subtitle: Option<String>,
    pub location: String,
    pub day: u8,
    pub start: i64,
    pub end: i64,
    pub color: String,
}

impl ItineraryEntry {
    pub fn is_custom(&self) -> bool {
        matches!(self.id, EntryId::Custom(_))
    }
}

impl From<&Performance> for ItineraryEntry {
    fn from(performance: &Performance) -> Self {
        Self {
            id: EntryId::Performance(performance.key()),
            name: performance.name.clone(),
            subtitle: performance.subtitle.clone(),
            location: performance.location.clone(),
            day: performance.day,
            start: performance.start,
            end: performance.end,
            color: performance.color.clone(),
        }
    }
}

impl From<&CustomEvent> for ItineraryEntry {
    fn from(event: &CustomEvent) -> Self {
        Self {
            id: EntryId::Custom(event.id),
            name: event.name.clone(),
            subtitle: None,
            location: event.location.clone(),
            day: event.day,
            start: event.start,
            end: event.end,
            color: event.color.clone(),
        }
    }
}

/// Day header plus its entries in start order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DayGroup {
    pub day: u8,
    pub label: String,
    pub entries: Vec<ItineraryEntry>,
}

/// The composed agenda.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Itinerary {
    /// Nothing to show; renderers display a placeholder message
    Empty,
    /// Only days with at least one entry, in day order
    Days(Vec<DayGroup>),
}

impl Itinerary {
    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }

    /// All entries in display order
    pub fn entries(&self) -> impl Iterator<Item = &ItineraryEntry> {
        let groups: &[DayGroup] = match self {
            Self::Empty => &[],
            Self::Days(groups) => groups,
        };
        groups.iter().flat_map(|group| group.entries.iter())
    }
}

/// Maps cruise day numbers onto calendar dates for headers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DayCalendar {
    pub baseline: NaiveDate,
    pub days: u8,
}

impl DayCalendar {
    pub fn new(baseline: NaiveDate, days: u8) -> Self {
        Self { baseline, days }
    }

    pub fn date(&self, day: u8) -> NaiveDate {
        self.baseline + Duration::days(i64::from(day) - 1)
    }

    /// e.g. `Thursday, Jan 22`
    pub fn label(&self, day: u8) -> String {
        self.date(day).format("%A, %b %-d").to_string()
    }
}

/// Build the itinerary.
///
/// Favourites that no longer match a performance are skipped without
/// touching the stored set. Entries on days outside the calendar are
/// dropped. The sort is stable, so ties keep favourites before personal
/// events and each in their own order.
pub fn compose(
    favorites: &BTreeSet<PerformanceKey>,
    custom_events: &[CustomEvent],
    store: &PerformanceStore,
    calendar: &DayCalendar,
) -> Itinerary {
    let mut entries: Vec<ItineraryEntry> = favorites
        .iter()
        .filter_map(|key| {
            let found = store.get(key);
            if found.is_none() {
                log::trace!("Favorite {} has no matching performance", key);
            }
            found
        })
        .map(ItineraryEntry::from)
        .chain(custom_events.iter().map(ItineraryEntry::from))
        .filter(|entry| (1..=calendar.days).contains(&entry.day))
        .collect();

    if entries.is_empty() {
        return Itinerary::Empty;
    }

    entries.sort_by_key(|entry| (entry.day, entry.start));

    let mut buckets: Vec<Vec<ItineraryEntry>> = vec![Vec::new(); usize::from(calendar.days)];
    for entry in entries {
        buckets[usize::from(entry.day) - 1].push(entry);
    }

    let groups = buckets
        .into_iter()
        .zip(1..=calendar.days)
        .filter(|(entries, _)| !entries.is_empty())
        .map(|(entries, day)| DayGroup {
            day,
            label: calendar.label(day),
            entries,
        })
        .collect();

    Itinerary::Days(groups)
}
