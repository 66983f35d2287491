//! Timeline grid placement.
//!
//! Maps performances onto a (cruise-day × slot × venue) grid. A cruise day
//! starts at `day_start_hour` and runs through the following morning, so
//! a 01:00 show on day 2 sits at the bottom of day 2's column rather than
//! at the top of day 3.
//!
//! Every covered `(slot, venue)` cell records its occupants in insertion
//! order. Rendering walks slots top to bottom and venues left to right;
//! only the first occupant of a cell is ever shown there, and a
//! performance's content appears once, at its start slot.

use std::collections::{BTreeMap, BTreeSet};

use chrono::NaiveTime;
use chrono_tz::Tz;

use crate::models::performance::{Performance, PerformanceKey};
use crate::models::settings::ScheduleConfig;
use crate::utils::time::hour_minute;

const MINUTES_PER_DAY: u32 = 24 * 60;

/// Shape of the grid and the zone used to read wall-clock hours.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridParams {
    pub slot_minutes: u32,
    pub day_start_hour: u32,
    pub slots_per_day: u32,
    pub total_slots: u32,
    pub timezone: Tz,
}

impl Default for GridParams {
    fn default() -> Self {
        Self::new(30, 12, 3.5, Tz::UTC)
    }
}

impl GridParams {
    /// `slot_minutes` is snapped down to the nearest divisor of 60 so that
    /// slots line up with the hour.
    pub fn new(slot_minutes: u32, day_start_hour: u32, total_days: f64, timezone: Tz) -> Self {
        let slot_minutes = snap_slot_minutes(slot_minutes);
        let slots_per_day = MINUTES_PER_DAY / slot_minutes;
        let total_slots = (total_days * f64::from(slots_per_day)).ceil().max(0.0) as u32;
        Self {
            slot_minutes,
            day_start_hour: day_start_hour % 24,
            slots_per_day,
            total_slots,
            timezone,
        }
    }

    pub fn from_config(config: &ScheduleConfig) -> Self {
        Self::new(
            config.grid.slot_minutes,
            config.grid.day_start_hour,
            config.grid.total_days,
            config.tz(),
        )
    }

    pub fn total_slots(&self) -> u32 {
        self.total_slots
    }

    fn slots_per_hour(&self) -> u32 {
        (60 / self.slot_minutes).max(1)
    }

    fn slot_seconds(&self) -> i64 {
        i64::from(self.slot_minutes) * 60
    }

    /// Slot offset of a wall-clock time within its cruise day.
    ///
    /// Hours from `day_start_hour` onward count up from zero; earlier
    /// hours continue after midnight of the same cruise day.
    pub fn slot_offset(&self, hour: u32, minute: u32) -> u32 {
        let per_hour = self.slots_per_hour();
        let hour_offset = if hour >= self.day_start_hour {
            (hour - self.day_start_hour) * per_hour
        } else {
            (24 - self.day_start_hour) * per_hour + hour * per_hour
        };
        hour_offset + minute / self.slot_minutes
    }

    /// Absolute start slot of a performance, or `None` if its start
    /// cannot be placed (day before 1, unrepresentable timestamp).
    pub fn start_slot(&self, performance: &Performance) -> Option<i64> {
        if performance.day == 0 {
            return None;
        }
        let (hour, minute) = hour_minute(performance.start, self.timezone)?;
        let day_base = (i64::from(performance.day) - 1) * i64::from(self.slots_per_day);
        Some(day_base + i64::from(self.slot_offset(hour, minute)))
    }

    /// Number of slots a performance spans; never less than one.
    pub fn span_len(&self, performance: &Performance) -> u32 {
        let duration = performance.duration_seconds();
        if duration <= 0 {
            return 1;
        }
        let slot_seconds = self.slot_seconds();
        let slots = duration / slot_seconds + i64::from(duration % slot_seconds != 0);
        slots.clamp(1, i64::from(u32::MAX)) as u32
    }

    /// Cruise day (1-based) and wall-clock start time of a slot row.
    pub fn slot_label(&self, slot: u32) -> (u8, NaiveTime) {
        let day = (slot / self.slots_per_day + 1).min(u32::from(u8::MAX)) as u8;
        let within = slot % self.slots_per_day;
        let minutes = (self.day_start_hour * 60 + within * self.slot_minutes) % MINUTES_PER_DAY;
        let time = NaiveTime::from_hms_opt(minutes / 60, minutes % 60, 0).unwrap_or_default();
        (day, time)
    }
}

fn snap_slot_minutes(requested: u32) -> u32 {
    let snapped = (1..=requested.clamp(1, 60))
        .rev()
        .find(|minutes| 60 % minutes == 0)
        .unwrap_or(1);
    if snapped != requested {
        log::warn!("slot_minutes {} does not divide an hour, using {}", requested, snapped);
    }
    snapped
}

/// Where one performance landed.
#[derive(Debug, Clone, PartialEq)]
pub struct Placement<'a> {
    pub performance: &'a Performance,
    pub key: PerformanceKey,
    pub venue_index: usize,
    pub start_slot: u32,
    /// Computed span, before clipping at the grid edge
    pub span: u32,
}

/// Per-render flags taken from the preference state.
#[derive(Debug, Clone, Copy)]
pub struct RenderMarks<'s> {
    pub favorites: &'s BTreeSet<PerformanceKey>,
    pub hidden: &'s BTreeSet<PerformanceKey>,
    pub show_hidden: bool,
}

/// One rendered cell.
#[derive(Debug, Clone, PartialEq)]
pub enum GridCell<'a> {
    Empty,
    /// Content cell at the performance's start slot
    Start {
        performance: &'a Performance,
        key: PerformanceKey,
        row_span: u32,
        favorite: bool,
        hidden: bool,
    },
    /// Space reserved by a span started further up
    Continuation { key: PerformanceKey },
}

/// One slot row across all venues.
#[derive(Debug, Clone, PartialEq)]
pub struct GridRow<'a> {
    pub slot: u32,
    pub day: u8,
    pub time: NaiveTime,
    pub cells: Vec<GridCell<'a>>,
}

/// Sparse occupancy map built from a schedule.
#[derive(Debug, Clone)]
pub struct GridLayout<'a> {
    params: GridParams,
    venues: Vec<String>,
    placements: Vec<Placement<'a>>,
    occupancy: BTreeMap<(u32, usize), Vec<usize>>,
}

impl<'a> GridLayout<'a> {
    /// Place every performance whose venue is one of `venues`.
    ///
    /// Unknown venues and starts outside the grid are skipped silently.
    pub fn place(performances: &'a [Performance], venues: &[String], params: GridParams) -> Self {
        let mut placements = Vec::new();
        let mut occupancy: BTreeMap<(u32, usize), Vec<usize>> = BTreeMap::new();
        let mut skipped = 0usize;

        for performance in performances {
            let Some(venue_index) = venues.iter().position(|v| v == &performance.location) else {
                skipped += 1;
                continue;
            };
            let Some(start_slot) = params
                .start_slot(performance)
                .filter(|slot| (0..i64::from(params.total_slots)).contains(slot))
                .map(|slot| slot as u32)
            else {
                skipped += 1;
                continue;
            };
            let span = params.span_len(performance);

            let index = placements.len();
            let end_slot = start_slot.saturating_add(span).min(params.total_slots);
            for slot in start_slot..end_slot {
                occupancy.entry((slot, venue_index)).or_default().push(index);
            }

            placements.push(Placement {
                performance,
                key: performance.key(),
                venue_index,
                start_slot,
                span,
            });
        }

        if skipped > 0 {
            log::debug!("{} performances not placed on the grid", skipped);
        }

        Self {
            params,
            venues: venues.to_vec(),
            placements,
            occupancy,
        }
    }

    pub fn params(&self) -> &GridParams {
        &self.params
    }

    pub fn venues(&self) -> &[String] {
        &self.venues
    }

    pub fn placements(&self) -> &[Placement<'a>] {
        &self.placements
    }

    /// All occupants of a cell, in insertion order.
    pub fn occupants(&self, slot: u32, venue_index: usize) -> impl Iterator<Item = &Placement<'a>> {
        self.occupancy
            .get(&(slot, venue_index))
            .into_iter()
            .flatten()
            .map(move |&index| &self.placements[index])
    }

    /// The occupant a renderer shows at this cell (first inserted wins).
    pub fn occupant(&self, slot: u32, venue_index: usize) -> Option<&Placement<'a>> {
        self.occupants(slot, venue_index).next()
    }

    /// Cells that hold more than one performance.
    pub fn conflicts(&self) -> Vec<(u32, usize)> {
        self.occupancy
            .iter()
            .filter(|(_, occupants)| occupants.len() > 1)
            .map(|(&cell, _)| cell)
            .collect()
    }

    /// Resolve a single cell for rendering.
    pub fn cell(&self, slot: u32, venue_index: usize, marks: &RenderMarks<'_>) -> GridCell<'a> {
        let Some(placement) = self.occupant(slot, venue_index) else {
            return GridCell::Empty;
        };

        let hidden = marks.hidden.contains(&placement.key);
        if hidden && !marks.show_hidden {
            return GridCell::Empty;
        }

        if placement.start_slot != slot {
            return GridCell::Continuation {
                key: placement.key.clone(),
            };
        }

        GridCell::Start {
            performance: placement.performance,
            key: placement.key.clone(),
            row_span: placement.span,
            favorite: marks.favorites.contains(&placement.key),
            hidden,
        }
    }

    /// Every slot row from 0 to `total_slots`, venues in column order.
    pub fn rows(&self, marks: &RenderMarks<'_>) -> Vec<GridRow<'a>> {
        (0..self.params.total_slots)
            .map(|slot| {
                let (day, time) = self.params.slot_label(slot);
                let cells = (0..self.venues.len())
                    .map(|venue_index| self.cell(slot, venue_index, marks))
                    .collect();
                GridRow {
                    slot,
                    day,
                    time,
                    cells,
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use test_case::test_case;

    /// Day 1 of the test cruise starts 2026-01-22 12:00 UTC
    fn at(day_offset: u32, hour: u32, minute: u32) -> i64 {
        Utc.with_ymd_and_hms(2026, 1, 22 + day_offset, hour, minute, 0)
            .unwrap()
            .timestamp()
    }

    fn venues() -> Vec<String> {
        vec!["Joy".to_string(), "Pool Deck".to_string()]
    }

    fn no_marks() -> (BTreeSet<PerformanceKey>, BTreeSet<PerformanceKey>) {
        (BTreeSet::new(), BTreeSet::new())
    }

    #[test_case(12, 0, 0; "noon opens the day")]
    #[test_case(12, 30, 1; "half past noon")]
    #[test_case(20, 15, 16; "evening rounds down")]
    #[test_case(23, 30, 23; "last slot before midnight")]
    #[test_case(0, 0, 24; "midnight folds into same day")]
    #[test_case(2, 45, 29; "night owl hours")]
    #[test_case(11, 30, 47; "last slot of the cruise day")]
    fn test_slot_offset(hour: u32, minute: u32, expected: u32) {
        assert_eq!(GridParams::default().slot_offset(hour, minute), expected);
    }

    #[test]
    fn test_default_params() {
        let params = GridParams::default();
        assert_eq!(params.slots_per_day, 48);
        assert_eq!(params.total_slots(), 168);
    }

    #[test]
    fn test_start_slot_folds_after_midnight_into_same_day() {
        let params = GridParams::default();
        // 01:00 on the calendar day after day 2 began
        let late = Performance::new("Late", "Joy", 2, at(2, 1, 0), at(2, 2, 0));
        assert_eq!(params.start_slot(&late), Some(48 + 26));
    }

    #[test]
    fn test_span_len_rounds_up_and_floors_at_one() {
        let params = GridParams::default();
        assert_eq!(params.span_len(&Performance::new("A", "Joy", 1, 0, 3600)), 2);
        assert_eq!(params.span_len(&Performance::new("A", "Joy", 1, 0, 3601)), 3);
        assert_eq!(params.span_len(&Performance::new("A", "Joy", 1, 0, 60)), 1);
        assert_eq!(params.span_len(&Performance::new("A", "Joy", 1, 100, 100)), 1);
        assert_eq!(params.span_len(&Performance::new("A", "Joy", 1, 100, 0)), 1);
    }

    #[test]
    fn test_extreme_feed_times_do_not_overflow() {
        let params = GridParams::default();
        let endless = Performance::new("X", "Joy", 1, 0, i64::MAX);
        assert_eq!(params.span_len(&endless), u32::MAX);
        assert_eq!(params.span_len(&Performance::new("X", "Joy", 1, i64::MIN, i64::MAX)), u32::MAX);
        assert_eq!(params.span_len(&Performance::new("X", "Joy", 1, i64::MAX, i64::MIN)), 1);

        let shows = vec![endless, Performance::new("Y", "Joy", 1, i64::MIN, i64::MAX)];
        let layout = GridLayout::place(&shows, &venues(), params);
        // Epoch zero is midnight UTC, slot 24 of day 1; the span runs to the grid edge
        assert_eq!(layout.placements().len(), 1);
        assert_eq!(layout.placements()[0].start_slot, 24);
        assert_eq!(layout.occupants(167, 0).count(), 1);
    }

    #[test_case(30, 30; "divisor kept")]
    #[test_case(45, 30; "snapped down to a divisor")]
    #[test_case(0, 1; "zero becomes one minute")]
    #[test_case(90, 60; "capped at an hour")]
    fn test_slot_minutes_snap_to_hour_divisor(requested: u32, expected: u32) {
        let params = GridParams::new(requested, 12, 3.5, Tz::UTC);
        assert_eq!(params.slot_minutes, expected);
        assert_eq!(params.slots_per_day * params.slot_minutes, 24 * 60);
    }

    #[test]
    fn test_one_hour_show_spans_two_slots_rendered_once() {
        let shows = vec![
            Performance::new("Band A", "Joy", 1, at(0, 14, 0), at(0, 15, 0)).with_color("#ff0000"),
        ];
        let layout = GridLayout::place(&shows, &venues(), GridParams::default());
        let (favorites, hidden) = no_marks();
        let marks = RenderMarks {
            favorites: &favorites,
            hidden: &hidden,
            show_hidden: true,
        };

        assert_eq!(layout.occupant(4, 0).map(|p| p.start_slot), Some(4));
        assert_eq!(layout.occupant(5, 0).map(|p| p.start_slot), Some(4));
        assert!(layout.occupant(6, 0).is_none());
        assert!(layout.occupant(4, 1).is_none());

        let rows = layout.rows(&marks);
        let starts: Vec<_> = rows
            .iter()
            .flat_map(|row| row.cells.iter().map(move |cell| (row.slot, cell)))
            .filter(|(_, cell)| matches!(cell, GridCell::Start { .. }))
            .collect();
        assert_eq!(starts.len(), 1);
        assert_eq!(starts[0].0, 4);
        assert!(matches!(starts[0].1, GridCell::Start { row_span: 2, .. }));
        assert!(matches!(rows[5].cells[0], GridCell::Continuation { .. }));
        assert_eq!(rows[6].cells[0], GridCell::Empty);
    }

    #[test]
    fn test_unknown_venue_is_skipped() {
        let shows = vec![Performance::new("Band A", "Lido", 1, at(0, 14, 0), at(0, 15, 0))];
        let layout = GridLayout::place(&shows, &venues(), GridParams::default());
        assert!(layout.placements().is_empty());
    }

    #[test]
    fn test_start_outside_grid_is_skipped() {
        // Day 4 only has its first half day on a 3.5 day grid
        let shows = vec![
            Performance::new("Early", "Joy", 4, at(3, 13, 0), at(3, 14, 0)),
            Performance::new("Late", "Joy", 4, at(4, 1, 0), at(4, 2, 0)),
        ];
        let layout = GridLayout::place(&shows, &venues(), GridParams::default());
        assert_eq!(layout.placements().len(), 1);
        assert_eq!(layout.placements()[0].performance.name, "Early");
    }

    #[test]
    fn test_span_is_clipped_at_grid_end() {
        let shows = vec![Performance::new("Long", "Joy", 4, at(3, 23, 0), at(4, 3, 0))];
        let layout = GridLayout::place(&shows, &venues(), GridParams::default());
        assert_eq!(layout.placements()[0].start_slot, 166);
        assert_eq!(layout.occupants(167, 0).count(), 1);
        assert_eq!(layout.occupants(168, 0).count(), 0);
    }

    #[test]
    fn test_overlap_first_inserted_wins() {
        let shows = vec![
            Performance::new("First", "Joy", 1, at(0, 14, 0), at(0, 15, 0)),
            Performance::new("Second", "Joy", 1, at(0, 14, 30), at(0, 15, 30)),
        ];
        let layout = GridLayout::place(&shows, &venues(), GridParams::default());
        let (favorites, hidden) = no_marks();
        let marks = RenderMarks {
            favorites: &favorites,
            hidden: &hidden,
            show_hidden: true,
        };

        assert_eq!(layout.occupants(5, 0).count(), 2);
        assert_eq!(layout.conflicts(), vec![(5, 0)]);
        // "Second" starts at slot 5 but "First" owns that cell
        assert!(matches!(layout.cell(5, 0, &marks), GridCell::Continuation { ref key } if key.as_str().starts_with("First")));
        // Its tail still shows as a continuation of "Second"
        assert!(matches!(layout.cell(6, 0, &marks), GridCell::Continuation { ref key } if key.as_str().starts_with("Second")));

        let again = GridLayout::place(&shows, &venues(), GridParams::default());
        assert_eq!(layout.rows(&marks), again.rows(&marks));
    }

    #[test]
    fn test_hidden_cells_respect_show_hidden() {
        let shows = vec![Performance::new("Band A", "Joy", 1, at(0, 14, 0), at(0, 15, 0))];
        let layout = GridLayout::place(&shows, &venues(), GridParams::default());
        let favorites = BTreeSet::new();
        let hidden: BTreeSet<_> = [shows[0].key()].into_iter().collect();

        let shown = RenderMarks {
            favorites: &favorites,
            hidden: &hidden,
            show_hidden: true,
        };
        assert!(matches!(layout.cell(4, 0, &shown), GridCell::Start { hidden: true, .. }));

        let filtered = RenderMarks {
            show_hidden: false,
            ..shown
        };
        assert_eq!(layout.cell(4, 0, &filtered), GridCell::Empty);
        assert_eq!(layout.cell(5, 0, &filtered), GridCell::Empty);
        // Occupancy itself is unchanged
        assert!(layout.occupant(4, 0).is_some());
    }

    #[test]
    fn test_slot_label() {
        let params = GridParams::default();
        assert_eq!(params.slot_label(0), (1, NaiveTime::from_hms_opt(12, 0, 0).unwrap()));
        assert_eq!(params.slot_label(25), (1, NaiveTime::from_hms_opt(0, 30, 0).unwrap()));
        assert_eq!(params.slot_label(49), (2, NaiveTime::from_hms_opt(12, 30, 0).unwrap()));
    }

    #[test]
    fn test_timezone_shifts_slot() {
        let tz: Tz = "America/New_York".parse().unwrap();
        let params = GridParams::new(30, 12, 3.5, tz);
        // 19:00 UTC is 14:00 EST
        let show = Performance::new("A", "Joy", 1, at(0, 19, 0), at(0, 20, 0));
        assert_eq!(params.start_slot(&show), Some(4));
    }
}
