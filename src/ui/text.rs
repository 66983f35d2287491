//! Terminal rendering of the two views.
//!
//! Renderers only read the projections produced by the services; they
//! never touch preference state.

use std::fmt::Write;

use chrono_tz::Tz;

use crate::services::grid::{GridCell, GridRow};
use crate::services::itinerary::Itinerary;
use crate::services::schedule::PerformanceStore;
use crate::utils::color::ansi_swatch;
use crate::utils::time::format_time_range;

/// Placeholder shown when the itinerary has nothing in it.
pub const EMPTY_ITINERARY_MESSAGE: &str = "No favorites yet. Add shows from the timeline!";

/// Timeline as day sections, one line per slot that starts a show.
///
/// Continuation slots are implied by the span shown on the start line.
pub fn render_timeline(rows: &[GridRow<'_>], venues: &[String], timezone: Tz) -> String {
    let mut out = String::new();
    let mut current_day = None;

    for row in rows {
        let starts: Vec<_> = row
            .cells
            .iter()
            .zip(venues)
            .filter_map(|(cell, venue)| match cell {
                GridCell::Start {
                    performance,
                    row_span,
                    favorite,
                    hidden,
                    ..
                } => Some((venue, *performance, *row_span, *favorite, *hidden)),
                _ => None,
            })
            .collect();

        if starts.is_empty() {
            continue;
        }

        if current_day != Some(row.day) {
            if current_day.is_some() {
                out.push('\n');
            }
            let _ = writeln!(out, "== Day {} ==", row.day);
            current_day = Some(row.day);
        }

        for (venue, performance, span, favorite, hidden) in starts {
            let mut marks = String::new();
            if favorite {
                marks.push_str(" ♥");
            }
            if hidden {
                marks.push_str(" [hidden]");
            }
            let _ = writeln!(
                out,
                "{}  {:<14} {} ({}){} [{} slot{}]",
                row.time.format("%H:%M"),
                venue,
                performance.name,
                format_time_range(performance.start, performance.end, timezone),
                marks,
                span,
                if span == 1 { "" } else { "s" }
            );
        }
    }

    if out.is_empty() {
        out.push_str("No performances on the timeline.\n");
    }
    out
}

/// Itinerary grouped under day headers.
pub fn render_itinerary(itinerary: &Itinerary, timezone: Tz) -> String {
    let groups = match itinerary {
        Itinerary::Empty => return format!("{}\n", EMPTY_ITINERARY_MESSAGE),
        Itinerary::Days(groups) => groups,
    };

    let mut out = String::new();
    for group in groups {
        let _ = writeln!(out, "{}", group.label);
        for entry in &group.entries {
            let subtitle = entry
                .subtitle
                .as_deref()
                .map(|s| format!("{} • ", s))
                .unwrap_or_default();
            let _ = writeln!(
                out,
                "  {} {}  {} ({}{})  [{}]",
                ansi_swatch(&entry.color),
                format_time_range(entry.start, entry.end, timezone),
                entry.name,
                subtitle,
                entry.location,
                entry.id
            );
        }
        out.push('\n');
    }
    out
}

/// Identity keys of every performance, for use with favourite/hide commands.
pub fn render_keys(schedule: &PerformanceStore) -> String {
    let mut out = String::new();
    for performance in schedule.performances() {
        let _ = writeln!(out, "{}\t{}\tday {}", performance.key(), performance.location, performance.day);
    }
    out
}
