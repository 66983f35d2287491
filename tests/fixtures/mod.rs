// Test fixtures - reusable test data
// Provides a small cruise schedule shared across test files

#![allow(dead_code)]

use chrono::{TimeZone, Utc};
use cruise_schedule::models::performance::Performance;

/// Sample timestamps on the test cruise (day 1 = Jan 22, 2026, UTC)
pub mod times {
    use super::*;

    /// Epoch seconds for a wall-clock time `days_after` Jan 22, 2026
    pub fn at(days_after: u32, hour: u32, minute: u32) -> i64 {
        Utc.with_ymd_and_hms(2026, 1, 22 + days_after, hour, minute, 0)
            .unwrap()
            .timestamp()
    }

    /// Day 1 opening, noon
    pub fn day_one_noon() -> i64 {
        at(0, 12, 0)
    }
}

/// Sample performances
pub mod shows {
    use super::*;

    pub fn venues() -> Vec<String> {
        ["Joy", "Pool Deck", "Studio B"]
            .iter()
            .map(|v| v.to_string())
            .collect()
    }

    /// One hour in the Joy, 14:00 on day 1
    pub fn band_a() -> Performance {
        Performance::new("Band A", "Joy", 1, times::at(0, 14, 0), times::at(0, 15, 0))
            .with_color("#ff0000")
    }

    /// Late night set folding into day 1 after midnight
    pub fn night_owl() -> Performance {
        Performance::new("Night Owl", "Studio B", 1, times::at(1, 1, 0), times::at(1, 2, 30))
            .with_subtitle("After hours")
            .with_color("#333333")
    }

    /// Day 2 pool party
    pub fn pool_party() -> Performance {
        Performance::new("Pool Party", "Pool Deck", 2, times::at(1, 15, 0), times::at(1, 17, 0))
            .with_color("#00aaff")
    }

    /// Somewhere not on the grid
    pub fn lido_show() -> Performance {
        Performance::new("Lido Show", "Lido", 3, times::at(2, 20, 0), times::at(2, 21, 0))
    }

    pub fn schedule() -> Vec<Performance> {
        vec![band_a(), night_owl(), pool_party(), lido_show()]
    }

    /// Feed JSON as served by the schedule endpoint
    pub fn schedule_json() -> String {
        serde_json::to_string(&schedule()).unwrap()
    }
}
