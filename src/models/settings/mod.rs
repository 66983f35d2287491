// Settings module
// Feed source, venue columns, grid shape and storage choice

use std::path::PathBuf;

use chrono::NaiveDate;
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

/// Where the read-only schedule comes from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeedSettings {
    /// Remote feed, fetched over HTTPS. Takes precedence over `path`.
    pub url: Option<String>,
    /// Local JSON file
    pub path: PathBuf,
}

impl Default for FeedSettings {
    fn default() -> Self {
        Self {
            url: None,
            path: PathBuf::from("schedule.data.json"),
        }
    }
}

/// Shape of the timeline grid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridSettings {
    pub slot_minutes: u32,
    /// Hour at which a cruise day begins; earlier hours fold into the previous day
    pub day_start_hour: u32,
    /// Length of the grid in days; fractional days cut the last day short
    pub total_days: f64,
    /// Number of day buckets shown in the itinerary
    pub days: u8,
}

impl Default for GridSettings {
    fn default() -> Self {
        Self {
            slot_minutes: 30,
            day_start_hour: 12,
            total_days: 3.5,
            days: 4,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    Json,
    Sqlite,
    Memory,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageSettings {
    pub backend: StorageBackend,
    /// Overrides the default location under the user's data directory
    pub path: Option<PathBuf>,
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            backend: StorageBackend::Json,
            path: None,
        }
    }
}

/// Application configuration, read from `config.toml`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScheduleConfig {
    pub feed: FeedSettings,
    /// Grid columns in display order. Empty means "use feed order".
    pub venues: Vec<String>,
    pub grid: GridSettings,
    /// IANA zone used to read wall-clock hours from feed timestamps
    pub timezone: String,
    /// Calendar date of cruise day 1
    pub baseline_date: NaiveDate,
    pub storage: StorageSettings,
    pub default_color: String,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            feed: FeedSettings::default(),
            venues: Vec::new(),
            grid: GridSettings::default(),
            timezone: "UTC".to_string(),
            baseline_date: NaiveDate::from_ymd_opt(2026, 1, 22).unwrap_or_default(),
            storage: StorageSettings::default(),
            default_color: "#4a90d9".to_string(),
        }
    }
}

impl ScheduleConfig {
    /// Parsed timezone, falling back to UTC if the name is unknown.
    pub fn tz(&self) -> Tz {
        self.timezone.parse().unwrap_or(Tz::UTC)
    }

    /// Validate settings values
    pub fn validate(&self) -> Result<(), String> {
        if self.timezone.parse::<Tz>().is_err() {
            return Err(format!("Unknown timezone '{}'", self.timezone));
        }

        let slot = self.grid.slot_minutes;
        if slot == 0 || slot > 60 || 60 % slot != 0 {
            return Err(format!(
                "slot_minutes must divide an hour evenly, got {}",
                slot
            ));
        }

        if self.grid.day_start_hour > 23 {
            return Err(format!(
                "day_start_hour must be 0-23, got {}",
                self.grid.day_start_hour
            ));
        }

        if !(self.grid.total_days > 0.0) || self.grid.total_days > f64::from(self.grid.days) {
            return Err(format!(
                "total_days must be within (0, {}], got {}",
                self.grid.days, self.grid.total_days
            ));
        }

        if let Some(ref url) = self.feed.url {
            if !url.starts_with("https://") {
                return Err("Feed URL must use HTTPS".to_string());
            }
        }

        Ok(())
    }
}
