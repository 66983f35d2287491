// Custom event module
// Personal agenda items the user adds next to the feed's performances

use std::fmt;
use std::str::FromStr;

use chrono::{Duration, NaiveDate, NaiveTime, TimeZone};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::utils::color::is_hex_color;
use crate::utils::time::parse_hhmm;

/// Venue shown for every personal event
pub const PERSONAL_EVENT_LOCATION: &str = "Personal Event";

/// Number of cruise days a personal event may be placed on
pub const MAX_EVENT_DAY: i64 = 4;

/// Validation failures for personal event input.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CustomEventError {
    #[error("Event name cannot be empty")]
    EmptyName,
    #[error("Day must be between 1 and 4, got {0}")]
    DayOutOfRange(i64),
    #[error("Time must be HH:MM, got '{0}'")]
    InvalidTime(String),
    #[error("Duration must be a positive number of minutes, got {0}")]
    InvalidDuration(i64),
    #[error("Color must be in hex format (#RRGGBB or #RGB), got '{0}'")]
    InvalidColor(String),
}

/// Stable identifier assigned when a personal event is created.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CustomEventId(pub Uuid);

impl CustomEventId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Key used by renderers, e.g. `custom-6f1c...`
    pub fn entry_key(&self) -> String {
        format!("custom-{}", self.0)
    }
}

impl Default for CustomEventId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for CustomEventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for CustomEventId {
    type Err = uuid::Error;

    /// Accepts both the bare UUID and the `custom-` entry key.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let raw = s.strip_prefix("custom-").unwrap_or(s);
        Uuid::parse_str(raw).map(Self)
    }
}

/// A personal event as stored in the preferences blob.
///
/// Older blobs have no `id`; one is generated when such a record is read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomEvent {
    #[serde(default)]
    pub id: CustomEventId,
    pub name: String,
    pub day: u8,
    #[serde(rename = "starttime")]
    pub start: i64,
    #[serde(rename = "endtime")]
    pub end: i64,
    #[serde(default)]
    pub color: String,
    #[serde(default = "default_location")]
    pub location: String,
}

fn default_location() -> String {
    PERSONAL_EVENT_LOCATION.to_string()
}

/// Raw form input for a new personal event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CustomEventDraft {
    pub name: String,
    pub day: i64,
    /// Time of day as `HH:MM`
    pub time: String,
    pub duration_minutes: i64,
    pub color: Option<String>,
}

impl CustomEventDraft {
    pub fn new(
        name: impl Into<String>,
        day: i64,
        time: impl Into<String>,
        duration_minutes: i64,
    ) -> Self {
        Self {
            name: name.into(),
            day,
            time: time.into(),
            duration_minutes,
            color: None,
        }
    }

    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = Some(color.into());
        self
    }

    /// Check every field without building the event.
    pub fn validate(&self) -> Result<NaiveTime, CustomEventError> {
        if self.name.trim().is_empty() {
            return Err(CustomEventError::EmptyName);
        }

        if !(1..=MAX_EVENT_DAY).contains(&self.day) {
            return Err(CustomEventError::DayOutOfRange(self.day));
        }

        let time =
            parse_hhmm(&self.time).ok_or_else(|| CustomEventError::InvalidTime(self.time.clone()))?;

        if self.duration_minutes <= 0 {
            return Err(CustomEventError::InvalidDuration(self.duration_minutes));
        }

        if let Some(ref color) = self.color {
            if !is_hex_color(color) {
                return Err(CustomEventError::InvalidColor(color.clone()));
            }
        }

        Ok(time)
    }

    /// Validate and anchor the draft onto the cruise calendar.
    ///
    /// Day `d` lands on `baseline + (d - 1)` days at the given wall-clock
    /// time in `timezone`. The time is taken literally on that calendar
    /// date, so `01:00` on day 2 is the early morning of day 2's date.
    pub fn into_event(
        self,
        baseline: NaiveDate,
        timezone: Tz,
        default_color: &str,
    ) -> Result<CustomEvent, CustomEventError> {
        let time = self.validate()?;

        let date = baseline + Duration::days(self.day - 1);
        let start = timezone
            .from_local_datetime(&date.and_time(time))
            .earliest()
            .ok_or_else(|| CustomEventError::InvalidTime(self.time.clone()))?
            .timestamp();
        let end = self
            .duration_minutes
            .checked_mul(60)
            .and_then(|seconds| start.checked_add(seconds))
            .ok_or(CustomEventError::InvalidDuration(self.duration_minutes))?;

        Ok(CustomEvent {
            id: CustomEventId::new(),
            name: self.name.trim().to_string(),
            day: self.day as u8,
            start,
            end,
            color: self.color.unwrap_or_else(|| default_color.to_string()),
            location: default_location(),
        })
    }
}
