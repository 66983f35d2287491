// Performance module
// A single show from the schedule feed plus its derived identity key

use std::fmt;

use serde::{Deserialize, Serialize};

/// Identity key joining feed records to user preferences.
///
/// The feed carries no id of its own, so the key is derived as
/// `name-starttime-endtime`. Two performances sharing all three fields
/// collapse onto the same key; a real feed id should replace this if the
/// feed schema ever grows one.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PerformanceKey(pub String);

impl PerformanceKey {
    /// Derive the key from its three parts.
    pub fn derive(name: &str, start: i64, end: i64) -> Self {
        Self(format!("{}-{}-{}", name, start, end))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PerformanceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for PerformanceKey {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for PerformanceKey {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// Scheduled show as delivered by the feed.
///
/// Field names on the wire follow the feed (`band`, `starttime`, `endtime`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Performance {
    #[serde(rename = "band")]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subtitle: Option<String>,
    pub location: String,
    pub day: u8,
    /// Unix epoch seconds, UTC
    #[serde(rename = "starttime")]
    pub start: i64,
    /// Unix epoch seconds, UTC
    #[serde(rename = "endtime")]
    pub end: i64,
    #[serde(default)]
    pub color: String,
}

impl Performance {
    pub fn new(
        name: impl Into<String>,
        location: impl Into<String>,
        day: u8,
        start: i64,
        end: i64,
    ) -> Self {
        Self {
            name: name.into(),
            subtitle: None,
            location: location.into(),
            day,
            start,
            end,
            color: String::new(),
        }
    }

    pub fn with_subtitle(mut self, subtitle: impl Into<String>) -> Self {
        self.subtitle = Some(subtitle.into());
        self
    }

    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = color.into();
        self
    }

    /// Identity key used by favourites and hidden marks
    pub fn key(&self) -> PerformanceKey {
        PerformanceKey::derive(&self.name, self.start, self.end)
    }

    /// Length in seconds; may be zero or negative for malformed feed rows.
    /// Saturates instead of overflowing on extreme timestamps.
    pub fn duration_seconds(&self) -> i64 {
        self.end.saturating_sub(self.start)
    }

    /// True when the record looks sane enough to place without a fallback.
    pub fn is_well_formed(&self) -> bool {
        (1..=4).contains(&self.day) && self.end > self.start
    }
}
