// Preferences module
// The persisted blob of favourites, hidden marks and personal events

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use super::custom_event::CustomEvent;
use super::performance::PerformanceKey;

/// Everything the user has chosen, stored as one JSON record.
///
/// Keys in `favorites`/`hidden` may point at performances the current
/// feed no longer contains; they are kept here and simply skipped when
/// resolving against the schedule.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Preferences {
    #[serde(default)]
    pub favorites: BTreeSet<PerformanceKey>,
    #[serde(default)]
    pub hidden: BTreeSet<PerformanceKey>,
    #[serde(default)]
    pub custom_events: Vec<CustomEvent>,
}

impl Preferences {
    pub fn from_json(data: &str) -> serde_json::Result<Self> {
        serde_json::from_str(data)
    }

    /// Number of stored personal events that predate stable ids.
    ///
    /// Such records get a fresh id each time they are parsed, so a caller
    /// that sees a non-zero count should write the blob back.
    pub fn count_events_without_id(data: &str) -> usize {
        let Ok(value) = serde_json::from_str::<serde_json::Value>(data) else {
            return 0;
        };
        value
            .get("customEvents")
            .and_then(|events| events.as_array())
            .map(|events| events.iter().filter(|event| event.get("id").is_none()).count())
            .unwrap_or(0)
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    pub fn is_empty(&self) -> bool {
        self.favorites.is_empty() && self.hidden.is_empty() && self.custom_events.is_empty()
    }
}
