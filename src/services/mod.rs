// Service module exports

pub mod app;
pub mod feed;
pub mod grid;
pub mod itinerary;
pub mod preferences;
pub mod schedule;
pub mod settings;
pub mod storage;

/// Result of a load that never fails outright.
///
/// `Fallback` still carries a usable value (usually the empty default)
/// together with the reason the real data could not be used, so callers
/// can report the degraded state without changing behaviour.
#[derive(Debug, Clone, PartialEq)]
pub enum LoadOutcome<T> {
    Loaded(T),
    Fallback { value: T, reason: String },
}

impl<T> LoadOutcome<T> {
    pub fn is_fallback(&self) -> bool {
        matches!(self, Self::Fallback { .. })
    }

    pub fn reason(&self) -> Option<&str> {
        match self {
            Self::Loaded(_) => None,
            Self::Fallback { reason, .. } => Some(reason.as_str()),
        }
    }

    pub fn value(&self) -> &T {
        match self {
            Self::Loaded(value) | Self::Fallback { value, .. } => value,
        }
    }

    pub fn into_inner(self) -> T {
        match self {
            Self::Loaded(value) | Self::Fallback { value, .. } => value,
        }
    }
}
