//! Preference state: favourites, hidden marks and personal events.
//!
//! All mutation goes through this service. Each operation updates the
//! in-memory collections first and then writes the whole blob through to
//! the store, so a reader never sees state the store does not have.

use std::collections::BTreeSet;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use chrono_tz::Tz;

use super::storage::PreferenceStore;
use super::LoadOutcome;
use crate::models::custom_event::{CustomEvent, CustomEventDraft, CustomEventError, CustomEventId};
use crate::models::performance::PerformanceKey;
use crate::models::preferences::Preferences;

/// Calendar anchoring used when turning form input into events.
#[derive(Debug, Clone)]
pub struct EventAnchor {
    pub baseline: NaiveDate,
    pub timezone: Tz,
    pub default_color: String,
}

/// Errors from adding a personal event.
#[derive(Debug, thiserror::Error)]
pub enum AddEventError {
    #[error(transparent)]
    Invalid(#[from] CustomEventError),
    #[error("event was added but could not be saved: {0:#}")]
    Persist(anyhow::Error),
}

/// Owns the user's preferences and keeps the store in sync.
pub struct PreferenceState<S: PreferenceStore> {
    prefs: Preferences,
    store: S,
}

impl<S: PreferenceStore> PreferenceState<S> {
    /// Start from empty preferences without reading the store.
    pub fn empty(store: S) -> Self {
        Self {
            prefs: Preferences::default(),
            store,
        }
    }

    /// Read preferences from the store.
    ///
    /// A missing record is a normal first run. Unreadable or malformed
    /// data yields empty preferences and a `Fallback` outcome; the stored
    /// record is left untouched until the next mutation overwrites it.
    ///
    /// Personal events stored without an id are given one and the blob is
    /// written back at once, so the ids stay the same on the next load.
    pub fn load(store: S) -> LoadOutcome<Self> {
        match read_preferences(&store) {
            Ok(Some((prefs, missing_ids))) => {
                log::info!(
                    "Loaded preferences: {} favorites, {} hidden, {} custom events",
                    prefs.favorites.len(),
                    prefs.hidden.len(),
                    prefs.custom_events.len()
                );
                let state = Self { prefs, store };
                if missing_ids > 0 {
                    log::info!("Assigning ids to {} stored custom events", missing_ids);
                    if let Err(err) = state.save() {
                        log::warn!("Failed to write back upgraded preferences: {:#}", err);
                    }
                }
                LoadOutcome::Loaded(state)
            }
            Ok(None) => LoadOutcome::Loaded(Self::empty(store)),
            Err(err) => {
                log::warn!("Error loading preferences: {:#}", err);
                LoadOutcome::Fallback {
                    value: Self::empty(store),
                    reason: format!("{:#}", err),
                }
            }
        }
    }

    /// Write the full blob to the store.
    pub fn save(&self) -> Result<()> {
        let data = self
            .prefs
            .to_json()
            .context("Failed to serialize preferences")?;
        self.store.save(&data)
    }

    fn persist(&self) -> Result<()> {
        self.save().map_err(|err| {
            log::error!("Failed to save preferences: {:#}", err);
            err
        })
    }

    /// Flip favourite membership. Returns the new membership.
    pub fn toggle_favorite(&mut self, key: &PerformanceKey) -> Result<bool> {
        let now_favorite = toggle(&mut self.prefs.favorites, key);
        log::debug!("Favorite {} -> {}", key, now_favorite);
        self.persist()?;
        Ok(now_favorite)
    }

    /// Flip hidden membership. Returns the new membership.
    pub fn toggle_hidden(&mut self, key: &PerformanceKey) -> Result<bool> {
        let now_hidden = toggle(&mut self.prefs.hidden, key);
        log::debug!("Hidden {} -> {}", key, now_hidden);
        self.persist()?;
        Ok(now_hidden)
    }

    /// Drop a favourite. Returns whether it was present.
    pub fn remove_favorite(&mut self, key: &PerformanceKey) -> Result<bool> {
        let removed = self.prefs.favorites.remove(key);
        if removed {
            log::debug!("Removed favorite {}", key);
            self.persist()?;
        }
        Ok(removed)
    }

    /// Validate form input, anchor it to the cruise calendar and append it.
    pub fn add_custom_event(
        &mut self,
        draft: CustomEventDraft,
        anchor: &EventAnchor,
    ) -> Result<CustomEventId, AddEventError> {
        let event = draft.into_event(anchor.baseline, anchor.timezone, &anchor.default_color)?;
        let id = event.id;
        log::debug!("Adding custom event '{}' ({}) on day {}", event.name, id, event.day);
        self.prefs.custom_events.push(event);
        self.persist().map_err(AddEventError::Persist)?;
        Ok(id)
    }

    /// Remove a personal event by id. Unknown ids are a no-op.
    pub fn remove_custom_event(&mut self, id: CustomEventId) -> Result<bool> {
        let before = self.prefs.custom_events.len();
        self.prefs.custom_events.retain(|event| event.id != id);
        let removed = self.prefs.custom_events.len() != before;
        if removed {
            log::debug!("Removed custom event {}", id);
            self.persist()?;
        }
        Ok(removed)
    }

    pub fn is_favorite(&self, key: &PerformanceKey) -> bool {
        self.prefs.favorites.contains(key)
    }

    pub fn is_hidden(&self, key: &PerformanceKey) -> bool {
        self.prefs.hidden.contains(key)
    }

    pub fn favorites(&self) -> &BTreeSet<PerformanceKey> {
        &self.prefs.favorites
    }

    pub fn hidden(&self) -> &BTreeSet<PerformanceKey> {
        &self.prefs.hidden
    }

    pub fn custom_events(&self) -> &[CustomEvent] {
        &self.prefs.custom_events
    }

    /// Read-only view of the whole blob
    pub fn preferences(&self) -> &Preferences {
        &self.prefs
    }

    pub fn store(&self) -> &S {
        &self.store
    }
}

/// Parsed preferences plus how many events were stored without an id.
fn read_preferences(store: &impl PreferenceStore) -> Result<Option<(Preferences, usize)>> {
    let Some(data) = store.load()? else {
        return Ok(None);
    };
    let prefs = Preferences::from_json(&data).context("Stored preferences are malformed")?;
    Ok(Some((prefs, Preferences::count_events_without_id(&data))))
}

fn toggle(set: &mut BTreeSet<PerformanceKey>, key: &PerformanceKey) -> bool {
    if set.remove(key) {
        false
    } else {
        set.insert(key.clone());
        true
    }
}
