//! Read-only store of the performances loaded from the feed.

use std::collections::HashMap;

use crate::models::performance::{Performance, PerformanceKey};

/// Immutable schedule with lookup by identity key.
#[derive(Debug, Clone, Default)]
pub struct PerformanceStore {
    performances: Vec<Performance>,
    by_key: HashMap<PerformanceKey, usize>,
}

impl PerformanceStore {
    pub fn new(performances: Vec<Performance>) -> Self {
        let mut by_key = HashMap::with_capacity(performances.len());
        for (index, performance) in performances.iter().enumerate() {
            // Duplicate keys resolve to the first record, matching feed order
            by_key.entry(performance.key()).or_insert(index);
        }
        Self {
            performances,
            by_key,
        }
    }

    pub fn len(&self) -> usize {
        self.performances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.performances.is_empty()
    }

    /// Performances in feed order
    pub fn performances(&self) -> &[Performance] {
        &self.performances
    }

    pub fn get(&self, key: &PerformanceKey) -> Option<&Performance> {
        self.by_key.get(key).map(|&index| &self.performances[index])
    }

    pub fn contains(&self, key: &PerformanceKey) -> bool {
        self.by_key.contains_key(key)
    }

    /// Distinct venue names in order of first appearance.
    pub fn venues(&self) -> Vec<String> {
        let mut venues: Vec<String> = Vec::new();
        for performance in &self.performances {
            if !venues.iter().any(|v| v == &performance.location) {
                venues.push(performance.location.clone());
            }
        }
        venues
    }
}
