//! The ordered set of keys currently being cycled.

use std::collections::HashSet;

use serde::Serialize;

use crate::settings::SettingsUpdate;
use crate::types::RotationKey;

/// Ordered, deduplicated rotation keys plus their interval.
///
/// Built once per configuration version and never mutated afterwards; a new
/// configuration always produces a new set.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct RotationSet {
    keys: Vec<RotationKey>,
    interval_ms: u64,
}

impl RotationSet {
    /// Normalise raw keys into a rotation set.
    ///
    /// Keys are trimmed; blanks, `self_key` and repeats (keeping the first
    /// occurrence) are dropped.
    pub fn new<I, S>(raw_keys: I, interval_ms: u64, self_key: &str) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut seen = HashSet::new();
        let keys = raw_keys
            .into_iter()
            .filter_map(|raw| {
                let key = raw.as_ref().trim();
                if key.is_empty() || key == self_key || !seen.insert(key.to_string()) {
                    return None;
                }
                Some(RotationKey::new(key))
            })
            .collect();
        Self { keys, interval_ms }
    }

    /// Derive a set from pushed settings, keeping `fallback_interval_ms`
    /// when the configured interval is unusable.
    pub fn from_settings(settings: &SettingsUpdate, self_key: &str, fallback_interval_ms: u64) -> Self {
        let interval_ms = settings.interval_ms().unwrap_or_else(|| {
            tracing::warn!(
                interval_seconds = settings.interval_seconds,
                fallback_interval_ms,
                "Ignoring unusable rotation interval"
            );
            fallback_interval_ms
        });
        Self::new(&settings.selected_keys, interval_ms, self_key)
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn keys(&self) -> &[RotationKey] {
        &self.keys
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn interval_ms(&self) -> u64 {
        self.interval_ms
    }

    pub fn key_at(&self, index: usize) -> Option<&RotationKey> {
        self.keys.get(index)
    }

    pub fn position(&self, key: &RotationKey) -> Option<usize> {
        self.keys.iter().position(|k| k == key)
    }

    /// Index following `current`, wrapping at the end. Always 0 for an
    /// empty set.
    pub fn next_index(&self, current: usize) -> usize {
        next_index(current, self.keys.len())
    }

    /// Whether a recurring timer is needed: more than one key and a
    /// non-zero interval.
    pub fn is_recurring(&self) -> bool {
        self.keys.len() > 1 && self.interval_ms > 0
    }
}

/// `(current + 1) mod len`, with `len == 0` mapping to 0.
pub fn next_index(current: usize, len: usize) -> usize {
    if len == 0 {
        0
    } else {
        (current % len + 1) % len
    }
}
