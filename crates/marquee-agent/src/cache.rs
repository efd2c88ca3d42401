//! Latest snapshot per rotation key.

use std::collections::HashMap;

use marquee_core::{PhysicalTime, RotationKey, Snapshot};
use serde_json::Value;

/// Pure key → snapshot store.
///
/// Each put replaces the stored snapshot wholesale. Unknown keys read as
/// absent; nothing here can fail. Deciding whether a put affects the screen
/// is the coordinator's job.
#[derive(Debug, Default)]
pub struct SnapshotCache {
    entries: HashMap<RotationKey, Snapshot>,
}

impl SnapshotCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn put(&mut self, key: RotationKey, payload: Option<Value>, received_at: PhysicalTime) {
        let snapshot = Snapshot::new(key.clone(), payload, received_at);
        self.entries.insert(key, snapshot);
    }

    pub fn get(&self, key: &RotationKey) -> Option<&Snapshot> {
        self.entries.get(key)
    }

    /// Drop every entry (session reset).
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
