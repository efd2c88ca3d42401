//! Wall-clock timestamps.

use serde::{Deserialize, Serialize};

/// Physical time as reported by a [`PhysicalTimeEffects`](crate::effects::PhysicalTimeEffects)
/// handler, in milliseconds since the Unix epoch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
pub struct PhysicalTime {
    pub ts_ms: u64,
}

impl PhysicalTime {
    pub const fn from_ms(ts_ms: u64) -> Self {
        Self { ts_ms }
    }

    /// Milliseconds elapsed since `earlier`, saturating at zero.
    pub fn since(&self, earlier: PhysicalTime) -> u64 {
        self.ts_ms.saturating_sub(earlier.ts_ms)
    }
}
