//! Static coordinator options.

use serde::{Deserialize, Serialize};

/// Key the overlay registers itself under; never rotated.
pub const DEFAULT_SELF_KEY: &str = "rotator";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CoordinatorOptions {
    /// Key denoting this overlay, filtered out of every rotation.
    pub self_key: String,
    /// Interval used while no valid interval was ever configured.
    pub default_interval_ms: u64,
    /// Capacity of the external intake channel.
    pub intake_capacity: usize,
    /// Capacity of the display event broadcast.
    pub event_capacity: usize,
    /// Time each bootstrap fetch may take before it counts as failed.
    pub bootstrap_timeout_ms: u64,
}

impl Default for CoordinatorOptions {
    fn default() -> Self {
        Self {
            self_key: DEFAULT_SELF_KEY.to_string(),
            default_interval_ms: 5_000,
            intake_capacity: 256,
            event_capacity: 1024,
            bootstrap_timeout_ms: 10_000,
        }
    }
}
