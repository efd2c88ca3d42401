//! Coordinator-owned state, status snapshots and statistics.

use marquee_core::{
    AnimationConfig, ConfigVersion, DisplayTarget, Generation, RotationKey, RotationSet,
    TransitionPhase,
};
use serde::Serialize;

/// Mutable rotation state, constructed fresh per session and owned by the
/// coordinator. Display state lives in the transition controller and the
/// timer handle in the scheduler.
#[derive(Debug, Clone, Default)]
pub struct CoordinatorState {
    pub config_version: ConfigVersion,
    /// Index into `rotation`; meaningful only while `rotation` is non-empty.
    pub current_index: usize,
    pub rotation: RotationSet,
    pub animation: AnimationConfig,
}

impl CoordinatorState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bump the configuration version, invalidating outstanding requests.
    pub fn bump_version(&mut self) -> ConfigVersion {
        self.config_version = self.config_version.next();
        self.config_version
    }
}

/// Point-in-time view of the coordinator, returned by status queries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CoordinatorStatus {
    pub config_version: ConfigVersion,
    pub current_index: usize,
    pub keys: Vec<RotationKey>,
    pub interval_ms: u64,
    pub phase: TransitionPhase,
    pub displayed: Option<DisplayTarget>,
    pub displayed_key: Option<RotationKey>,
    pub generation: Generation,
    pub timer_active: bool,
    pub live_timers: usize,
    pub cached_keys: usize,
}

/// Running counters.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CoordinatorStats {
    pub ticks: u64,
    pub pushes: u64,
    pub configs_applied: u64,
    pub resets: u64,
    pub renders: u64,
    pub forced_renders: u64,
    pub noop_requests: u64,
    pub dropped_stale_config: u64,
    pub dropped_superseded: u64,
    pub animation_failures: u64,
    pub render_failures: u64,
    pub malformed_intake: u64,
    pub timers_started: u64,
    pub timers_stopped: u64,
    /// Highest number of phases ever running at once.
    pub max_concurrent_phases: usize,
}
