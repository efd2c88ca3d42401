//! # Configuration Reactor
//!
//! Turns settings and reset signals into a fresh rotation: recompute the
//! [`RotationSet`], bump the configuration version, and tear down and
//! rebuild the scheduler. The reactor never touches the render target; it
//! reports what should be shown and the coordinator routes that through the
//! transition controller.

use marquee_core::{ConfigVersion, EmptyReason, RotationSet, SettingsUpdate};

use crate::cache::SnapshotCache;
use crate::scheduler::{RotationScheduler, TickHandler};
use crate::state::CoordinatorState;

/// What the screen should do after a reconfiguration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reconfigured {
    /// The scheduler was restarted and has already issued its first tick.
    Rotating { version: ConfigVersion },
    /// Nothing to rotate; show the empty state.
    Empty {
        version: ConfigVersion,
        reason: EmptyReason,
    },
}

impl Reconfigured {
    pub fn version(&self) -> ConfigVersion {
        match self {
            Self::Rotating { version } | Self::Empty { version, .. } => *version,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ConfigurationReactor {
    self_key: String,
    default_interval_ms: u64,
    /// Last settings that were applied. While set, the interval in effect is
    /// the fallback for an unusable one.
    applied: Option<SettingsUpdate>,
}

impl ConfigurationReactor {
    pub fn new(self_key: impl Into<String>, default_interval_ms: u64) -> Self {
        Self {
            self_key: self_key.into(),
            default_interval_ms,
            applied: None,
        }
    }

    pub fn applied(&self) -> Option<&SettingsUpdate> {
        self.applied.as_ref()
    }

    /// Apply `settings`.
    ///
    /// `bind_tick` builds the tick handler for the new version, so ticks from
    /// any earlier timer can be told apart and dropped.
    pub fn apply_config(
        &mut self,
        settings: SettingsUpdate,
        state: &mut CoordinatorState,
        scheduler: &mut RotationScheduler,
        bind_tick: impl FnOnce(ConfigVersion) -> TickHandler,
    ) -> Reconfigured {
        let fallback_interval_ms = match self.applied {
            Some(_) => state.rotation.interval_ms(),
            None => self.default_interval_ms,
        };
        let rotation = RotationSet::from_settings(&settings, &self.self_key, fallback_interval_ms);

        let version = state.bump_version();
        scheduler.stop();
        state.current_index = 0;
        state.rotation = rotation;
        state.animation = settings.animation_config.clone();

        tracing::info!(
            %version,
            keys = ?state.rotation.keys(),
            interval_ms = state.rotation.interval_ms(),
            "Applying rotation config"
        );

        let outcome = if state.rotation.is_empty() {
            Reconfigured::Empty {
                version,
                reason: EmptyReason::NoSources,
            }
        } else {
            scheduler.start(&state.rotation, bind_tick(version));
            Reconfigured::Rotating { version }
        };
        self.applied = Some(settings);
        outcome
    }

    /// Apply a raw settings document. A document that does not parse leaves
    /// the current configuration in place and returns `None`.
    pub fn apply_raw(
        &mut self,
        raw: &str,
        state: &mut CoordinatorState,
        scheduler: &mut RotationScheduler,
        bind_tick: impl FnOnce(ConfigVersion) -> TickHandler,
    ) -> Option<Reconfigured> {
        match SettingsUpdate::from_json(raw) {
            Ok(settings) => Some(self.apply_config(settings, state, scheduler, bind_tick)),
            Err(err) => {
                tracing::warn!(error = %err, "Malformed settings, keeping current configuration");
                None
            }
        }
    }

    /// Stop rotating, drop all cached data and return to the empty terminal
    /// state under a new version.
    pub fn reset(
        &mut self,
        state: &mut CoordinatorState,
        scheduler: &mut RotationScheduler,
        cache: &mut SnapshotCache,
    ) -> Reconfigured {
        scheduler.stop();
        cache.clear();
        let version = state.bump_version();
        state.current_index = 0;
        state.rotation = RotationSet::empty();
        self.applied = None;
        tracing::info!(%version, "Session reset");
        Reconfigured::Empty {
            version,
            reason: EmptyReason::Reset,
        }
    }
}
