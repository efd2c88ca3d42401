//! In-memory bootstrap source.

use async_trait::async_trait;
use marquee_core::effects::{BootstrapError, BootstrapSource};
use marquee_core::{PushUpdate, SettingsUpdate};

#[derive(Debug, Clone)]
pub struct MemoryBootstrap {
    settings: Result<SettingsUpdate, BootstrapError>,
    snapshots: Result<Vec<PushUpdate>, BootstrapError>,
}

impl MemoryBootstrap {
    pub fn new(settings: SettingsUpdate, snapshots: Vec<PushUpdate>) -> Self {
        Self {
            settings: Ok(settings),
            snapshots: Ok(snapshots),
        }
    }

    /// Both fetches fail as unreachable.
    pub fn unreachable() -> Self {
        let err = BootstrapError::Unreachable {
            reason: "scripted outage".to_string(),
        };
        Self {
            settings: Err(err.clone()),
            snapshots: Err(err),
        }
    }

    /// Snapshots load but settings do not.
    pub fn without_settings(snapshots: Vec<PushUpdate>) -> Self {
        Self {
            settings: Err(BootstrapError::Unreachable {
                reason: "scripted outage".to_string(),
            }),
            snapshots: Ok(snapshots),
        }
    }
}

#[async_trait]
impl BootstrapSource for MemoryBootstrap {
    async fn fetch_settings(&self) -> Result<SettingsUpdate, BootstrapError> {
        self.settings.clone()
    }

    async fn fetch_snapshots(&self) -> Result<Vec<PushUpdate>, BootstrapError> {
        self.snapshots.clone()
    }
}
