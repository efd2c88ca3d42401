//! Initial-load interface.

use async_trait::async_trait;

use crate::messages::PushUpdate;
use crate::settings::SettingsUpdate;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BootstrapError {
    #[error("Bootstrap source unreachable: {reason}")]
    Unreachable { reason: String },
    #[error("Bootstrap data malformed: {reason}")]
    Malformed { reason: String },
}

/// Source of the configuration and snapshot set fetched once on startup.
#[async_trait]
pub trait BootstrapSource: Send + Sync {
    async fn fetch_settings(&self) -> Result<SettingsUpdate, BootstrapError>;

    /// Latest payload for every key the source knows about.
    async fn fetch_snapshots(&self) -> Result<Vec<PushUpdate>, BootstrapError>;
}
