//! File-backed bootstrap source.
//!
//! Settings are read from a TOML or JSON document (picked by extension,
//! JSON otherwise). Snapshots are a JSON document that is either an array of
//! `{ key, payload }` pushes or an object mapping key to payload.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use marquee_core::effects::{BootstrapError, BootstrapSource};
use marquee_core::{PushUpdate, SettingsUpdate};
use serde_json::Value;

#[derive(Debug, Clone, Default)]
pub struct FileBootstrap {
    settings_path: Option<PathBuf>,
    snapshots_path: Option<PathBuf>,
}

impl FileBootstrap {
    pub fn new(settings_path: Option<PathBuf>, snapshots_path: Option<PathBuf>) -> Self {
        Self {
            settings_path,
            snapshots_path,
        }
    }
}

async fn read(path: &Path) -> Result<String, BootstrapError> {
    tokio::fs::read_to_string(path)
        .await
        .map_err(|e| BootstrapError::Unreachable {
            reason: format!("{}: {e}", path.display()),
        })
}

fn malformed(path: &Path, err: impl std::fmt::Display) -> BootstrapError {
    BootstrapError::Malformed {
        reason: format!("{}: {err}", path.display()),
    }
}

/// Parse a settings document, TOML when the path ends in `.toml`.
pub fn parse_settings(path: &Path, raw: &str) -> Result<SettingsUpdate, BootstrapError> {
    let is_toml = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("toml"));
    if is_toml {
        toml::from_str(raw).map_err(|e| malformed(path, e))
    } else {
        serde_json::from_str(raw).map_err(|e| malformed(path, e))
    }
}

/// Parse a snapshot document. Entries without a usable key are skipped.
pub fn parse_snapshots(path: &Path, raw: &str) -> Result<Vec<PushUpdate>, BootstrapError> {
    let doc: Value = serde_json::from_str(raw).map_err(|e| malformed(path, e))?;
    let pushes = match doc {
        Value::Array(items) => items
            .into_iter()
            .filter_map(|item| match PushUpdate::from_value(item) {
                Ok(push) => Some(push),
                Err(err) => {
                    tracing::warn!(path = %path.display(), error = %err, "Skipping snapshot entry");
                    None
                }
            })
            .collect(),
        Value::Object(map) => map
            .into_iter()
            .filter_map(|(key, payload)| {
                let key = key.trim();
                (!key.is_empty()).then(|| PushUpdate::new(key, payload))
            })
            .collect(),
        other => {
            return Err(malformed(
                path,
                format!("expected array or object, found {other}"),
            ))
        }
    };
    Ok(pushes)
}

#[async_trait]
impl BootstrapSource for FileBootstrap {
    async fn fetch_settings(&self) -> Result<SettingsUpdate, BootstrapError> {
        let path = self
            .settings_path
            .as_deref()
            .ok_or_else(|| BootstrapError::Unreachable {
                reason: "no settings file configured".to_string(),
            })?;
        let raw = read(path).await?;
        parse_settings(path, &raw)
    }

    async fn fetch_snapshots(&self) -> Result<Vec<PushUpdate>, BootstrapError> {
        let Some(path) = self.snapshots_path.as_deref() else {
            return Ok(Vec::new());
        };
        let raw = read(path).await?;
        parse_snapshots(path, &raw)
    }
}
