//! Identifiers and the cached snapshot type.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::time::PhysicalTime;

/// Name of one rotation source (an event category such as `follower`).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RotationKey(String);

impl RotationKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RotationKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RotationKey {
    fn from(key: &str) -> Self {
        Self::new(key)
    }
}

impl From<String> for RotationKey {
    fn from(key: String) -> Self {
        Self(key)
    }
}

impl PartialEq<str> for RotationKey {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for RotationKey {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

/// Monotonic counter bumped on every configuration change or session reset.
///
/// Requests carry the version they were issued under and are dropped once
/// it no longer matches the live one.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct ConfigVersion(pub u64);

impl ConfigVersion {
    #[must_use]
    pub fn next(self) -> Self {
        Self(self.0.wrapping_add(1))
    }
}

impl fmt::Display for ConfigVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "v{}", self.0)
    }
}

/// Monotonic counter identifying the recency of a transition request.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Generation(pub u64);

impl Generation {
    #[must_use]
    pub fn next(self) -> Self {
        Self(self.0.wrapping_add(1))
    }
}

impl fmt::Display for Generation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "g{}", self.0)
    }
}

/// Latest known payload for one rotation key.
///
/// `payload: None` is a distinct state meaning "no usable data for this key",
/// either because nothing arrived yet or because the last push was malformed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    pub key: RotationKey,
    pub payload: Option<Value>,
    pub received_at: PhysicalTime,
}

impl Snapshot {
    pub fn new(key: RotationKey, payload: Option<Value>, received_at: PhysicalTime) -> Self {
        Self {
            key,
            payload,
            received_at,
        }
    }

    pub fn has_payload(&self) -> bool {
        self.payload.is_some()
    }
}
