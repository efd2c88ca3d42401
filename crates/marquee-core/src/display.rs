//! What the render target shows.

use serde::{Deserialize, Serialize};

use crate::types::{RotationKey, Snapshot};

/// Why the overlay shows its empty state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmptyReason {
    /// The configuration selects no usable keys.
    NoSources,
    /// The session was reset.
    Reset,
    /// No configuration could be loaded at startup.
    Unconfigured,
}

/// A target the transition controller can put on screen.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DisplayTarget {
    Entry { key: RotationKey },
    Empty { reason: EmptyReason },
}

impl DisplayTarget {
    pub fn entry(key: impl Into<RotationKey>) -> Self {
        Self::Entry { key: key.into() }
    }

    pub fn empty(reason: EmptyReason) -> Self {
        Self::Empty { reason }
    }

    pub fn key(&self) -> Option<&RotationKey> {
        match self {
            Self::Entry { key } => Some(key),
            Self::Empty { .. } => None,
        }
    }
}

/// Resolved content handed to the renderer. `snapshot: None` renders the
/// "no data yet" state for the key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DisplayContent {
    Entry {
        key: RotationKey,
        snapshot: Option<Snapshot>,
    },
    Empty {
        reason: EmptyReason,
    },
}

impl DisplayContent {
    pub fn key(&self) -> Option<&RotationKey> {
        match self {
            Self::Entry { key, .. } => Some(key),
            Self::Empty { .. } => None,
        }
    }

    pub fn snapshot(&self) -> Option<&Snapshot> {
        match self {
            Self::Entry { snapshot, .. } => snapshot.as_ref(),
            Self::Empty { .. } => None,
        }
    }
}

/// Transition controller phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransitionPhase {
    #[default]
    Idle,
    AnimatingOut,
    AnimatingIn,
}

impl TransitionPhase {
    pub fn is_animating(self) -> bool {
        !matches!(self, Self::Idle)
    }
}
