//! Settings pushed over the configuration channel.
//!
//! The wire shape is `{ selectedKeys, intervalSeconds, animationConfig }`.
//! Every field has a default so partial documents still parse.

use serde::{Deserialize, Serialize};

use crate::errors::Result;

/// Rotation interval used when nothing valid was ever configured.
pub const DEFAULT_INTERVAL_SECONDS: f64 = 5.0;

/// Default upper bound for one animation phase.
pub const DEFAULT_ANIMATION_CEILING_MS: u64 = 10_000;

/// Floor for the phase deadline, whatever the configured ceiling.
pub const MIN_ANIMATION_DEADLINE_MS: u64 = 50;

fn default_interval_seconds() -> f64 {
    DEFAULT_INTERVAL_SECONDS
}

fn default_exit_style() -> String {
    "fadeOut".to_string()
}

fn default_enter_style() -> String {
    "fadeIn".to_string()
}

fn default_phase_ms() -> u64 {
    500
}

fn default_ceiling_ms() -> u64 {
    DEFAULT_ANIMATION_CEILING_MS
}

/// Configuration message consumed by the reactor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingsUpdate {
    #[serde(default)]
    pub selected_keys: Vec<String>,
    #[serde(default = "default_interval_seconds")]
    pub interval_seconds: f64,
    #[serde(default)]
    pub animation_config: AnimationConfig,
}

impl Default for SettingsUpdate {
    fn default() -> Self {
        Self {
            selected_keys: Vec::new(),
            interval_seconds: DEFAULT_INTERVAL_SECONDS,
            animation_config: AnimationConfig::default(),
        }
    }
}

impl SettingsUpdate {
    pub fn new<I, S>(selected_keys: I, interval_seconds: f64) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            selected_keys: selected_keys.into_iter().map(Into::into).collect(),
            interval_seconds,
            animation_config: AnimationConfig::default(),
        }
    }

    #[must_use]
    pub fn with_animation(mut self, animation_config: AnimationConfig) -> Self {
        self.animation_config = animation_config;
        self
    }

    /// Parse a settings document received as raw JSON.
    pub fn from_json(raw: &str) -> Result<Self> {
        Ok(serde_json::from_str(raw)?)
    }

    /// Rotation interval in milliseconds, or `None` if the configured value
    /// is negative, NaN or infinite.
    pub fn interval_ms(&self) -> Option<u64> {
        let secs = self.interval_seconds;
        if !secs.is_finite() || secs < 0.0 {
            return None;
        }
        let ms = (secs * 1000.0).round();
        if ms > u64::MAX as f64 {
            return None;
        }
        Some(ms as u64)
    }
}

/// Direction of one animation phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnimationDirection {
    Out,
    In,
}

/// Visual effect parameters for the leave/enter phases.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnimationConfig {
    #[serde(default = "default_exit_style")]
    pub exit: String,
    #[serde(default = "default_enter_style")]
    pub enter: String,
    #[serde(default = "default_phase_ms")]
    pub exit_ms: u64,
    #[serde(default = "default_phase_ms")]
    pub enter_ms: u64,
    /// A phase that has neither finished nor failed after this long is
    /// treated as failed.
    #[serde(default = "default_ceiling_ms")]
    pub ceiling_ms: u64,
}

impl Default for AnimationConfig {
    fn default() -> Self {
        Self {
            exit: default_exit_style(),
            enter: default_enter_style(),
            exit_ms: default_phase_ms(),
            enter_ms: default_phase_ms(),
            ceiling_ms: default_ceiling_ms(),
        }
    }
}

impl AnimationConfig {
    /// Zero-duration animations; handy for tests and headless runs.
    pub fn instant() -> Self {
        Self {
            exit_ms: 0,
            enter_ms: 0,
            ..Self::default()
        }
    }

    pub fn step(&self, direction: AnimationDirection) -> AnimationStep {
        let (style, duration_ms) = match direction {
            AnimationDirection::Out => (self.exit.clone(), self.exit_ms),
            AnimationDirection::In => (self.enter.clone(), self.enter_ms),
        };
        AnimationStep {
            direction,
            style,
            duration_ms,
            ceiling_ms: self.ceiling_ms,
        }
    }
}

/// One concrete animation phase handed to the animator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnimationStep {
    pub direction: AnimationDirection,
    pub style: String,
    pub duration_ms: u64,
    pub ceiling_ms: u64,
}

impl AnimationStep {
    /// Time after which the phase is abandoned.
    pub fn deadline_ms(&self) -> u64 {
        self.ceiling_ms
            .max(self.duration_ms)
            .max(MIN_ANIMATION_DEADLINE_MS)
    }
}
