//! Marquee Core - data model and effect interfaces
//!
//! This crate holds the pure types shared by the rotation overlay: keys,
//! snapshots, rotation sets, the version/generation counters that order
//! asynchronous work, the intake message shapes, and the effect traits the
//! coordinator drives. It contains no runtime logic.
//!
//! # Layers
//!
//! - `marquee-core`: types and effect signatures (this crate)
//! - `marquee-effects`: production effect handlers
//! - `marquee-agent`: the coordinator (cache, scheduler, transitions, reactor)
//! - `marquee-testkit`: doubles for tests

#![allow(missing_docs)]
#![forbid(unsafe_code)]

/// Rendered content and transition phases
pub mod display;

/// Pure effect interfaces (no implementations)
pub mod effects;

/// Unified error handling
pub mod errors;

/// Push, settings and reset intake messages
pub mod messages;

/// Rotation set derivation and index arithmetic
pub mod rotation;

/// Settings and animation configuration
pub mod settings;

/// Physical timestamps
pub mod time;

/// Keys, counters and snapshots
pub mod types;

pub use display::{DisplayContent, DisplayTarget, EmptyReason, TransitionPhase};
pub use errors::{MarqueeError, Result};
pub use messages::{IntakeEvent, PushUpdate};
pub use rotation::RotationSet;
pub use settings::{AnimationConfig, AnimationDirection, AnimationStep, SettingsUpdate};
pub use time::PhysicalTime;
pub use types::{ConfigVersion, Generation, RotationKey, Snapshot};
