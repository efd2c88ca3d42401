//! Events broadcast to coordinator subscribers.

use marquee_core::{ConfigVersion, DisplayTarget, Generation, RotationKey, TransitionPhase};
use serde::Serialize;

use crate::transition::DropReason;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum DisplayEvent {
    /// A new configuration took effect.
    ConfigApplied {
        version: ConfigVersion,
        keys: Vec<RotationKey>,
        interval_ms: u64,
    },
    /// The session was reset to its empty state.
    SessionReset { version: ConfigVersion },
    /// The transition controller entered `phase`.
    PhaseEntered {
        phase: TransitionPhase,
        generation: Generation,
    },
    /// `target` finished animating in.
    Rendered {
        target: DisplayTarget,
        generation: Generation,
        forced: bool,
    },
    /// A request was discarded without touching the screen.
    RequestDropped {
        generation: Generation,
        reason: DropReason,
    },
}
