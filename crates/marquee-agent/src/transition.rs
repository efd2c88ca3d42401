//! # Transition Controller
//!
//! The state machine that serialises "animate current entry out, then animate
//! next entry in" requests coming from the rotation timer, from live-update
//! short-circuits and from reconfiguration.
//!
//! The controller is synchronous and owns no tasks. It answers each request
//! or phase completion with at most one [`PhaseCommand`] for the coordinator
//! to execute, so at most one phase is ever running.
//!
//! ## Ordering
//!
//! Every request carries a `(ConfigVersion, Generation)` pair:
//! - a request from an older configuration is dropped outright;
//! - a request older than the latest accepted generation is dropped;
//! - a request accepted while a phase is running waits in a single pending
//!   slot, replacing whatever was there. When the running phase completes,
//!   the controller continues with the newest target and discards the
//!   intermediate ones.
//!
//! Phases are never cancelled. A phase started under a configuration that
//! has since been replaced still completes; its completion releases the
//! render target and the controller moves on to whatever is current.

use marquee_core::{ConfigVersion, DisplayTarget, Generation, RotationKey, TransitionPhase};
use serde::{Deserialize, Serialize};

/// A request to put `target` on screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShowRequest {
    pub target: DisplayTarget,
    pub generation: Generation,
    pub config_version: ConfigVersion,
    /// Re-render even when `target` is already displayed.
    pub forced: bool,
}

/// Why a request was not honoured.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DropReason {
    /// Issued under a configuration that has been replaced.
    StaleConfig,
    /// A newer request was already accepted.
    Superseded,
}

/// Work the coordinator must start.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PhaseCommand {
    /// Animate the mounted content out.
    AnimateOut { generation: Generation },
    /// Resolve `target` from the cache, render it and animate it in.
    RenderIn {
        target: DisplayTarget,
        generation: Generation,
        forced: bool,
    },
}

impl PhaseCommand {
    pub fn generation(&self) -> Generation {
        match self {
            Self::AnimateOut { generation } | Self::RenderIn { generation, .. } => *generation,
        }
    }

    pub fn phase(&self) -> TransitionPhase {
        match self {
            Self::AnimateOut { .. } => TransitionPhase::AnimatingOut,
            Self::RenderIn { .. } => TransitionPhase::AnimatingIn,
        }
    }
}

/// Result of [`TransitionController::request_show`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestOutcome {
    /// Accepted and a phase must start now.
    Started(PhaseCommand),
    /// Accepted; runs once the current phase completes.
    Queued,
    /// The target is already displayed and the request was not forced.
    AlreadyShown,
    Dropped(DropReason),
}

#[derive(Debug, Default)]
pub struct TransitionController {
    phase: TransitionPhase,
    /// Content mounted on the render target once idle.
    displayed: Option<DisplayTarget>,
    /// Request driving the running phase.
    active: Option<ShowRequest>,
    /// Newest request accepted while a phase was running.
    pending: Option<ShowRequest>,
    issued: Generation,
    latest_accepted: Generation,
}

impl TransitionController {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate the generation for a new request.
    pub fn issue(&mut self) -> Generation {
        self.issued = self.issued.next();
        self.issued
    }

    pub fn request_show(&mut self, request: ShowRequest, live: ConfigVersion) -> RequestOutcome {
        if request.config_version != live {
            return RequestOutcome::Dropped(DropReason::StaleConfig);
        }
        if request.generation < self.latest_accepted {
            return RequestOutcome::Dropped(DropReason::Superseded);
        }
        if !request.forced && self.settling_on(&request.target) {
            // Newest intent is what is already on its way in; an older
            // pending target would only be a detour. A pending forced
            // refresh of the same target still runs.
            if let Some(pending) = self.pending.take() {
                if pending.target == request.target {
                    self.pending = Some(pending);
                } else {
                    tracing::trace!(generation = %pending.generation, "Pending transition superseded");
                }
            }
            self.latest_accepted = request.generation;
            return RequestOutcome::AlreadyShown;
        }

        self.latest_accepted = request.generation;
        if self.phase.is_animating() {
            if let Some(replaced) = self.pending.replace(request) {
                tracing::trace!(generation = %replaced.generation, "Pending transition superseded");
            }
            return RequestOutcome::Queued;
        }
        RequestOutcome::Started(self.begin(request))
    }

    /// Handle completion (success, failure or timeout) of the running phase
    /// started for `generation`. Completions that do not match the running
    /// phase are ignored.
    pub fn phase_completed(
        &mut self,
        generation: Generation,
        live: ConfigVersion,
    ) -> Option<PhaseCommand> {
        let matches = self
            .active
            .as_ref()
            .is_some_and(|active| active.generation == generation);
        if !matches || !self.phase.is_animating() {
            tracing::trace!(%generation, "Ignoring completion for a phase that is not running");
            return None;
        }

        match self.phase {
            TransitionPhase::AnimatingOut => {
                self.displayed = None;
                let finished = self.active.take()?;
                let next = self.pending.take().unwrap_or(finished);
                if next.config_version != live {
                    self.phase = TransitionPhase::Idle;
                    return None;
                }
                Some(self.enter(next))
            }
            TransitionPhase::AnimatingIn => {
                let finished = self.active.take()?;
                self.displayed = Some(finished.target);
                self.phase = TransitionPhase::Idle;
                let next = self.pending.take()?;
                Some(self.begin(next))
            }
            TransitionPhase::Idle => None,
        }
    }

    /// Forget pending work issued under any version other than `live`.
    /// A running phase is left to complete.
    pub fn invalidate(&mut self, live: ConfigVersion) {
        if self
            .pending
            .as_ref()
            .is_some_and(|pending| pending.config_version != live)
        {
            self.pending = None;
        }
    }

    /// Whether the screen is showing `target`, or animating it in.
    fn settling_on(&self, target: &DisplayTarget) -> bool {
        match self.phase {
            TransitionPhase::Idle => self.displayed.as_ref() == Some(target),
            TransitionPhase::AnimatingIn => self
                .active
                .as_ref()
                .is_some_and(|active| &active.target == target),
            TransitionPhase::AnimatingOut => false,
        }
    }

    fn begin(&mut self, request: ShowRequest) -> PhaseCommand {
        if self.displayed.is_some() {
            let command = PhaseCommand::AnimateOut {
                generation: request.generation,
            };
            self.phase = TransitionPhase::AnimatingOut;
            self.active = Some(request);
            command
        } else {
            self.enter(request)
        }
    }

    fn enter(&mut self, request: ShowRequest) -> PhaseCommand {
        let command = PhaseCommand::RenderIn {
            target: request.target.clone(),
            generation: request.generation,
            forced: request.forced,
        };
        self.phase = TransitionPhase::AnimatingIn;
        self.active = Some(request);
        command
    }

    pub fn phase(&self) -> TransitionPhase {
        self.phase
    }

    /// Target mounted while idle (the empty state included).
    pub fn displayed(&self) -> Option<&DisplayTarget> {
        self.displayed.as_ref()
    }

    /// Key of the entry on screen, `None` for the empty state or nothing.
    pub fn displayed_key(&self) -> Option<&RotationKey> {
        self.displayed.as_ref().and_then(DisplayTarget::key)
    }

    /// Key whose fresh data must force a re-render: the idle entry, or the
    /// entry animating in (its render may predate the data). Nothing while a
    /// newer request is pending, since the screen is about to change anyway.
    pub fn showing_key(&self) -> Option<&RotationKey> {
        if self.pending.is_some() {
            return None;
        }
        match self.phase {
            TransitionPhase::Idle => self.displayed_key(),
            TransitionPhase::AnimatingIn => self.active.as_ref().and_then(|a| a.target.key()),
            TransitionPhase::AnimatingOut => None,
        }
    }

    pub fn latest_generation(&self) -> Generation {
        self.latest_accepted
    }

    pub fn has_pending(&self) -> bool {
        self.pending.is_some()
    }
}
