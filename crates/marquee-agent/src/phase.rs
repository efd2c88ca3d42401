//! Transition phase execution.
//!
//! A phase is one half of a transition: animate the mounted content out, or
//! render new content and animate it in. Phases run as spawned tasks so the
//! coordinator keeps draining its mailbox while an animation plays. Each
//! effect call is bounded by the step deadline and every failure is
//! fail-open: the phase always reports completion.

use std::future::Future;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use marquee_core::effects::{AnimationError, Animator, PhysicalTimeEffects, Renderer};
use marquee_core::{AnimationStep, DisplayContent, Generation, TransitionPhase};

/// Work for one phase, fully resolved by the coordinator.
#[derive(Debug, Clone, PartialEq)]
pub enum PhaseWork {
    Out {
        generation: Generation,
        step: AnimationStep,
    },
    In {
        generation: Generation,
        content: DisplayContent,
        forced: bool,
        step: AnimationStep,
    },
}

impl PhaseWork {
    pub fn generation(&self) -> Generation {
        match self {
            Self::Out { generation, .. } | Self::In { generation, .. } => *generation,
        }
    }

    pub fn phase(&self) -> TransitionPhase {
        match self {
            Self::Out { .. } => TransitionPhase::AnimatingOut,
            Self::In { .. } => TransitionPhase::AnimatingIn,
        }
    }
}

/// Completion notice posted back to the coordinator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhaseReport {
    pub generation: Generation,
    pub phase: TransitionPhase,
    pub forced: bool,
    pub animation_failed: bool,
    pub render_failed: bool,
}

/// Counts running phases and remembers the peak.
#[derive(Debug, Default)]
pub struct PhaseGauge {
    running: AtomicUsize,
    peak: AtomicUsize,
}

impl PhaseGauge {
    pub fn enter(self: &Arc<Self>) -> PhaseGuard {
        let now = self.running.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);
        PhaseGuard(Arc::clone(self))
    }

    pub fn running(&self) -> usize {
        self.running.load(Ordering::SeqCst)
    }

    pub fn peak(&self) -> usize {
        self.peak.load(Ordering::SeqCst)
    }
}

pub struct PhaseGuard(Arc<PhaseGauge>);

impl Drop for PhaseGuard {
    fn drop(&mut self) {
        self.0.running.fetch_sub(1, Ordering::SeqCst);
    }
}

#[derive(Clone)]
pub struct PhaseRunner {
    time: Arc<dyn PhysicalTimeEffects>,
    renderer: Arc<dyn Renderer>,
    animator: Arc<dyn Animator>,
}

impl PhaseRunner {
    pub fn new(
        time: Arc<dyn PhysicalTimeEffects>,
        renderer: Arc<dyn Renderer>,
        animator: Arc<dyn Animator>,
    ) -> Self {
        Self {
            time,
            renderer,
            animator,
        }
    }

    pub async fn run(&self, work: PhaseWork) -> PhaseReport {
        match work {
            PhaseWork::Out { generation, step } => {
                let animated = self.bounded(&step, self.animator.animate_out(&step)).await;
                PhaseReport {
                    generation,
                    phase: TransitionPhase::AnimatingOut,
                    forced: false,
                    animation_failed: log_animation(generation, "out", animated),
                    render_failed: false,
                }
            }
            PhaseWork::In {
                generation,
                content,
                forced,
                step,
            } => {
                let rendered = self
                    .bounded(&step, async {
                        self.renderer
                            .render(&content, forced)
                            .await
                            .map_err(|e| AnimationError::EffectFailed {
                                reason: e.to_string(),
                            })
                    })
                    .await;
                let render_failed = match rendered {
                    Ok(()) => false,
                    Err(err) => {
                        tracing::warn!(%generation, error = %err, "Render failed, continuing transition");
                        true
                    }
                };

                let animated = self.bounded(&step, self.animator.animate_in(&step)).await;
                PhaseReport {
                    generation,
                    phase: TransitionPhase::AnimatingIn,
                    forced,
                    animation_failed: log_animation(generation, "in", animated),
                    render_failed,
                }
            }
        }
    }

    /// Race `fut` against the step deadline. `fut` is always polled first,
    /// so an effect that is ready immediately is never skipped.
    async fn bounded<F>(&self, step: &AnimationStep, fut: F) -> Result<(), AnimationError>
    where
        F: Future<Output = Result<(), AnimationError>>,
    {
        let deadline_ms = step.deadline_ms();
        tokio::select! {
            biased;

            result = fut => result,
            slept = self.time.sleep_ms(deadline_ms) => {
                if let Err(err) = slept {
                    tracing::warn!(error = %err, "Deadline timer failed");
                }
                Err(AnimationError::TimedOut { deadline_ms })
            }
        }
    }
}

impl std::fmt::Debug for PhaseRunner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PhaseRunner").finish_non_exhaustive()
    }
}

fn log_animation(
    generation: Generation,
    direction: &'static str,
    result: Result<(), AnimationError>,
) -> bool {
    match result {
        Ok(()) => false,
        Err(err) => {
            tracing::warn!(%generation, direction, error = %err, "Animation failed, completing phase");
            true
        }
    }
}
