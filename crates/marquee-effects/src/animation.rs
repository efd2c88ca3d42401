//! Animation handlers.
//!
//! The real visual effect lives in the render surface; these handlers only
//! account for how long it takes so the coordinator waits the right time.

use std::sync::Arc;

use async_trait::async_trait;
use marquee_core::effects::{AnimationError, Animator, PhysicalTimeEffects};
use marquee_core::AnimationStep;

/// Waits out each step's configured duration.
#[derive(Clone)]
pub struct TimedAnimator {
    time: Arc<dyn PhysicalTimeEffects>,
}

impl TimedAnimator {
    pub fn new(time: Arc<dyn PhysicalTimeEffects>) -> Self {
        Self { time }
    }

    async fn wait(&self, step: &AnimationStep) -> Result<(), AnimationError> {
        if step.duration_ms == 0 {
            return Ok(());
        }
        self.time
            .sleep_ms(step.duration_ms)
            .await
            .map_err(|e| AnimationError::EffectFailed {
                reason: e.to_string(),
            })
    }
}

impl std::fmt::Debug for TimedAnimator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TimedAnimator").finish_non_exhaustive()
    }
}

#[async_trait]
impl Animator for TimedAnimator {
    async fn animate_out(&self, step: &AnimationStep) -> Result<(), AnimationError> {
        tracing::trace!(style = %step.style, duration_ms = step.duration_ms, "animate out");
        self.wait(step).await
    }

    async fn animate_in(&self, step: &AnimationStep) -> Result<(), AnimationError> {
        tracing::trace!(style = %step.style, duration_ms = step.duration_ms, "animate in");
        self.wait(step).await
    }
}

/// Completes every step immediately.
#[derive(Debug, Clone, Copy, Default)]
pub struct InstantAnimator;

#[async_trait]
impl Animator for InstantAnimator {
    async fn animate_out(&self, _step: &AnimationStep) -> Result<(), AnimationError> {
        Ok(())
    }

    async fn animate_in(&self, _step: &AnimationStep) -> Result<(), AnimationError> {
        Ok(())
    }
}
