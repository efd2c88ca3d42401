//! Visual transition interface.

use async_trait::async_trait;

use crate::settings::AnimationStep;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AnimationError {
    #[error("Animation effect failed: {reason}")]
    EffectFailed { reason: String },
    #[error("Animation exceeded {deadline_ms}ms")]
    TimedOut { deadline_ms: u64 },
}

/// Plays the leave/enter effects around a render.
///
/// Animations are not interruptible: once started, the coordinator waits for
/// them (bounded by [`AnimationStep::deadline_ms`]) and never cancels them.
#[async_trait]
pub trait Animator: Send + Sync {
    async fn animate_out(&self, step: &AnimationStep) -> Result<(), AnimationError>;
    async fn animate_in(&self, step: &AnimationStep) -> Result<(), AnimationError>;
}

#[async_trait]
impl<T: Animator + ?Sized> Animator for std::sync::Arc<T> {
    async fn animate_out(&self, step: &AnimationStep) -> Result<(), AnimationError> {
        (**self).animate_out(step).await
    }

    async fn animate_in(&self, step: &AnimationStep) -> Result<(), AnimationError> {
        (**self).animate_in(step).await
    }
}
