//! Animator double with a per-direction script.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use marquee_core::effects::{AnimationError, Animator, PhysicalTimeEffects};
use marquee_core::{AnimationDirection, AnimationStep};
use parking_lot::Mutex;

/// What an animation step does when played.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepScript {
    /// Finish after the given time.
    Succeed(u64),
    /// Finish after the step's configured duration.
    Configured,
    /// Fail immediately.
    Fail,
    /// Never finish.
    Hang,
}

pub struct ScriptedAnimator {
    time: Arc<dyn PhysicalTimeEffects>,
    out: Mutex<StepScript>,
    enter: Mutex<StepScript>,
    active: AtomicUsize,
    max_active: AtomicUsize,
    played: Mutex<Vec<AnimationDirection>>,
}

impl ScriptedAnimator {
    pub fn new(time: Arc<dyn PhysicalTimeEffects>, out: StepScript, enter: StepScript) -> Self {
        Self {
            time,
            out: Mutex::new(out),
            enter: Mutex::new(enter),
            active: AtomicUsize::new(0),
            max_active: AtomicUsize::new(0),
            played: Mutex::new(Vec::new()),
        }
    }

    /// Both directions take their configured duration.
    pub fn configured(time: Arc<dyn PhysicalTimeEffects>) -> Self {
        Self::new(time, StepScript::Configured, StepScript::Configured)
    }

    pub fn instant(time: Arc<dyn PhysicalTimeEffects>) -> Self {
        Self::new(time, StepScript::Succeed(0), StepScript::Succeed(0))
    }

    pub fn set_script(&self, direction: AnimationDirection, script: StepScript) {
        match direction {
            AnimationDirection::Out => *self.out.lock() = script,
            AnimationDirection::In => *self.enter.lock() = script,
        }
    }

    /// Highest number of animations ever playing at once.
    pub fn max_active(&self) -> usize {
        self.max_active.load(Ordering::SeqCst)
    }

    pub fn played(&self) -> Vec<AnimationDirection> {
        self.played.lock().clone()
    }

    async fn play(&self, step: &AnimationStep, script: StepScript) -> Result<(), AnimationError> {
        self.played.lock().push(step.direction);
        let now = self.active.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_active.fetch_max(now, Ordering::SeqCst);
        let _active = ActiveGuard(&self.active);

        let wait_ms = match script {
            StepScript::Succeed(ms) => ms,
            StepScript::Configured => step.duration_ms,
            StepScript::Fail => {
                return Err(AnimationError::EffectFailed {
                    reason: "scripted failure".to_string(),
                })
            }
            StepScript::Hang => return std::future::pending().await,
        };
        if wait_ms > 0 {
            self.time
                .sleep_ms(wait_ms)
                .await
                .map_err(|e| AnimationError::EffectFailed {
                    reason: e.to_string(),
                })?;
        }
        Ok(())
    }
}

struct ActiveGuard<'a>(&'a AtomicUsize);

impl Drop for ActiveGuard<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl Animator for ScriptedAnimator {
    async fn animate_out(&self, step: &AnimationStep) -> Result<(), AnimationError> {
        let script = *self.out.lock();
        self.play(step, script).await
    }

    async fn animate_in(&self, step: &AnimationStep) -> Result<(), AnimationError> {
        let script = *self.enter.lock();
        self.play(step, script).await
    }
}

impl std::fmt::Debug for ScriptedAnimator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScriptedAnimator")
            .field("out", &*self.out.lock())
            .field("enter", &*self.enter.lock())
            .field("max_active", &self.max_active())
            .finish_non_exhaustive()
    }
}
