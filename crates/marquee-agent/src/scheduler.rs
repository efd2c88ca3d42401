//! # Rotation Scheduler
//!
//! Owns the single cancellable rotation timer. The scheduler knows nothing
//! about data; it only walks an index through a [`RotationSet`] and reports
//! each step through the tick handler it was started with.
//!
//! Ticks are fixed-delay (sleep, then tick) with no drift compensation. All
//! sleeps go through `PhysicalTimeEffects` so tests can drive time.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use marquee_core::effects::PhysicalTimeEffects;
use marquee_core::rotation::next_index;
use marquee_core::RotationSet;
use tokio::task::JoinHandle;

/// Callback invoked with the index to show.
pub type TickHandler = Box<dyn Fn(usize) + Send + Sync>;

/// Decrements the live-timer count when the timer task is dropped,
/// whether it ran to completion or was aborted.
struct LiveTimerGuard(Arc<AtomicUsize>);

impl LiveTimerGuard {
    fn register(count: &Arc<AtomicUsize>) -> Self {
        count.fetch_add(1, Ordering::SeqCst);
        Self(Arc::clone(count))
    }
}

impl Drop for LiveTimerGuard {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

pub struct RotationScheduler {
    time: Arc<dyn PhysicalTimeEffects>,
    timer: Option<JoinHandle<()>>,
    live_timers: Arc<AtomicUsize>,
    timers_started: u64,
    timers_stopped: u64,
}

impl RotationScheduler {
    pub fn new(time: Arc<dyn PhysicalTimeEffects>) -> Self {
        Self {
            time,
            timer: None,
            live_timers: Arc::new(AtomicUsize::new(0)),
            timers_started: 0,
            timers_stopped: 0,
        }
    }

    /// Start rotating through `set`.
    ///
    /// `on_tick(0)` fires immediately. A recurring timer is only created when
    /// the set has more than one key and a non-zero interval; otherwise the
    /// first key stays up indefinitely. Any previous timer is stopped first.
    pub fn start(&mut self, set: &RotationSet, on_tick: TickHandler) {
        self.stop();
        if set.is_empty() {
            return;
        }

        on_tick(0);

        if !set.is_recurring() {
            tracing::debug!(keys = set.len(), "Rotation has a single entry, no timer");
            return;
        }

        let len = set.len();
        let interval_ms = set.interval_ms();
        let time = Arc::clone(&self.time);
        let guard = LiveTimerGuard::register(&self.live_timers);
        self.timer = Some(tokio::spawn(async move {
            let _guard = guard;
            let mut index = 0;
            loop {
                if let Err(err) = time.sleep_ms(interval_ms).await {
                    tracing::warn!(error = %err, "Rotation timer sleep failed, stopping rotation");
                    break;
                }
                index = next_index(index, len);
                on_tick(index);
            }
        }));
        self.timers_started += 1;
        tracing::debug!(keys = len, interval_ms, "Rotation timer started");
    }

    /// Cancel the pending timer, if any. Idempotent.
    pub fn stop(&mut self) {
        if let Some(handle) = self.timer.take() {
            handle.abort();
            self.timers_stopped += 1;
            tracing::debug!("Rotation timer stopped");
        }
    }

    /// Whether this scheduler currently owns a timer.
    pub fn is_running(&self) -> bool {
        self.timer.as_ref().is_some_and(|handle| !handle.is_finished())
    }

    /// Timer tasks that have not been dropped by the runtime yet. Aborted
    /// timers leave this count once the runtime reaps them.
    pub fn live_timers(&self) -> usize {
        self.live_timers.load(Ordering::SeqCst)
    }

    pub fn timers_started(&self) -> u64 {
        self.timers_started
    }

    pub fn timers_stopped(&self) -> u64 {
        self.timers_stopped
    }
}

impl Drop for RotationScheduler {
    fn drop(&mut self) {
        self.stop();
    }
}

impl std::fmt::Debug for RotationScheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RotationScheduler")
            .field("running", &self.is_running())
            .field("live_timers", &self.live_timers())
            .finish_non_exhaustive()
    }
}
