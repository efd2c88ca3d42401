//! Helpers for paused Tokio time.

use std::sync::Arc;
use std::time::Duration;

use marquee_core::effects::PhysicalTimeEffects;
use marquee_effects::RealTimeHandler;

/// Clock anchored at 0 that follows the (paused) Tokio clock.
pub fn paused_clock() -> Arc<dyn PhysicalTimeEffects> {
    Arc::new(RealTimeHandler::anchored_at(0))
}

/// Let spawned tasks and channel hops run without moving the clock.
pub async fn settle() {
    for _ in 0..32 {
        tokio::task::yield_now().await;
    }
}

/// Let `ms` of paused time elapse, then settle.
pub async fn pass_ms(ms: u64) {
    tokio::time::sleep(Duration::from_millis(ms)).await;
    settle().await;
}

/// Install a test-writer subscriber once; later calls are no-ops.
pub fn init_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();
}
