//! Real time effect handler for production use

use std::time::{Duration, SystemTime, UNIX_EPOCH};

use async_trait::async_trait;
use marquee_core::effects::{PhysicalTimeEffects, TimeError};
use marquee_core::PhysicalTime;
use tokio::time::{self, Instant};

/// Tokio-backed clock.
///
/// Wall-clock time is anchored once at construction and advanced with the
/// Tokio monotonic clock afterwards, so paused Tokio time in tests also
/// pauses the timestamps this handler reports.
#[derive(Debug, Clone)]
pub struct RealTimeHandler {
    origin_ms: u64,
    origin: Instant,
}

impl Default for RealTimeHandler {
    fn default() -> Self {
        Self::new()
    }
}

impl RealTimeHandler {
    /// Create a handler anchored at the current system time
    pub fn new() -> Self {
        let origin_ms = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or(Duration::ZERO)
            .as_millis()
            .try_into()
            .unwrap_or(u64::MAX);
        Self::anchored_at(origin_ms)
    }

    /// Create a handler reporting `origin_ms` right now
    pub fn anchored_at(origin_ms: u64) -> Self {
        Self {
            origin_ms,
            origin: Instant::now(),
        }
    }

    fn now_ms(&self) -> u64 {
        let elapsed: u64 = self.origin.elapsed().as_millis().try_into().unwrap_or(u64::MAX);
        self.origin_ms.saturating_add(elapsed)
    }
}

#[async_trait]
impl PhysicalTimeEffects for RealTimeHandler {
    async fn physical_time(&self) -> Result<PhysicalTime, TimeError> {
        Ok(PhysicalTime::from_ms(self.now_ms()))
    }

    async fn sleep_ms(&self, ms: u64) -> Result<(), TimeError> {
        time::sleep(Duration::from_millis(ms)).await;
        Ok(())
    }
}
