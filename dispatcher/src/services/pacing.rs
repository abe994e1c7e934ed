//! Pacing policies for mutating backend calls
//!
//! The tracker client awaits [`PacingPolicy::pace`] before every transition and
//! assignment, so dispatch logic never sleeps on its own.

use async_trait::async_trait;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;

use crate::traits::PacingPolicy;

/// Minimum-interval gate: consecutive calls are spaced at least `interval` apart
pub struct MinIntervalGate {
    interval: Duration,
    last_call: Mutex<Option<Instant>>,
}

impl MinIntervalGate {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            last_call: Mutex::new(None),
        }
    }

    pub fn from_millis(millis: u64) -> Self {
        Self::new(Duration::from_millis(millis))
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }
}

#[async_trait]
impl PacingPolicy for MinIntervalGate {
    async fn pace(&self) {
        let mut last_call = self.last_call.lock().await;

        if let Some(previous) = *last_call {
            let ready_at = previous + self.interval;
            if Instant::now() < ready_at {
                tracing::trace!(wait_ms = (ready_at - Instant::now()).as_millis() as u64, "Pacing backend call");
                tokio::time::sleep_until(ready_at).await;
            }
        }

        *last_call = Some(Instant::now());
    }
}

/// No spacing at all
#[derive(Debug, Clone, Copy, Default)]
pub struct NoPacing;

#[async_trait]
impl PacingPolicy for NoPacing {
    async fn pace(&self) {}
}

/// Build the configured policy; a zero interval disables pacing
pub fn pacing_from_millis(min_interval_ms: u64) -> Box<dyn PacingPolicy> {
    if min_interval_ms == 0 {
        Box::new(NoPacing)
    } else {
        Box::new(MinIntervalGate::from_millis(min_interval_ms))
    }
}

#[async_trait]
impl PacingPolicy for Box<dyn PacingPolicy> {
    async fn pace(&self) {
        self.as_ref().pace().await
    }
}
