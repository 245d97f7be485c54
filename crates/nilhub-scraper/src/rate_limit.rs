//! Request pacing for scrape runs.
//!
//! The engine's anti-bot posture is deliberately simple: a fixed minimum
//! interval between requests to the same platform, no backoff, no jitter.
//! Decoupling the gate from the iteration loop keeps the contract intact
//! ("no more than one request per interval per platform") even if the
//! orchestrator is ever parallelised across profiles.

use std::collections::HashMap;
use std::time::Duration;

use tokio::sync::Mutex;
use tokio::time::Instant;

use nilhub_core::Platform;

/// Fixed-interval gate keyed by platform.
pub struct RateGate {
    interval: Duration,
    slots: Mutex<HashMap<Platform, Instant>>,
}

impl RateGate {
    #[must_use]
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            slots: Mutex::new(HashMap::new()),
        }
    }

    /// Wait until at least `interval` has passed since the previous request
    /// to `platform`, then claim the next slot.
    ///
    /// Each caller claims a slot under the lock and sleeps outside it, so
    /// concurrent waiters on the same platform queue up an interval apart
    /// while different platforms proceed independently.
    pub async fn wait(&self, platform: Platform) {
        let ready_at = {
            let now = Instant::now();
            let mut slots = self.slots.lock().await;
            let ready_at = match slots.get(&platform) {
                Some(prev) => (*prev + self.interval).max(now),
                None => now,
            };
            slots.insert(platform, ready_at);
            ready_at
        };

        if ready_at > Instant::now() {
            tracing::debug!(%platform, "rate gate: waiting for request slot");
        }
        tokio::time::sleep_until(ready_at).await;
    }
}
