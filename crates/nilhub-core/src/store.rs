//! Store contract consumed by the scrape engine.
//!
//! The persistent store owns athlete and profile records; the engine only
//! reads `platform`/`handle` and writes back metrics and status fields.
//! Modeling the contract as a trait keeps the orchestrator testable with an
//! in-memory store and keeps the database crate swappable.

use async_trait::async_trait;
use uuid::Uuid;

/// The slice of a social profile the engine needs to drive one scrape.
#[derive(Debug, Clone)]
pub struct ProfileRef {
    pub id: Uuid,
    pub athlete_id: Uuid,
    /// Stored platform name, matched case-insensitively against registered
    /// extractors at dispatch time.
    pub platform: String,
    /// May include or omit a leading `@`.
    pub handle: String,
}

/// Metrics written back to a profile after a successful scrape.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProfileMetrics {
    pub followers: i64,
    /// Percentage in 0–100. `None` means no engagement signal was available,
    /// which is distinct from a measured zero.
    pub avg_engagement_rate: Option<f64>,
    pub avg_views: Option<i64>,
}

#[async_trait]
pub trait MetricsStore: Send + Sync {
    /// All profiles with a non-empty handle, in the store's natural order.
    async fn scrapeable_profiles(&self) -> anyhow::Result<Vec<ProfileRef>>;

    /// Profiles with a non-empty handle belonging to one athlete.
    async fn profiles_for_athlete(&self, athlete_id: Uuid) -> anyhow::Result<Vec<ProfileRef>>;

    /// Mark a profile `pending`, clearing any prior error.
    async fn mark_pending(&self, profile_id: Uuid) -> anyhow::Result<()>;

    /// Write metrics, set `last_scraped_at` to now, mark `success`, and clear
    /// any prior error.
    async fn record_success(&self, profile_id: Uuid, metrics: ProfileMetrics)
        -> anyhow::Result<()>;

    /// Mark a profile `failed` with the given error message.
    async fn record_failure(&self, profile_id: Uuid, error: &str) -> anyhow::Result<()>;

    /// Recompute the athlete's aggregate reach (sum of followers across all
    /// of that athlete's profiles) from current profile rows.
    async fn recompute_athlete_reach(&self, athlete_id: Uuid) -> anyhow::Result<()>;
}
