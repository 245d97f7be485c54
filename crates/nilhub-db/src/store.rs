//! Postgres-backed implementation of the metrics store used by the scrape
//! engine.

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use nilhub_core::{MetricsStore, ProfileMetrics, ProfileRef};

use crate::{athletes, profiles};

/// [`MetricsStore`] over a shared connection pool.
#[derive(Clone)]
pub struct PgMetricsStore {
    pool: PgPool,
}

impl PgMetricsStore {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl MetricsStore for PgMetricsStore {
    async fn scrapeable_profiles(&self) -> anyhow::Result<Vec<ProfileRef>> {
        Ok(profiles::list_scrapeable_profiles(&self.pool).await?)
    }

    async fn profiles_for_athlete(&self, athlete_id: Uuid) -> anyhow::Result<Vec<ProfileRef>> {
        Ok(profiles::list_profiles_for_athlete(&self.pool, athlete_id).await?)
    }

    async fn mark_pending(&self, profile_id: Uuid) -> anyhow::Result<()> {
        Ok(profiles::mark_profile_pending(&self.pool, profile_id).await?)
    }

    async fn record_success(&self, profile_id: Uuid, metrics: ProfileMetrics) -> anyhow::Result<()> {
        Ok(profiles::record_scrape_success(&self.pool, profile_id, metrics).await?)
    }

    async fn record_failure(&self, profile_id: Uuid, error: &str) -> anyhow::Result<()> {
        Ok(profiles::record_scrape_failure(&self.pool, profile_id, error).await?)
    }

    async fn recompute_athlete_reach(&self, athlete_id: Uuid) -> anyhow::Result<()> {
        Ok(athletes::recompute_athlete_reach(&self.pool, athlete_id).await?)
    }
}
