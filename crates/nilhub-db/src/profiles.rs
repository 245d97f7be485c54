//! Database operations for the `social_profiles` table.
//!
//! The scrape engine only reads the dispatch fields (`platform`, `handle`)
//! and writes the metrics + status fields; profile CRUD belongs to the web
//! layer and is not represented here.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use nilhub_core::{ProfileMetrics, ProfileRef, ScrapingStatus};

use crate::DbError;

/// A row from the `social_profiles` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct SocialProfileRow {
    pub id: Uuid,
    pub athlete_id: Uuid,
    pub platform: String,
    pub handle: String,
    pub followers: i64,
    pub avg_engagement_rate: Option<f64>,
    pub avg_views: Option<i64>,
    pub posting_cadence: Option<String>,
    pub last_scraped_at: Option<DateTime<Utc>>,
    pub scraping_status: String,
    pub scraping_error: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// All profiles with a non-empty handle, in insertion order.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_scrapeable_profiles(pool: &PgPool) -> Result<Vec<ProfileRef>, DbError> {
    let rows = sqlx::query_as::<_, SocialProfileRow>(
        "SELECT * FROM social_profiles \
         WHERE btrim(handle) <> '' \
         ORDER BY created_at, id",
    )
    .fetch_all(pool)
    .await?;
    Ok(rows.into_iter().map(into_profile_ref).collect())
}

/// Profiles with a non-empty handle belonging to one athlete.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_profiles_for_athlete(
    pool: &PgPool,
    athlete_id: Uuid,
) -> Result<Vec<ProfileRef>, DbError> {
    let rows = sqlx::query_as::<_, SocialProfileRow>(
        "SELECT * FROM social_profiles \
         WHERE athlete_id = $1 AND btrim(handle) <> '' \
         ORDER BY created_at, id",
    )
    .bind(athlete_id)
    .fetch_all(pool)
    .await?;
    Ok(rows.into_iter().map(into_profile_ref).collect())
}

fn into_profile_ref(row: SocialProfileRow) -> ProfileRef {
    ProfileRef {
        id: row.id,
        athlete_id: row.athlete_id,
        platform: row.platform,
        handle: row.handle,
    }
}

/// Mark a profile `pending` and clear any prior error.
///
/// # Errors
///
/// Returns [`DbError::NotFound`] if no such profile exists, or
/// [`DbError::Sqlx`] if the query fails.
pub async fn mark_profile_pending(pool: &PgPool, profile_id: Uuid) -> Result<(), DbError> {
    let result = sqlx::query(
        "UPDATE social_profiles \
         SET scraping_status = $2, scraping_error = NULL, updated_at = NOW() \
         WHERE id = $1",
    )
    .bind(profile_id)
    .bind(ScrapingStatus::Pending.as_str())
    .execute(pool)
    .await?;
    if result.rows_affected() == 0 {
        return Err(DbError::NotFound);
    }
    Ok(())
}

/// Write metrics for a successful scrape: followers, optional engagement and
/// views, `last_scraped_at = now`, status `success`, error cleared.
///
/// # Errors
///
/// Returns [`DbError::NotFound`] if no such profile exists, or
/// [`DbError::Sqlx`] if the query fails.
pub async fn record_scrape_success(
    pool: &PgPool,
    profile_id: Uuid,
    metrics: ProfileMetrics,
) -> Result<(), DbError> {
    let result = sqlx::query(
        "UPDATE social_profiles \
         SET followers = $2, \
             avg_engagement_rate = $3, \
             avg_views = $4, \
             last_scraped_at = NOW(), \
             scraping_status = $5, \
             scraping_error = NULL, \
             updated_at = NOW() \
         WHERE id = $1",
    )
    .bind(profile_id)
    .bind(metrics.followers)
    .bind(metrics.avg_engagement_rate)
    .bind(metrics.avg_views)
    .bind(ScrapingStatus::Success.as_str())
    .execute(pool)
    .await?;
    if result.rows_affected() == 0 {
        return Err(DbError::NotFound);
    }
    Ok(())
}

/// Mark a profile `failed` with the given error message.
///
/// # Errors
///
/// Returns [`DbError::NotFound`] if no such profile exists, or
/// [`DbError::Sqlx`] if the query fails.
pub async fn record_scrape_failure(
    pool: &PgPool,
    profile_id: Uuid,
    error: &str,
) -> Result<(), DbError> {
    let result = sqlx::query(
        "UPDATE social_profiles \
         SET scraping_status = $3, scraping_error = $2, updated_at = NOW() \
         WHERE id = $1",
    )
    .bind(profile_id)
    .bind(error)
    .bind(ScrapingStatus::Failed.as_str())
    .execute(pool)
    .await?;
    if result.rows_affected() == 0 {
        return Err(DbError::NotFound);
    }
    Ok(())
}
