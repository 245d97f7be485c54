//! Database operations for the `athletes` table.

use sqlx::PgPool;
use uuid::Uuid;

use crate::DbError;

/// Recompute an athlete's `total_reach` as the sum of follower counts across
/// their social profiles. Derived data, so it is recomputed in full rather
/// than adjusted incrementally.
///
/// # Errors
///
/// Returns [`DbError::NotFound`] if no such athlete exists, or
/// [`DbError::Sqlx`] if the query fails.
pub async fn recompute_athlete_reach(pool: &PgPool, athlete_id: Uuid) -> Result<(), DbError> {
    let result = sqlx::query(
        "UPDATE athletes \
         SET total_reach = COALESCE(( \
             SELECT SUM(followers) FROM social_profiles WHERE athlete_id = $1 \
         ), 0), \
             updated_at = NOW() \
         WHERE id = $1",
    )
    .bind(athlete_id)
    .execute(pool)
    .await?;
    if result.rows_affected() == 0 {
        return Err(DbError::NotFound);
    }
    Ok(())
}
