//! Platform-wide counters for the admin dashboard.

use sqlx::PgPool;

use super::RepositoryError;
use crate::models::rating::DashboardStats;

#[derive(Debug, sqlx::FromRow)]
struct StatsRow {
    total_users: i64,
    total_stores: i64,
    total_ratings: i64,
}

/// Count users, stores and ratings in a single round trip.
///
/// # Errors
///
/// Returns `RepositoryError::Database` if the query fails.
pub async fn dashboard_stats(pool: &PgPool) -> Result<DashboardStats, RepositoryError> {
    let row = sqlx::query_as::<_, StatsRow>(
        r"
        SELECT (SELECT COUNT(*) FROM users) AS total_users,
               (SELECT COUNT(*) FROM stores) AS total_stores,
               (SELECT COUNT(*) FROM ratings) AS total_ratings
        ",
    )
    .fetch_one(pool)
    .await?;

    Ok(DashboardStats {
        total_users: row.total_users,
        total_stores: row.total_stores,
        total_ratings: row.total_ratings,
    })
}
