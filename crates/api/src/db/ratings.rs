//! Rating repository for database operations.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use storerate_core::{Email, RatingId, RatingValue, StoreId, UserId};

use super::{RepositoryError, is_foreign_key_violation, is_unique_violation};
use crate::models::rating::{Rater, Rating, RatingSummary, RatingWithRater};

const RATING_COLUMNS: &str = "id, rating, user_id, store_id, created_at, updated_at";

// =============================================================================
// Internal Row Types
// =============================================================================

/// Internal row type for `PostgreSQL` rating queries.
#[derive(Debug, sqlx::FromRow)]
struct RatingRow {
    id: i32,
    rating: RatingValue,
    user_id: i32,
    store_id: i32,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<RatingRow> for Rating {
    fn from(row: RatingRow) -> Self {
        Self {
            id: RatingId::new(row.id),
            rating: row.rating,
            user_id: UserId::new(row.user_id),
            store_id: StoreId::new(row.store_id),
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// Rating row joined with the rater's name and email.
#[derive(Debug, sqlx::FromRow)]
struct RatingWithRaterRow {
    #[sqlx(flatten)]
    rating: RatingRow,
    rater_name: String,
    rater_email: String,
}

impl TryFrom<RatingWithRaterRow> for RatingWithRater {
    type Error = RepositoryError;

    fn try_from(row: RatingWithRaterRow) -> Result<Self, Self::Error> {
        let email = Email::parse(&row.rater_email).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid email in database: {e}"))
        })?;

        Ok(Self {
            rating: row.rating.into(),
            user: Rater {
                name: row.rater_name,
                email,
            },
        })
    }
}

// =============================================================================
// Repository
// =============================================================================

/// Repository for rating database operations.
pub struct RatingRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> RatingRepository<'a> {
    /// Create a new rating repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Record a user's rating of a store.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the user already rated the store.
    /// Returns `RepositoryError::NotFound` if the store (or user) does not exist.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn create(
        &self,
        user_id: UserId,
        store_id: StoreId,
        value: RatingValue,
    ) -> Result<Rating, RepositoryError> {
        let row = sqlx::query_as::<_, RatingRow>(&format!(
            r"
            INSERT INTO ratings (rating, user_id, store_id)
            VALUES ($1, $2, $3)
            RETURNING {RATING_COLUMNS}
            "
        ))
        .bind(value)
        .bind(user_id.as_i32())
        .bind(store_id.as_i32())
        .fetch_one(self.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                return RepositoryError::Conflict("rating already exists".to_owned());
            }
            if is_foreign_key_violation(&e) {
                return RepositoryError::NotFound;
            }
            RepositoryError::Database(e)
        })?;

        Ok(row.into())
    }

    /// Change the value of a rating owned by `user_id`.
    ///
    /// Returns `None` when the rating does not exist or belongs to someone else.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn update_value(
        &self,
        id: RatingId,
        user_id: UserId,
        value: RatingValue,
    ) -> Result<Option<Rating>, RepositoryError> {
        let row = sqlx::query_as::<_, RatingRow>(&format!(
            r"
            UPDATE ratings
            SET rating = $3, updated_at = NOW()
            WHERE id = $1 AND user_id = $2
            RETURNING {RATING_COLUMNS}
            "
        ))
        .bind(id.as_i32())
        .bind(user_id.as_i32())
        .bind(value)
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(Into::into))
    }

    /// Get the rating `user_id` gave `store_id`, if any.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_for_user_and_store(
        &self,
        user_id: UserId,
        store_id: StoreId,
    ) -> Result<Option<Rating>, RepositoryError> {
        let row = sqlx::query_as::<_, RatingRow>(&format!(
            "SELECT {RATING_COLUMNS} FROM ratings WHERE user_id = $1 AND store_id = $2"
        ))
        .bind(user_id.as_i32())
        .bind(store_id.as_i32())
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(Into::into))
    }

    /// List a store's ratings with their raters, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if a rater email is invalid.
    pub async fn list_for_store_with_raters(
        &self,
        store_id: StoreId,
    ) -> Result<Vec<RatingWithRater>, RepositoryError> {
        let rows = sqlx::query_as::<_, RatingWithRaterRow>(
            r"
            SELECT r.id, r.rating, r.user_id, r.store_id, r.created_at, r.updated_at,
                   u.name AS rater_name, u.email AS rater_email
            FROM ratings r
            JOIN users u ON u.id = r.user_id
            WHERE r.store_id = $1
            ORDER BY r.created_at DESC, r.id DESC
            ",
        )
        .bind(store_id.as_i32())
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(TryInto::try_into).collect()
    }

    /// Average and count of a store's ratings.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn summary_for_store(
        &self,
        store_id: StoreId,
    ) -> Result<RatingSummary, RepositoryError> {
        let (average, count): (Option<f64>, i64) = sqlx::query_as(
            "SELECT AVG(rating)::float8, COUNT(*) FROM ratings WHERE store_id = $1",
        )
        .bind(store_id.as_i32())
        .fetch_one(self.pool)
        .await?;

        Ok(RatingSummary::from_aggregate(average, count))
    }
}
