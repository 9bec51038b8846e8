//! Rating submission and aggregation.

use serde::Deserialize;
use serde_json::Value;
use sqlx::PgPool;

use storerate_core::{RatingId, RatingValue, StoreId, UserId};

use super::ServiceError;
use super::validation::{ValidationError, integer_from_json};
use crate::db::{RatingRepository, RepositoryError, StoreRepository, stats};
use crate::models::rating::{DashboardStats, OwnerRatingReport, Rating, RatingSummary};

const INVALID_RATING: &str = "Invalid rating. Must be between 1 and 5.";
const ALREADY_RATED: &str =
    "You have already rated this store; update your existing rating instead";

/// Rating submission as sent by the client.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitRating {
    pub store_id: Option<Value>,
    pub rating: Option<Value>,
}

/// Rating change as sent by the client.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateRating {
    pub rating: Option<Value>,
}

/// Parse a rating that may arrive as a number or a numeric string.
///
/// # Errors
///
/// Returns a `ValidationError` unless the value is an integer in 1-5.
pub fn parse_rating(value: Option<&Value>) -> Result<RatingValue, ValidationError> {
    value
        .and_then(integer_from_json)
        .and_then(|v| RatingValue::new(v).ok())
        .ok_or_else(|| ValidationError::new(INVALID_RATING))
}

fn parse_store_id(value: Option<&Value>) -> Result<StoreId, ValidationError> {
    value
        .and_then(integer_from_json)
        .and_then(|v| i32::try_from(v).ok())
        .map(StoreId::new)
        .ok_or_else(|| ValidationError::new("Store ID is required"))
}

/// Rating and aggregation service.
pub struct RatingService<'a> {
    pool: &'a PgPool,
    ratings: RatingRepository<'a>,
    stores: StoreRepository<'a>,
}

impl<'a> RatingService<'a> {
    /// Create a new rating service.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self {
            pool,
            ratings: RatingRepository::new(pool),
            stores: StoreRepository::new(pool),
        }
    }

    /// Record the caller's first rating of a store.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::Validation` for a missing store ID or an out-of-range rating.
    /// Returns `ServiceError::NotFound` if the store does not exist.
    /// Returns `ServiceError::Conflict` if the caller already rated the store.
    pub async fn submit(
        &self,
        user_id: UserId,
        request: &SubmitRating,
    ) -> Result<Rating, ServiceError> {
        let store_id = parse_store_id(request.store_id.as_ref())?;
        let value = parse_rating(request.rating.as_ref())?;

        let rating = self
            .ratings
            .create(user_id, store_id, value)
            .await
            .map_err(|e| match e {
                RepositoryError::Conflict(_) => ServiceError::Conflict(ALREADY_RATED.to_owned()),
                RepositoryError::NotFound => ServiceError::NotFound("Store not found".to_owned()),
                other => ServiceError::Repository(other),
            })?;

        tracing::info!(
            rating_id = %rating.id,
            store_id = %store_id,
            user_id = %user_id,
            "Rating submitted"
        );
        Ok(rating)
    }

    /// Change the value of one of the caller's ratings.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::Validation` for an out-of-range rating.
    /// Returns `ServiceError::NotFound` if the rating does not exist or is not the caller's.
    pub async fn update(
        &self,
        rating_id: RatingId,
        user_id: UserId,
        request: &UpdateRating,
    ) -> Result<Rating, ServiceError> {
        let value = parse_rating(request.rating.as_ref())?;

        self.ratings
            .update_value(rating_id, user_id, value)
            .await?
            .ok_or_else(|| ServiceError::NotFound("Rating not found or unauthorized".to_owned()))
    }

    /// The caller's rating for a store, if any.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::Repository` if the lookup fails.
    pub async fn for_user_and_store(
        &self,
        user_id: UserId,
        store_id: StoreId,
    ) -> Result<Option<Rating>, ServiceError> {
        Ok(self
            .ratings
            .get_for_user_and_store(user_id, store_id)
            .await?)
    }

    /// Average (one decimal) and count of a store's ratings.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::Repository` if the query fails.
    pub async fn store_summary(&self, store_id: StoreId) -> Result<RatingSummary, ServiceError> {
        Ok(self.ratings.summary_for_store(store_id).await?)
    }

    /// The owner's store with its ratings (newest first) and summary.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::NotFound` if the owner has no store.
    pub async fn owner_report(&self, owner: UserId) -> Result<OwnerRatingReport, ServiceError> {
        let store = self
            .stores
            .get_by_owner(owner)
            .await?
            .ok_or_else(|| ServiceError::NotFound("No store found for this owner".to_owned()))?;

        let ratings = self.ratings.list_for_store_with_raters(store.id).await?;
        let stats = self.store_summary(store.id).await?;

        Ok(OwnerRatingReport {
            store,
            ratings,
            stats,
        })
    }

    /// Platform-wide user, store and rating counts.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::Repository` if the query fails.
    pub async fn dashboard_stats(&self) -> Result<DashboardStats, ServiceError> {
        Ok(stats::dashboard_stats(self.pool).await?)
    }
}
