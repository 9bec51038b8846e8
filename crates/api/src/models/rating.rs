//! Rating and aggregation types.

use chrono::{DateTime, Utc};
use serde::Serialize;

use storerate_core::{Email, RatingId, RatingValue, StoreId, UserId};

use super::store::Store;

/// A single user's score for a store.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Rating {
    pub id: RatingId,
    pub rating: RatingValue,
    pub user_id: UserId,
    pub store_id: StoreId,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// The caller's own rating, attached to store listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct UserRatingRef {
    pub id: RatingId,
    pub rating: i32,
}

/// Public identity of whoever submitted a rating.
#[derive(Debug, Clone, Serialize)]
pub struct Rater {
    pub name: String,
    pub email: Email,
}

/// A rating joined with its rater, as shown to store owners.
#[derive(Debug, Clone, Serialize)]
pub struct RatingWithRater {
    #[serde(flatten)]
    pub rating: Rating,
    pub user: Rater,
}

/// Average and count of a store's ratings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RatingSummary {
    pub average_rating: f64,
    pub total_ratings: i64,
}

impl RatingSummary {
    /// Build a summary from a raw SQL aggregate.
    ///
    /// `AVG` yields `NULL` for a store without ratings, which becomes `0`.
    #[must_use]
    pub fn from_aggregate(average: Option<f64>, count: i64) -> Self {
        Self {
            average_rating: round_average(average),
            total_ratings: count,
        }
    }
}

/// Round an average to one decimal place, half away from zero.
#[must_use]
pub fn round_average(average: Option<f64>) -> f64 {
    average.map_or(0.0, |avg| (avg * 10.0).round() / 10.0)
}

/// Everything a store owner sees on their dashboard.
#[derive(Debug, Clone, Serialize)]
pub struct OwnerRatingReport {
    pub store: Store,
    /// Newest first.
    pub ratings: Vec<RatingWithRater>,
    pub stats: RatingSummary,
}

/// Platform-wide counts for the admin dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub total_users: i64,
    pub total_stores: i64,
    pub total_ratings: i64,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_summary_of_unrated_store_is_zero() {
        let summary = RatingSummary::from_aggregate(None, 0);
        assert!(summary.average_rating.abs() < f64::EPSILON);
        assert_eq!(summary.total_ratings, 0);
    }

    #[test]
    fn test_round_average_one_decimal() {
        assert!((round_average(Some(4.0)) - 4.0).abs() < f64::EPSILON);
        assert!((round_average(Some(11.0 / 3.0)) - 3.7).abs() < 1e-9);
        assert!((round_average(Some(4.25)) - 4.3).abs() < 1e-9);
        assert!((round_average(Some(2.04)) - 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_summary_serializes_camel_case() {
        let json = serde_json::to_value(RatingSummary::from_aggregate(Some(4.5), 2)).unwrap();
        assert_eq!(json["averageRating"], 4.5);
        assert_eq!(json["totalRatings"], 2);
    }

    #[test]
    fn test_rating_with_rater_shape() {
        let entry = RatingWithRater {
            rating: Rating {
                id: RatingId::new(1),
                rating: RatingValue::new(5).unwrap(),
                user_id: UserId::new(2),
                store_id: StoreId::new(3),
                created_at: Utc::now(),
                updated_at: Utc::now(),
            },
            user: Rater {
                name: "Someone with a long name".to_owned(),
                email: Email::parse("rater@example.com").unwrap(),
            },
        };
        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json["rating"], 5);
        assert_eq!(json["storeId"], 3);
        assert_eq!(json["user"]["email"], "rater@example.com");
    }

    #[test]
    fn test_dashboard_stats_keys() {
        let json = serde_json::to_value(DashboardStats {
            total_users: 3,
            total_stores: 2,
            total_ratings: 1,
        })
        .unwrap();
        assert_eq!(json["totalUsers"], 3);
        assert_eq!(json["totalStores"], 2);
        assert_eq!(json["totalRatings"], 1);
    }
}
