//! Store domain types.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::Serialize;

use storerate_core::{Email, StoreId, UserId};

use super::listing::SortParseError;
use super::rating::UserRatingRef;

/// A rateable store.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Store {
    pub id: StoreId,
    pub name: String,
    pub email: Email,
    pub address: String,
    /// The `store_owner` account managing this store, if any.
    pub owner_id: Option<UserId>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A store annotated with its rating aggregate.
///
/// `user_rating` is only serialized for authenticated listings, where it is
/// `null` when the caller has not rated the store yet.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreWithRating {
    #[serde(flatten)]
    pub store: Store,
    /// Average rating rounded to one decimal, `0` when unrated.
    pub rating: f64,
    pub total_ratings: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_rating: Option<Option<UserRatingRef>>,
}

/// Filters accepted by the store listing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StoreFilter {
    pub name: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
}

/// Columns the store listing can be sorted by.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum StoreSortField {
    #[default]
    Name,
    Email,
    Address,
    Rating,
    CreatedAt,
}

impl StoreSortField {
    /// Expression used in `ORDER BY` against the grouped listing query.
    #[must_use]
    pub const fn column(self) -> &'static str {
        match self {
            Self::Name => "s.name",
            Self::Email => "s.email",
            Self::Address => "s.address",
            Self::Rating => "COALESCE(AVG(r.rating), 0)",
            Self::CreatedAt => "s.created_at",
        }
    }
}

impl FromStr for StoreSortField {
    type Err = SortParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "name" => Ok(Self::Name),
            "email" => Ok(Self::Email),
            "address" => Ok(Self::Address),
            "rating" => Ok(Self::Rating),
            "createdAt" | "created_at" => Ok(Self::CreatedAt),
            _ => Err(SortParseError {
                kind: "sort field",
                value: s.to_owned(),
            }),
        }
    }
}
