//! User domain types.
//!
//! These types represent validated domain objects separate from database row types.
//! The password hash is deliberately absent: it never leaves the repository.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::Serialize;

use storerate_core::{Email, Role, UserId};

use super::listing::SortParseError;
use super::store::StoreWithRating;

/// A registered account (domain type).
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Unique user ID.
    pub id: UserId,
    /// Display name (20-60 characters).
    pub name: String,
    /// Login email, unique case-insensitively.
    pub email: Email,
    /// Postal address (up to 400 characters).
    pub address: String,
    /// Role fixed at creation.
    pub role: Role,
    /// When the user was created.
    pub created_at: DateTime<Utc>,
    /// When the user was last updated.
    pub updated_at: DateTime<Utc>,
}

/// Admin view of a single user.
///
/// Store owners additionally carry the store they own with its rating summary.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserDetails {
    #[serde(flatten)]
    pub user: User,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub store: Option<StoreWithRating>,
}

/// Filters accepted by the user listing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserFilter {
    pub name: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
    pub role: Option<Role>,
}

/// Columns the user listing can be sorted by.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum UserSortField {
    #[default]
    Name,
    Email,
    Address,
    Role,
    CreatedAt,
}

impl UserSortField {
    /// Column expression used in `ORDER BY`.
    #[must_use]
    pub const fn column(self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::Email => "email",
            Self::Address => "address",
            Self::Role => "role",
            Self::CreatedAt => "created_at",
        }
    }
}

impl FromStr for UserSortField {
    type Err = SortParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "name" => Ok(Self::Name),
            "email" => Ok(Self::Email),
            "address" => Ok(Self::Address),
            "role" => Ok(Self::Role),
            "createdAt" | "created_at" => Ok(Self::CreatedAt),
            _ => Err(SortParseError {
                kind: "sort field",
                value: s.to_owned(),
            }),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_sort_field_parse() {
        assert_eq!("role".parse::<UserSortField>().unwrap(), UserSortField::Role);
        assert_eq!(
            "createdAt".parse::<UserSortField>().unwrap(),
            UserSortField::CreatedAt
        );
        assert!("password_hash".parse::<UserSortField>().is_err());
        assert!("rating".parse::<UserSortField>().is_err());
    }

    #[test]
    fn test_user_serializes_without_password() {
        let user = User {
            id: UserId::new(7),
            name: "A sufficiently long name".to_owned(),
            email: Email::parse("someone@example.com").unwrap(),
            address: "1 Main St".to_owned(),
            role: Role::StoreOwner,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        let json = serde_json::to_value(&user).unwrap();
        assert_eq!(json["id"], 7);
        assert_eq!(json["role"], "store_owner");
        assert!(json.get("createdAt").is_some());
        assert!(json.get("password").is_none());
        assert!(json.get("passwordHash").is_none());
    }
}
