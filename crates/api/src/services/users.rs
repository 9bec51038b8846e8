//! Admin user listing and details.

use sqlx::PgPool;

use storerate_core::{Role, UserId};

use super::ServiceError;
use super::validation::ValidationError;
use crate::db::{StoreRepository, UserRepository};
use crate::models::listing::{ListQuery, SortOrder, non_blank, parse_or_default};
use crate::models::user::{User, UserDetails, UserFilter, UserSortField};

/// Build the typed user filter and sort from a raw query string.
///
/// # Errors
///
/// Returns a `ValidationError` for an unknown sort field, order or role.
pub fn user_listing_params(
    query: &ListQuery,
) -> Result<(UserFilter, UserSortField, SortOrder), ValidationError> {
    let sort = parse_or_default::<UserSortField>(query.sort_by.as_deref())
        .map_err(|e| ValidationError::new(e.to_string()))?;
    let order = parse_or_default::<SortOrder>(query.order.as_deref())
        .map_err(|e| ValidationError::new(e.to_string()))?;
    let role = non_blank(query.role.as_deref())
        .map(|r| r.parse::<Role>())
        .transpose()
        .map_err(|_| ValidationError::new("Invalid role specified"))?;

    let filter = UserFilter {
        name: non_blank(query.name.as_deref()),
        email: non_blank(query.email.as_deref()),
        address: non_blank(query.address.as_deref()),
        role,
    };
    Ok((filter, sort, order))
}

/// User administration service.
pub struct UserService<'a> {
    users: UserRepository<'a>,
    stores: StoreRepository<'a>,
}

impl<'a> UserService<'a> {
    /// Create a new user service.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self {
            users: UserRepository::new(pool),
            stores: StoreRepository::new(pool),
        }
    }

    /// List users matching the query.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::Validation` for an unknown sort field, order or role.
    pub async fn list(&self, query: &ListQuery) -> Result<Vec<User>, ServiceError> {
        let (filter, sort, order) = user_listing_params(query)?;
        Ok(self.users.list(&filter, sort, order).await?)
    }

    /// A user's details; store owners include their store and its rating.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::NotFound` if the user does not exist.
    pub async fn details(&self, id: UserId) -> Result<UserDetails, ServiceError> {
        let user = self
            .users
            .get_by_id(id)
            .await?
            .ok_or_else(|| ServiceError::NotFound("User not found".to_owned()))?;

        let store = if user.role == Role::StoreOwner {
            match self.stores.get_by_owner(user.id).await? {
                Some(store) => self.stores.get_with_rating(store.id, None).await?,
                None => None,
            }
        } else {
            None
        };

        Ok(UserDetails { user, store })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_role_filter_is_exact() {
        let query = ListQuery {
            role: Some("store_owner".to_owned()),
            sort_by: Some("role".to_owned()),
            ..ListQuery::default()
        };
        let (filter, sort, order) = user_listing_params(&query).unwrap();
        assert_eq!(filter.role, Some(Role::StoreOwner));
        assert_eq!(sort, UserSortField::Role);
        assert_eq!(order, SortOrder::Asc);
    }

    #[test]
    fn test_unknown_role_filter() {
        let query = ListQuery {
            role: Some("owner".to_owned()),
            ..ListQuery::default()
        };
        let err = user_listing_params(&query).unwrap_err();
        assert_eq!(err.message, "Invalid role specified");
    }

    #[test]
    fn test_rating_is_not_a_user_sort_field() {
        let query = ListQuery {
            sort_by: Some("rating".to_owned()),
            ..ListQuery::default()
        };
        assert!(user_listing_params(&query).is_err());
    }
}
