//! Store listing and admin store management.

use serde::Deserialize;
use serde_json::Value;
use sqlx::PgPool;

use storerate_core::{Email, Role, StoreId, UserId};

use super::ServiceError;
use super::validation::{
    ValidationError, char_len_between, deserialize_some, integer_from_json, present,
};
use crate::db::stores::{NewStore, StoreChanges};
use crate::db::{RepositoryError, StoreRepository, UserRepository};
use crate::models::listing::{ListQuery, SortOrder, non_blank, parse_or_default};
use crate::models::store::{Store, StoreFilter, StoreSortField, StoreWithRating};

/// Maximum store name length in characters.
pub const MAX_STORE_NAME_LENGTH: usize = 60;
/// Maximum store address length in characters.
pub const MAX_STORE_ADDRESS_LENGTH: usize = 400;

const STORE_NOT_FOUND: &str = "Store not found";
const STORE_EMAIL_TAKEN: &str = "Store email already exists";
const INVALID_OWNER: &str = "Owner must be an existing store owner";

/// New store as sent by an admin.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateStore {
    pub name: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
    pub owner_id: Option<Value>,
}

/// Partial store update as sent by an admin.
///
/// An explicit `"ownerId": null` clears the owner; omitting it keeps it.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateStore {
    pub name: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
    #[serde(default, deserialize_with = "deserialize_some")]
    pub owner_id: Option<Value>,
}

/// Turn a raw `ownerId` into an optional user ID.
///
/// `null` and `""` mean no owner.
fn parse_owner(value: &Value) -> Result<Option<UserId>, ValidationError> {
    match value {
        Value::Null => Ok(None),
        Value::String(s) if s.trim().is_empty() => Ok(None),
        other => integer_from_json(other)
            .and_then(|v| i32::try_from(v).ok())
            .map(|v| Some(UserId::new(v)))
            .ok_or_else(|| ValidationError::new(INVALID_OWNER)),
    }
}

fn name_errors(name: &str, errors: &mut Vec<String>) {
    if !char_len_between(name, 1, MAX_STORE_NAME_LENGTH) {
        errors.push(format!(
            "Store name must be between 1 and {MAX_STORE_NAME_LENGTH} characters"
        ));
    }
}

fn address_errors(address: &str, errors: &mut Vec<String>) {
    if !char_len_between(address, 1, MAX_STORE_ADDRESS_LENGTH) {
        errors.push(format!(
            "Address must be between 1 and {MAX_STORE_ADDRESS_LENGTH} characters"
        ));
    }
}

fn parse_email(email: &str, errors: &mut Vec<String>) -> Option<Email> {
    Email::parse(email)
        .map_err(|_| errors.push("Invalid email address".to_owned()))
        .ok()
}

/// Build the typed store filter and sort from a raw query string.
///
/// # Errors
///
/// Returns a `ValidationError` for an unknown sort field or order.
pub fn store_listing_params(
    query: &ListQuery,
) -> Result<(StoreFilter, StoreSortField, SortOrder), ValidationError> {
    let sort = parse_or_default::<StoreSortField>(query.sort_by.as_deref())
        .map_err(|e| ValidationError::new(e.to_string()))?;
    let order = parse_or_default::<SortOrder>(query.order.as_deref())
        .map_err(|e| ValidationError::new(e.to_string()))?;
    let filter = StoreFilter {
        name: non_blank(query.name.as_deref()),
        email: non_blank(query.email.as_deref()),
        address: non_blank(query.address.as_deref()),
    };
    Ok((filter, sort, order))
}

/// Store service.
pub struct StoreService<'a> {
    stores: StoreRepository<'a>,
    users: UserRepository<'a>,
}

impl<'a> StoreService<'a> {
    /// Create a new store service.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self {
            stores: StoreRepository::new(pool),
            users: UserRepository::new(pool),
        }
    }

    /// List stores with their rating aggregates.
    ///
    /// `viewer` adds the caller's own rating to each entry.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::Validation` for an unknown sort field or order.
    pub async fn list(
        &self,
        query: &ListQuery,
        viewer: Option<UserId>,
    ) -> Result<Vec<StoreWithRating>, ServiceError> {
        let (filter, sort, order) = store_listing_params(query)?;
        Ok(self.stores.list(&filter, sort, order, viewer).await?)
    }

    /// Get one store with its rating aggregate.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::NotFound` if the store does not exist.
    pub async fn get(
        &self,
        id: StoreId,
        viewer: Option<UserId>,
    ) -> Result<StoreWithRating, ServiceError> {
        self.stores
            .get_with_rating(id, viewer)
            .await?
            .ok_or_else(|| ServiceError::NotFound(STORE_NOT_FOUND.to_owned()))
    }

    /// Create a store.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::Validation` for missing or invalid fields or owner.
    /// Returns `ServiceError::Conflict` if the store email is taken.
    pub async fn create(&self, request: &CreateStore) -> Result<Store, ServiceError> {
        let (Some(name), Some(email), Some(address)) = (
            present(request.name.as_deref()),
            present(request.email.as_deref()),
            present(request.address.as_deref()),
        ) else {
            return Err(ValidationError::missing_fields().into());
        };

        let mut errors = Vec::new();
        name_errors(name, &mut errors);
        let email = parse_email(email, &mut errors);
        address_errors(address, &mut errors);
        let Some(email) = email.filter(|_| errors.is_empty()) else {
            return Err(ValidationError::with_errors(errors).into());
        };

        let owner_id = match &request.owner_id {
            Some(value) => parse_owner(value)?,
            None => None,
        };
        if let Some(owner) = owner_id {
            self.ensure_store_owner(owner).await?;
        }

        let store = self
            .stores
            .create(&NewStore {
                name,
                email: &email,
                address,
                owner_id,
            })
            .await
            .map_err(map_store_write_error)?;

        tracing::info!(store_id = %store.id, "Store created");
        Ok(store)
    }

    /// Apply a partial update to a store.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::Validation` for invalid provided fields or owner.
    /// Returns `ServiceError::NotFound` if the store does not exist.
    /// Returns `ServiceError::Conflict` if the new email is taken.
    pub async fn update(&self, id: StoreId, request: &UpdateStore) -> Result<Store, ServiceError> {
        let mut errors = Vec::new();
        let name = request.name.as_deref().map(str::trim);
        if let Some(name) = name {
            name_errors(name, &mut errors);
        }
        let email = request
            .email
            .as_deref()
            .map(str::trim)
            .and_then(|e| parse_email(e, &mut errors));
        let address = request.address.as_deref().map(str::trim);
        if let Some(address) = address {
            address_errors(address, &mut errors);
        }
        if !errors.is_empty() {
            return Err(ValidationError::with_errors(errors).into());
        }

        let owner_id = request.owner_id.as_ref().map(parse_owner).transpose()?;
        if let Some(Some(owner)) = owner_id {
            self.ensure_store_owner(owner).await?;
        }

        let changes = StoreChanges {
            name: name.map(String::from),
            email,
            address: address.map(String::from),
            owner_id,
        };

        let store = self
            .stores
            .update(id, &changes)
            .await
            .map_err(map_store_write_error)?
            .ok_or_else(|| ServiceError::NotFound(STORE_NOT_FOUND.to_owned()))?;

        tracing::info!(store_id = %store.id, "Store updated");
        Ok(store)
    }

    /// Delete a store together with its ratings.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::NotFound` if the store does not exist.
    pub async fn delete(&self, id: StoreId) -> Result<(), ServiceError> {
        if !self.stores.delete(id).await? {
            return Err(ServiceError::NotFound(STORE_NOT_FOUND.to_owned()));
        }
        tracing::info!(store_id = %id, "Store deleted");
        Ok(())
    }

    async fn ensure_store_owner(&self, owner: UserId) -> Result<(), ServiceError> {
        match self.users.get_by_id(owner).await? {
            Some(user) if user.role == Role::StoreOwner => Ok(()),
            _ => Err(ValidationError::new(INVALID_OWNER).into()),
        }
    }
}

fn map_store_write_error(e: RepositoryError) -> ServiceError {
    match e {
        RepositoryError::Conflict(_) => ServiceError::Conflict(STORE_EMAIL_TAKEN.to_owned()),
        // Owner deleted between the check and the write
        RepositoryError::NotFound => ValidationError::new(INVALID_OWNER).into(),
        other => ServiceError::Repository(other),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_owner() {
        assert_eq!(parse_owner(&json!(null)).unwrap(), None);
        assert_eq!(parse_owner(&json!("")).unwrap(), None);
        assert_eq!(parse_owner(&json!(4)).unwrap(), Some(UserId::new(4)));
        assert_eq!(parse_owner(&json!("4")).unwrap(), Some(UserId::new(4)));
        assert!(parse_owner(&json!("four")).is_err());
        assert!(parse_owner(&json!(1.5)).is_err());
    }

    #[test]
    fn test_update_body_distinguishes_null_owner() {
        let keep: UpdateStore = serde_json::from_str(r#"{"name":"New"}"#).unwrap();
        assert!(keep.owner_id.is_none());

        let clear: UpdateStore = serde_json::from_str(r#"{"ownerId":null}"#).unwrap();
        assert_eq!(clear.owner_id, Some(Value::Null));
    }

    #[test]
    fn test_listing_params_defaults() {
        let (filter, sort, order) = store_listing_params(&ListQuery::default()).unwrap();
        assert_eq!(filter, StoreFilter::default());
        assert_eq!(sort, StoreSortField::Name);
        assert_eq!(order, SortOrder::Asc);
    }

    #[test]
    fn test_listing_params_parse() {
        let query = ListQuery {
            sort_by: Some("rating".to_owned()),
            order: Some("DESC".to_owned()),
            address: Some("  Main ".to_owned()),
            name: Some(String::new()),
            ..ListQuery::default()
        };
        let (filter, sort, order) = store_listing_params(&query).unwrap();
        assert_eq!(sort, StoreSortField::Rating);
        assert_eq!(order, SortOrder::Desc);
        assert_eq!(filter.address.as_deref(), Some("Main"));
        assert!(filter.name.is_none());
    }

    #[test]
    fn test_listing_params_reject_unknown_sort() {
        let query = ListQuery {
            sort_by: Some("password_hash".to_owned()),
            ..ListQuery::default()
        };
        let err = store_listing_params(&query).unwrap_err();
        assert_eq!(err.message, "Invalid sort field: password_hash");
    }

    #[test]
    fn test_field_errors() {
        let mut errors = Vec::new();
        name_errors(&"n".repeat(61), &mut errors);
        address_errors("", &mut errors);
        assert!(parse_email("nope", &mut errors).is_none());
        assert_eq!(errors.len(), 3);
    }
}
