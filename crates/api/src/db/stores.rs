//! Store repository for database operations.
//!
//! Listings and single-store lookups are annotated with the rating aggregate
//! in one grouped query; a second join on `ratings` picks out the viewer's
//! own rating when a viewer is given.

use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres, QueryBuilder};

use storerate_core::{Email, RatingId, StoreId, UserId};

use super::{
    RepositoryError, contains_pattern, is_foreign_key_violation, is_unique_violation,
};
use crate::models::SortOrder;
use crate::models::rating::{UserRatingRef, round_average};
use crate::models::store::{Store, StoreFilter, StoreSortField, StoreWithRating};

const STORE_COLUMNS: &str = "id, name, email, address, owner_id, created_at, updated_at";

const AGGREGATE_SELECT: &str = r"
    SELECT s.id, s.name, s.email, s.address, s.owner_id, s.created_at, s.updated_at,
           AVG(r.rating)::float8 AS average_rating,
           COUNT(r.id) AS total_ratings,
           ur.id AS user_rating_id,
           ur.rating AS user_rating
    FROM stores s
    LEFT JOIN ratings r ON r.store_id = s.id
    LEFT JOIN ratings ur ON ur.store_id = s.id AND ur.user_id = ";

// =============================================================================
// Internal Row Types
// =============================================================================

/// Internal row type for `PostgreSQL` store queries.
#[derive(Debug, sqlx::FromRow)]
struct StoreRow {
    id: i32,
    name: String,
    email: String,
    address: String,
    owner_id: Option<i32>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<StoreRow> for Store {
    type Error = RepositoryError;

    fn try_from(row: StoreRow) -> Result<Self, Self::Error> {
        let email = Email::parse(&row.email).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid store email in database: {e}"))
        })?;

        Ok(Self {
            id: StoreId::new(row.id),
            name: row.name,
            email,
            address: row.address,
            owner_id: row.owner_id.map(UserId::new),
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// Store row with its rating aggregate and the viewer's rating, if any.
#[derive(Debug, sqlx::FromRow)]
struct StoreAggregateRow {
    #[sqlx(flatten)]
    store: StoreRow,
    average_rating: Option<f64>,
    total_ratings: i64,
    user_rating_id: Option<i32>,
    user_rating: Option<i32>,
}

impl StoreAggregateRow {
    fn into_store_with_rating(
        self,
        viewer: Option<UserId>,
    ) -> Result<StoreWithRating, RepositoryError> {
        let own = match (self.user_rating_id, self.user_rating) {
            (Some(id), Some(rating)) => Some(UserRatingRef {
                id: RatingId::new(id),
                rating,
            }),
            _ => None,
        };

        Ok(StoreWithRating {
            store: self.store.try_into()?,
            rating: round_average(self.average_rating),
            total_ratings: self.total_ratings,
            user_rating: viewer.map(|_| own),
        })
    }
}

/// Fields of a store about to be inserted.
#[derive(Debug, Clone)]
pub struct NewStore<'a> {
    pub name: &'a str,
    pub email: &'a Email,
    pub address: &'a str,
    pub owner_id: Option<UserId>,
}

/// Partial store update. `None` leaves a column untouched.
///
/// `owner_id` is doubly optional: `Some(None)` clears the owner.
#[derive(Debug, Clone, Default)]
pub struct StoreChanges {
    pub name: Option<String>,
    pub email: Option<Email>,
    pub address: Option<String>,
    pub owner_id: Option<Option<UserId>>,
}

// =============================================================================
// Repository
// =============================================================================

/// Repository for store database operations.
pub struct StoreRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> StoreRepository<'a> {
    /// Create a new store repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List stores matching `filter` with their rating aggregates.
    ///
    /// When `viewer` is set, each entry also carries the viewer's own rating.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if a stored email is invalid.
    pub async fn list(
        &self,
        filter: &StoreFilter,
        sort: StoreSortField,
        order: SortOrder,
        viewer: Option<UserId>,
    ) -> Result<Vec<StoreWithRating>, RepositoryError> {
        let mut query: QueryBuilder<'_, Postgres> = QueryBuilder::new(AGGREGATE_SELECT);
        query.push_bind(viewer.map(|id| id.as_i32()));
        query.push(" WHERE TRUE");

        if let Some(name) = &filter.name {
            query.push(" AND s.name ILIKE ").push_bind(contains_pattern(name));
        }
        if let Some(email) = &filter.email {
            query.push(" AND s.email ILIKE ").push_bind(contains_pattern(email));
        }
        if let Some(address) = &filter.address {
            query
                .push(" AND s.address ILIKE ")
                .push_bind(contains_pattern(address));
        }

        query.push(format!(
            " GROUP BY s.id, ur.id ORDER BY {} {}, s.id ASC",
            sort.column(),
            order.as_sql()
        ));

        let rows = query
            .build_query_as::<StoreAggregateRow>()
            .fetch_all(self.pool)
            .await?;

        rows.into_iter()
            .map(|row| row.into_store_with_rating(viewer))
            .collect()
    }

    /// Get a single store with its rating aggregate.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_with_rating(
        &self,
        id: StoreId,
        viewer: Option<UserId>,
    ) -> Result<Option<StoreWithRating>, RepositoryError> {
        let row = sqlx::query_as::<_, StoreAggregateRow>(&format!(
            "{AGGREGATE_SELECT} $2 WHERE s.id = $1 GROUP BY s.id, ur.id"
        ))
        .bind(id.as_i32())
        .bind(viewer.map(|v| v.as_i32()))
        .fetch_optional(self.pool)
        .await?;

        row.map(|r| r.into_store_with_rating(viewer)).transpose()
    }

    /// Get a store by its ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_id(&self, id: StoreId) -> Result<Option<Store>, RepositoryError> {
        let row = sqlx::query_as::<_, StoreRow>(&format!(
            "SELECT {STORE_COLUMNS} FROM stores WHERE id = $1"
        ))
        .bind(id.as_i32())
        .fetch_optional(self.pool)
        .await?;

        row.map(TryInto::try_into).transpose()
    }

    /// Get the store owned by `owner`.
    ///
    /// An owner with several stores gets the one created first (lowest ID).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_owner(&self, owner: UserId) -> Result<Option<Store>, RepositoryError> {
        let row = sqlx::query_as::<_, StoreRow>(&format!(
            "SELECT {STORE_COLUMNS} FROM stores WHERE owner_id = $1 ORDER BY id ASC LIMIT 1"
        ))
        .bind(owner.as_i32())
        .fetch_optional(self.pool)
        .await?;

        row.map(TryInto::try_into).transpose()
    }

    /// Create a new store.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the store email already exists.
    /// Returns `RepositoryError::NotFound` if the owner no longer exists.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn create(&self, new_store: &NewStore<'_>) -> Result<Store, RepositoryError> {
        let row = sqlx::query_as::<_, StoreRow>(&format!(
            r"
            INSERT INTO stores (name, email, address, owner_id)
            VALUES ($1, $2, $3, $4)
            RETURNING {STORE_COLUMNS}
            "
        ))
        .bind(new_store.name)
        .bind(new_store.email)
        .bind(new_store.address)
        .bind(new_store.owner_id.map(|id| id.as_i32()))
        .fetch_one(self.pool)
        .await
        .map_err(map_write_error)?;

        row.try_into()
    }

    /// Apply a partial update to a store.
    ///
    /// Returns `None` if no store has this ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the new email is taken by another store.
    /// Returns `RepositoryError::NotFound` if the new owner no longer exists.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn update(
        &self,
        id: StoreId,
        changes: &StoreChanges,
    ) -> Result<Option<Store>, RepositoryError> {
        let row = sqlx::query_as::<_, StoreRow>(&format!(
            r"
            UPDATE stores
            SET name = COALESCE($2, name),
                email = COALESCE($3, email),
                address = COALESCE($4, address),
                owner_id = CASE WHEN $5 THEN $6 ELSE owner_id END,
                updated_at = NOW()
            WHERE id = $1
            RETURNING {STORE_COLUMNS}
            "
        ))
        .bind(id.as_i32())
        .bind(changes.name.as_deref())
        .bind(changes.email.as_ref().map(Email::as_str))
        .bind(changes.address.as_deref())
        .bind(changes.owner_id.is_some())
        .bind(changes.owner_id.flatten().map(|owner| owner.as_i32()))
        .fetch_optional(self.pool)
        .await
        .map_err(map_write_error)?;

        row.map(TryInto::try_into).transpose()
    }

    /// Delete a store and, through the foreign key, its ratings.
    ///
    /// Returns `false` if no store had this ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn delete(&self, id: StoreId) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM stores WHERE id = $1")
            .bind(id.as_i32())
            .execute(self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

fn map_write_error(e: sqlx::Error) -> RepositoryError {
    if is_unique_violation(&e) {
        return RepositoryError::Conflict("store email already exists".to_owned());
    }
    if is_foreign_key_violation(&e) {
        return RepositoryError::NotFound;
    }
    RepositoryError::Database(e)
}
