//! Domain models for the API.
//!
//! These types are what handlers serialize. Database row types stay private
//! to the `db` module and convert into these.

pub mod listing;
pub mod rating;
pub mod store;
pub mod user;

pub use listing::{ListQuery, SortOrder};
pub use rating::{DashboardStats, OwnerRatingReport, Rater, Rating, RatingSummary, RatingWithRater, UserRatingRef};
pub use store::{Store, StoreFilter, StoreSortField, StoreWithRating};
pub use user::{User, UserDetails, UserFilter, UserSortField};
