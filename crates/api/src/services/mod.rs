//! Business logic services.
//!
//! # Services
//!
//! - `auth` - Registration, login, session tokens, password changes and the role gate
//! - `ratings` - Rating submission and aggregation (summaries, owner reports, dashboard)
//! - `stores` - Store listing and admin store management
//! - `users` - Admin user listing and details
//!
//! Services borrow the pool for the duration of a request, the same way
//! repositories do.

pub mod auth;
mod error;
pub mod ratings;
pub mod stores;
pub mod users;
pub mod validation;

pub use error::ServiceError;
pub use validation::ValidationError;
