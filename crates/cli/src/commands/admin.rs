//! Admin account management.
//!
//! Admins cannot self-register through the API, so the first admin is
//! created here. Later admins can also be created through `POST /users`.
//!
//! # Usage
//!
//! ```bash
//! storerate admin create -e admin@example.com -n "Platform Administrator Account" \
//!     -a "1 Main Street" -p 'Secret#123'
//! ```

use storerate_api::db::UserRepository;
use storerate_api::db::users::NewUser;
use storerate_api::db::RepositoryError;
use storerate_api::services::auth::password::hash_password;
use storerate_api::services::auth::{AccountOrigin, AuthError, NewAccount};
use storerate_core::{Role, UserId};

use super::{CliError, connect};

/// Create an admin account, applying the same field rules as the API.
///
/// # Returns
///
/// The ID of the created account.
pub async fn create_admin(
    name: &str,
    email: &str,
    address: &str,
    password: &str,
) -> Result<UserId, CliError> {
    let account = NewAccount {
        name: Some(name.to_owned()),
        email: Some(email.to_owned()),
        password: Some(password.to_owned()),
        address: Some(address.to_owned()),
        role: Some(Role::Admin.as_str().to_owned()),
    }
    .validate(AccountOrigin::Administrator)
    .map_err(|e| match e {
        AuthError::Validation(v) if !v.errors.is_empty() => {
            CliError::InvalidAccount(v.errors.join("; "))
        }
        other => CliError::Account(other),
    })?;

    let pool = connect().await?;
    let password_hash = hash_password(&account.password)?;

    let user = UserRepository::new(&pool)
        .create(&NewUser {
            name: &account.name,
            email: &account.email,
            password_hash: &password_hash,
            address: &account.address,
            role: account.role,
        })
        .await
        .map_err(|e| match e {
            RepositoryError::Conflict(_) => AuthError::EmailTaken,
            other => AuthError::Repository(other),
        })?;

    tracing::info!(
        "Admin account created! ID: {}, Email: {}",
        user.id,
        user.email
    );

    pool.close().await;
    Ok(user.id)
}
