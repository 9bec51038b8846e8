//! Authentication service.
//!
//! Provides password registration and login, session token verification,
//! password changes and the role-based authorization gate.

mod error;
pub mod password;
pub mod token;

pub use error::AuthError;
pub use token::{Claims, TokenService};

use serde::Deserialize;
use sqlx::PgPool;

use storerate_core::{Email, Role, UserId};

use crate::db::RepositoryError;
use crate::db::users::{NewUser, UserRepository};
use crate::models::user::User;
use crate::services::validation::{ValidationError, char_len_between, present};

use password::{hash_password, password_policy_violations, verify_password};

/// Name length bounds in characters.
pub const NAME_LENGTH: (usize, usize) = (20, 60);
/// Maximum address length in characters.
pub const MAX_ADDRESS_LENGTH: usize = 400;

/// Who is creating an account, which decides the roles on offer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccountOrigin {
    /// Anonymous registration: `user` or `store_owner` only.
    SelfService,
    /// Created by an admin or the CLI: any role.
    Administrator,
}

/// Account fields as submitted, before validation.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewAccount {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub address: Option<String>,
    pub role: Option<String>,
}

/// Account fields that passed every rule.
#[derive(Debug, Clone)]
pub struct ValidatedAccount {
    pub name: String,
    pub email: Email,
    pub password: String,
    pub address: String,
    pub role: Role,
}

impl NewAccount {
    /// Validate the submitted fields.
    ///
    /// Checks run in a fixed order: an admin self-registration is refused
    /// before anything else, then missing fields, then the role, and finally
    /// all field rules together so the client sees every problem at once.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::AdminRegistration` for a self-service `admin` role.
    /// Returns `AuthError::Validation` for missing, unknown or malformed fields.
    pub fn validate(&self, origin: AccountOrigin) -> Result<ValidatedAccount, AuthError> {
        let role = present(self.role.as_deref());
        if origin == AccountOrigin::SelfService && role == Some(Role::Admin.as_str()) {
            return Err(AuthError::AdminRegistration);
        }

        let (Some(name), Some(email), Some(password), Some(address), Some(role)) = (
            present(self.name.as_deref()),
            present(self.email.as_deref()),
            self.password.as_deref().filter(|p| !p.trim().is_empty()),
            present(self.address.as_deref()),
            role,
        ) else {
            return Err(ValidationError::missing_fields().into());
        };

        let role = role
            .parse::<Role>()
            .ok()
            .filter(|r| origin == AccountOrigin::Administrator || r.is_self_registerable())
            .ok_or_else(|| ValidationError::new("Invalid role specified"))?;

        let mut errors = Vec::new();
        let (min_name, max_name) = NAME_LENGTH;
        if !char_len_between(name, min_name, max_name) {
            errors.push(format!(
                "Name must be between {min_name} and {max_name} characters"
            ));
        }
        let email = Email::parse(email);
        if email.is_err() {
            errors.push("Invalid email address".to_owned());
        }
        if !char_len_between(address, 1, MAX_ADDRESS_LENGTH) {
            errors.push(format!(
                "Address must be at most {MAX_ADDRESS_LENGTH} characters"
            ));
        }
        errors.extend(password_policy_violations(password));

        match email {
            Ok(email) if errors.is_empty() => Ok(ValidatedAccount {
                name: name.to_owned(),
                email,
                password: password.to_owned(),
                address: address.to_owned(),
                role,
            }),
            _ => Err(ValidationError::with_errors(errors).into()),
        }
    }
}

/// Login form as submitted.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

/// Password change as submitted.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PasswordChange {
    pub current_password: Option<String>,
    pub new_password: Option<String>,
}

/// Check that `claims` carries one of the `allowed` roles.
///
/// # Errors
///
/// Returns `AuthError::AccessDenied` otherwise.
pub fn authorize(claims: &Claims, allowed: &[Role]) -> Result<(), AuthError> {
    if allowed.contains(&claims.role) {
        Ok(())
    } else {
        Err(AuthError::AccessDenied)
    }
}

/// Authentication service.
///
/// Handles user registration, login, and password changes.
pub struct AuthService<'a> {
    users: UserRepository<'a>,
    tokens: &'a TokenService,
}

impl<'a> AuthService<'a> {
    /// Create a new authentication service.
    #[must_use]
    pub const fn new(pool: &'a PgPool, tokens: &'a TokenService) -> Self {
        Self {
            users: UserRepository::new(pool),
            tokens,
        }
    }

    /// Register a new account as an anonymous visitor.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::AdminRegistration` if the role is `admin`.
    /// Returns `AuthError::Validation` if any field is missing or invalid.
    /// Returns `AuthError::EmailTaken` if the email is already registered.
    pub async fn register(&self, account: &NewAccount) -> Result<User, AuthError> {
        let account = account.validate(AccountOrigin::SelfService)?;
        self.create_user(&account).await
    }

    /// Create an account on behalf of an administrator; any role is allowed.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Validation` if any field is missing or invalid.
    /// Returns `AuthError::EmailTaken` if the email is already registered.
    pub async fn create_account(&self, account: &NewAccount) -> Result<User, AuthError> {
        let account = account.validate(AccountOrigin::Administrator)?;
        self.create_user(&account).await
    }

    /// Persist a validated account with a freshly hashed password.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::EmailTaken` if the email is already registered.
    pub async fn create_user(&self, account: &ValidatedAccount) -> Result<User, AuthError> {
        let password_hash = hash_password(&account.password)?;

        let user = self
            .users
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

        tracing::info!(user_id = %user.id, role = %user.role, "Account created");
        Ok(user)
    }

    /// Login with email and password, returning a session token and the user.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Validation` if either field is missing.
    /// Returns `AuthError::InvalidCredentials` if the email/password is wrong.
    pub async fn login(&self, request: &LoginRequest) -> Result<(String, User), AuthError> {
        let (Some(email), Some(password)) = (
            present(request.email.as_deref()),
            request.password.as_deref().filter(|p| !p.is_empty()),
        ) else {
            return Err(ValidationError::missing_fields().into());
        };

        // A malformed email cannot match any account
        let email = Email::parse(email).map_err(|_| AuthError::InvalidCredentials)?;

        let (user, password_hash) = self
            .users
            .get_password_hash(&email)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        verify_password(password, &password_hash)?;

        let token = self.tokens.issue(user.id, user.role)?;
        Ok((token, user))
    }

    /// Get the account behind a verified token.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::UserNotFound` if the account no longer exists.
    pub async fn current_user(&self, user_id: UserId) -> Result<User, AuthError> {
        self.users
            .get_by_id(user_id)
            .await?
            .ok_or(AuthError::UserNotFound)
    }

    /// Replace a user's password after checking the current one.
    ///
    /// Outstanding tokens are not revoked.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Validation` if a field is missing or the new password fails the policy.
    /// Returns `AuthError::UserNotFound` if the account no longer exists.
    /// Returns `AuthError::IncorrectPassword` if the current password does not match.
    pub async fn update_password(
        &self,
        user_id: UserId,
        change: &PasswordChange,
    ) -> Result<(), AuthError> {
        let (Some(current), Some(new)) = (
            change.current_password.as_deref().filter(|p| !p.is_empty()),
            change.new_password.as_deref().filter(|p| !p.is_empty()),
        ) else {
            return Err(ValidationError::missing_fields().into());
        };

        let violations = password_policy_violations(new);
        if !violations.is_empty() {
            return Err(ValidationError::with_errors(violations).into());
        }

        let (_, password_hash) = self
            .users
            .get_password_hash_by_id(user_id)
            .await?
            .ok_or(AuthError::UserNotFound)?;

        verify_password(current, &password_hash).map_err(|_| AuthError::IncorrectPassword)?;

        let new_hash = hash_password(new)?;
        self.users
            .update_password(user_id, &new_hash)
            .await
            .map_err(|e| match e {
                RepositoryError::NotFound => AuthError::UserNotFound,
                other => AuthError::Repository(other),
            })?;

        tracing::info!(user_id = %user_id, "Password updated");
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn account(role: &str) -> NewAccount {
        NewAccount {
            name: Some("Alexandra Montgomery-Smith".to_owned()),
            email: Some("alex@example.com".to_owned()),
            password: Some("Secret#123".to_owned()),
            address: Some("221B Baker Street, London".to_owned()),
            role: Some(role.to_owned()),
        }
    }

    fn validation_errors(result: Result<ValidatedAccount, AuthError>) -> ValidationError {
        match result {
            Err(AuthError::Validation(v)) => v,
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn test_valid_registration() {
        let validated = account("store_owner")
            .validate(AccountOrigin::SelfService)
            .unwrap();
        assert_eq!(validated.role, Role::StoreOwner);
        assert_eq!(validated.email.as_str(), "alex@example.com");
    }

    #[test]
    fn test_admin_refused_before_field_checks() {
        let request = NewAccount {
            role: Some("admin".to_owned()),
            ..NewAccount::default()
        };
        assert!(matches!(
            request.validate(AccountOrigin::SelfService),
            Err(AuthError::AdminRegistration)
        ));
    }

    #[test]
    fn test_administrator_may_create_admin() {
        let validated = account("admin")
            .validate(AccountOrigin::Administrator)
            .unwrap();
        assert_eq!(validated.role, Role::Admin);
    }

    #[test]
    fn test_missing_and_blank_fields() {
        let mut request = account("user");
        request.address = Some("   ".to_owned());
        let err = validation_errors(request.validate(AccountOrigin::SelfService));
        assert_eq!(err.message, "All fields are required");

        let mut request = account("user");
        request.role = None;
        let err = validation_errors(request.validate(AccountOrigin::SelfService));
        assert_eq!(err.message, "All fields are required");
    }

    #[test]
    fn test_unknown_role() {
        let err = validation_errors(account("superuser").validate(AccountOrigin::SelfService));
        assert_eq!(err.message, "Invalid role specified");

        let err = validation_errors(account("superuser").validate(AccountOrigin::Administrator));
        assert_eq!(err.message, "Invalid role specified");
    }

    #[test]
    fn test_field_errors_are_aggregated() {
        let request = NewAccount {
            name: Some("Too short".to_owned()),
            email: Some("not-an-email".to_owned()),
            password: Some("weak".to_owned()),
            address: Some("a".repeat(401)),
            role: Some("user".to_owned()),
        };
        let err = validation_errors(request.validate(AccountOrigin::SelfService));
        assert_eq!(err.message, "Validation failed");
        // name, email, address and three password rules
        assert_eq!(err.errors.len(), 6);
        assert!(err.errors[0].starts_with("Name"));
    }

    #[test]
    fn test_name_bounds() {
        let mut request = account("user");
        request.name = Some("a".repeat(20));
        assert!(request.validate(AccountOrigin::SelfService).is_ok());

        request.name = Some("a".repeat(19));
        assert!(request.validate(AccountOrigin::SelfService).is_err());

        request.name = Some("a".repeat(61));
        assert!(request.validate(AccountOrigin::SelfService).is_err());
    }

    #[test]
    fn test_authorize_admits_exactly_listed_roles() {
        let claims = |role| Claims {
            user_id: UserId::new(1),
            role,
            iat: 0,
            exp: 0,
        };

        assert!(authorize(&claims(Role::Admin), &[Role::Admin]).is_ok());
        assert!(authorize(&claims(Role::User), &[Role::Admin]).is_err());
        assert!(authorize(&claims(Role::StoreOwner), &[Role::Admin]).is_err());
        assert!(authorize(&claims(Role::StoreOwner), &[Role::User, Role::StoreOwner]).is_ok());
        assert!(matches!(
            authorize(&claims(Role::User), &[]),
            Err(AuthError::AccessDenied)
        ));
    }
}
