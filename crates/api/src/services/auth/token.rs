//! Signed session tokens (HS256 JWT).
//!
//! Tokens are stateless: they carry the user ID and role and expire one hour
//! after issue. Nothing is stored server-side, so a token stays valid until
//! expiry even if the password changes.

use chrono::Utc;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use storerate_core::{Role, UserId};

use super::AuthError;

/// Token lifetime in seconds.
pub const TOKEN_TTL_SECONDS: i64 = 3600;

/// Claims carried by a session token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Claims {
    /// Authenticated account.
    pub user_id: UserId,
    /// Role at the time the token was issued.
    pub role: Role,
    /// Issued-at, seconds since the epoch.
    pub iat: i64,
    /// Expiry, seconds since the epoch.
    pub exp: i64,
}

/// Issues and verifies session tokens with a shared HMAC secret.
pub struct TokenService {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
}

impl std::fmt::Debug for TokenService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenService")
            .field("algorithm", &Algorithm::HS256)
            .field("keys", &"[REDACTED]")
            .finish()
    }
}

impl TokenService {
    /// Create a token service from the signing secret.
    #[must_use]
    pub fn new(secret: &SecretString) -> Self {
        let bytes = secret.expose_secret().as_bytes();
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;

        Self {
            encoding: EncodingKey::from_secret(bytes),
            decoding: DecodingKey::from_secret(bytes),
            validation,
        }
    }

    /// Issue a token for `user_id` valid for [`TOKEN_TTL_SECONDS`].
    ///
    /// # Errors
    ///
    /// Returns `AuthError::TokenSigning` if encoding fails.
    pub fn issue(&self, user_id: UserId, role: Role) -> Result<String, AuthError> {
        let iat = Utc::now().timestamp();
        let claims = Claims {
            user_id,
            role,
            iat,
            exp: iat + TOKEN_TTL_SECONDS,
        };
        self.sign(&claims)
    }

    /// Verify signature and expiry, returning the embedded claims.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidToken` for any malformed, tampered,
    /// foreign-signed or expired token.
    pub fn verify(&self, token: &str) -> Result<Claims, AuthError> {
        decode::<Claims>(token, &self.decoding, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| {
                tracing::debug!(error = %e, "Token rejected");
                AuthError::InvalidToken
            })
    }

    fn sign(&self, claims: &Claims) -> Result<String, AuthError> {
        encode(&Header::new(Algorithm::HS256), claims, &self.encoding)
            .map_err(AuthError::TokenSigning)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn service(secret: &str) -> TokenService {
        TokenService::new(&SecretString::from(secret))
    }

    const SECRET: &str = "k9#Qm2$vX7!pL4@wZ8^rT1&yB5*nC3%d";

    #[test]
    fn test_issue_and_verify() {
        let tokens = service(SECRET);
        let token = tokens.issue(UserId::new(42), Role::StoreOwner).unwrap();
        let claims = tokens.verify(&token).unwrap();

        assert_eq!(claims.user_id, UserId::new(42));
        assert_eq!(claims.role, Role::StoreOwner);
        assert_eq!(claims.exp - claims.iat, TOKEN_TTL_SECONDS);
    }

    #[test]
    fn test_claims_use_camel_case() {
        let json = serde_json::to_value(Claims {
            user_id: UserId::new(1),
            role: Role::Admin,
            iat: 0,
            exp: 3600,
        })
        .unwrap();
        assert_eq!(json["userId"], 1);
        assert_eq!(json["role"], "admin");
    }

    #[test]
    fn test_rejects_foreign_signature() {
        let token = service(SECRET).issue(UserId::new(1), Role::User).unwrap();
        let other = service("Zp4!rW8#mQ1$xT6^bN3&kL9*hV2@cF7%");
        assert!(matches!(other.verify(&token), Err(AuthError::InvalidToken)));
    }

    #[test]
    fn test_rejects_expired() {
        let tokens = service(SECRET);
        let iat = Utc::now().timestamp() - 2 * TOKEN_TTL_SECONDS;
        let token = tokens
            .sign(&Claims {
                user_id: UserId::new(1),
                role: Role::User,
                iat,
                exp: iat + TOKEN_TTL_SECONDS,
            })
            .unwrap();
        assert!(matches!(tokens.verify(&token), Err(AuthError::InvalidToken)));
    }

    #[test]
    fn test_rejects_tampered_payload() {
        let tokens = service(SECRET);
        let token = tokens.issue(UserId::new(1), Role::User).unwrap();
        let admin = tokens.issue(UserId::new(1), Role::Admin).unwrap();

        // Graft the admin payload onto the user token's signature
        let parts: Vec<&str> = token.split('.').collect();
        let admin_parts: Vec<&str> = admin.split('.').collect();
        let forged = format!("{}.{}.{}", parts[0], admin_parts[1], parts[2]);

        assert!(matches!(tokens.verify(&forged), Err(AuthError::InvalidToken)));
    }

    #[test]
    fn test_rejects_garbage() {
        let tokens = service(SECRET);
        assert!(matches!(tokens.verify(""), Err(AuthError::InvalidToken)));
        assert!(matches!(
            tokens.verify("not.a.token"),
            Err(AuthError::InvalidToken)
        ));
    }

    #[test]
    fn test_debug_hides_keys() {
        let debug = format!("{:?}", service(SECRET));
        assert!(!debug.contains(SECRET));
        assert!(debug.contains("REDACTED"));
    }
}
