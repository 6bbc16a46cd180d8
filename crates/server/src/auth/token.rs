//! HS256 bearer tokens

use chrono::{DateTime, Duration, Utc};
use health_core::Role;
use jsonwebtoken::{
    Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode, errors::ErrorKind,
};
use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Claims carried by every bearer token
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Claims {
    pub user_id: i32,
    pub username: String,
    pub role: Role,
    pub iat: i64,
    pub exp: i64,
}

/// Why a request could not be authenticated
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenError {
    Missing,
    Expired,
    Invalid,
}

impl From<TokenError> for AppError {
    fn from(err: TokenError) -> Self {
        let msg = match err {
            TokenError::Missing => "Token eksik",
            TokenError::Expired => "Token süresi dolmuş",
            TokenError::Invalid => "Geçersiz token",
        };
        AppError::Unauthorized(msg.to_string())
    }
}

/// Signing and verification keys shared by the login route and auth middleware
#[derive(Clone)]
pub struct TokenKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl: Duration,
}

impl TokenKeys {
    pub fn new(secret: &str, ttl_hours: i64) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            ttl: Duration::hours(ttl_hours),
        }
    }

    /// Issue a token valid from now for the configured lifetime
    pub fn issue(&self, user_id: i32, username: &str, role: Role) -> Result<String, AppError> {
        self.issue_at(user_id, username, role, Utc::now())
    }

    /// Issue a token as if it were created at `issued_at`
    pub fn issue_at(
        &self,
        user_id: i32,
        username: &str,
        role: Role,
        issued_at: DateTime<Utc>,
    ) -> Result<String, AppError> {
        let claims = Claims {
            user_id,
            username: username.to_string(),
            role,
            iat: issued_at.timestamp(),
            exp: (issued_at + self.ttl).timestamp(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|e| AppError::Internal(format!("Token encoding failed: {}", e)))
    }

    pub fn verify(&self, token: &str) -> Result<Claims, TokenError> {
        let validation = Validation::new(Algorithm::HS256);
        decode::<Claims>(token, &self.decoding, &validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => TokenError::Expired,
                _ => TokenError::Invalid,
            })
    }

    /// Verify the value of an `Authorization: Bearer <token>` header
    pub fn verify_header(&self, header: Option<&str>) -> Result<Claims, TokenError> {
        let token = header
            .and_then(|h| h.strip_prefix("Bearer "))
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or(TokenError::Missing)?;
        self.verify(token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keys() -> TokenKeys {
        TokenKeys::new("test-secret", 2)
    }

    #[test]
    fn issued_token_verifies() {
        let keys = keys();
        let token = keys.issue(7, "ayse", Role::Doctor).unwrap();
        let claims = keys.verify(&token).unwrap();
        assert_eq!(claims.user_id, 7);
        assert_eq!(claims.username, "ayse");
        assert_eq!(claims.role, Role::Doctor);
        assert_eq!(claims.exp - claims.iat, 2 * 3600);
    }

    #[test]
    fn expired_token_is_reported_as_expired() {
        let keys = keys();
        let token = keys
            .issue_at(1, "ali", Role::User, Utc::now() - Duration::hours(3))
            .unwrap();
        assert_eq!(keys.verify(&token), Err(TokenError::Expired));
    }

    #[test]
    fn token_signed_with_other_secret_is_invalid() {
        let token = TokenKeys::new("other-secret", 2)
            .issue(1, "ali", Role::User)
            .unwrap();
        assert_eq!(keys().verify(&token), Err(TokenError::Invalid));
    }

    #[test]
    fn header_must_use_bearer_scheme() {
        let keys = keys();
        assert_eq!(keys.verify_header(None), Err(TokenError::Missing));
        assert_eq!(keys.verify_header(Some("Basic abc")), Err(TokenError::Missing));
        assert_eq!(keys.verify_header(Some("Bearer ")), Err(TokenError::Missing));
        assert_eq!(keys.verify_header(Some("Bearer nonsense")), Err(TokenError::Invalid));
    }
}
