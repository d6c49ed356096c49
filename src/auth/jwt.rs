//! Session token issue and validation (HS256 JWT, one hour TTL).

use crate::error::{AppError, AppResult};
use crate::models::user::{Role, User};
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;
use uuid::Uuid;

pub const TOKEN_TTL_SECS: i64 = 60 * 60;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Claims {
    pub user_id: Uuid,
    pub email: String,
    pub role: Role,
    pub iat: i64,
    pub exp: i64,
}

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum TokenError {
    /// Bad signature or malformed token.
    #[error("invalid token")]
    Invalid,
    #[error("token expired")]
    Expired,
}

impl From<TokenError> for AppError {
    fn from(e: TokenError) -> Self {
        match e {
            TokenError::Invalid => AppError::TokenInvalid,
            TokenError::Expired => AppError::TokenExpired,
        }
    }
}

struct Keys {
    encoding: EncodingKey,
    decoding: DecodingKey,
}

/// Mints and checks signed session tokens with a process-wide secret.
#[derive(Clone)]
pub struct TokenIssuer {
    keys: Arc<Keys>,
}

impl TokenIssuer {
    pub fn new(secret: &str) -> Self {
        Self {
            keys: Arc::new(Keys {
                encoding: EncodingKey::from_secret(secret.as_bytes()),
                decoding: DecodingKey::from_secret(secret.as_bytes()),
            }),
        }
    }

    pub fn issue(&self, user: &User) -> AppResult<String> {
        self.issue_at(user, Utc::now())
    }

    pub(crate) fn issue_at(&self, user: &User, issued_at: DateTime<Utc>) -> AppResult<String> {
        let claims = Claims {
            user_id: user.id,
            email: user.email.clone(),
            role: user.role,
            iat: issued_at.timestamp(),
            exp: (issued_at + Duration::seconds(TOKEN_TTL_SECS)).timestamp(),
        };
        encode(&Header::new(Algorithm::HS256), &claims, &self.keys.encoding)
            .map_err(|e| AppError::Internal(anyhow::anyhow!("jwt encode: {}", e)))
    }

    /// Decoded claims if the signature holds and `now < exp`.
    pub fn verify(&self, token: &str) -> Result<Claims, TokenError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp"]);
        let data = decode::<Claims>(token, &self.keys.decoding, &validation).map_err(|e| {
            match e.kind() {
                ErrorKind::ExpiredSignature => TokenError::Expired,
                _ => TokenError::Invalid,
            }
        })?;
        if Utc::now().timestamp() >= data.claims.exp {
            return Err(TokenError::Expired);
        }
        Ok(data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user() -> User {
        User {
            id: Uuid::new_v4(),
            username: "carol".into(),
            email: "carol@example.com".into(),
            password_hash: "unused".into(),
            role: Role::User,
        }
    }

    #[test]
    fn issue_then_verify_returns_claims() {
        let issuer = TokenIssuer::new("test-secret");
        let user = user();
        let token = issuer.issue(&user).unwrap();
        let claims = issuer.verify(&token).unwrap();
        assert_eq!(claims.user_id, user.id);
        assert_eq!(claims.email, user.email);
        assert_eq!(claims.role, Role::User);
        assert_eq!(claims.exp - claims.iat, TOKEN_TTL_SECS);
    }

    #[test]
    fn token_past_ttl_is_expired() {
        let issuer = TokenIssuer::new("test-secret");
        let token = issuer
            .issue_at(&user(), Utc::now() - Duration::seconds(TOKEN_TTL_SECS + 5))
            .unwrap();
        assert_eq!(issuer.verify(&token), Err(TokenError::Expired));
    }

    #[test]
    fn different_issue_times_give_different_tokens() {
        let issuer = TokenIssuer::new("test-secret");
        let user = user();
        let now = Utc::now();
        let a = issuer.issue_at(&user, now).unwrap();
        let b = issuer.issue_at(&user, now + Duration::seconds(1)).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn altered_signature_is_invalid() {
        let issuer = TokenIssuer::new("test-secret");
        let token = issuer.issue(&user()).unwrap();
        let sig_start = token.rfind('.').unwrap() + 1;
        let mut bytes = token.into_bytes();
        let i = sig_start + 5;
        bytes[i] = if bytes[i] == b'A' { b'B' } else { b'A' };
        let tampered = String::from_utf8(bytes).unwrap();
        assert_eq!(issuer.verify(&tampered), Err(TokenError::Invalid));
    }

    #[test]
    fn altered_payload_is_invalid() {
        let issuer = TokenIssuer::new("test-secret");
        let token = issuer.issue(&user()).unwrap();
        let payload_at = token.find('.').unwrap() + 3;
        let mut bytes = token.into_bytes();
        bytes[payload_at] = if bytes[payload_at] == b'x' { b'y' } else { b'x' };
        let tampered = String::from_utf8(bytes).unwrap();
        assert_eq!(issuer.verify(&tampered), Err(TokenError::Invalid));
    }

    #[test]
    fn rotated_secret_invalidates_tokens() {
        let token = TokenIssuer::new("old-secret").issue(&user()).unwrap();
        assert_eq!(
            TokenIssuer::new("new-secret").verify(&token),
            Err(TokenError::Invalid)
        );
    }

    #[test]
    fn garbage_is_invalid() {
        let issuer = TokenIssuer::new("test-secret");
        assert_eq!(issuer.verify("not.a.jwt"), Err(TokenError::Invalid));
        assert_eq!(issuer.verify(""), Err(TokenError::Invalid));
    }
}
