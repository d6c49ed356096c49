//! Bearer token extraction and verification.

use axum::{
    extract::{FromRef, FromRequestParts},
    http::{header::AUTHORIZATION, request::Parts, HeaderMap},
};

use crate::auth::{Claims, TokenIssuer};
use crate::error::AppError;

const BEARER_PREFIX: &str = "Bearer ";

/// Verified claims of the request's `Authorization: Bearer` token.
#[derive(Clone, Debug)]
pub struct AuthUser(pub Claims);

/// Token from an `Authorization: Bearer <token>` header, if well-formed.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.strip_prefix(BEARER_PREFIX))
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

/// Verify the bearer token in `headers`. A missing header counts as an invalid token.
pub fn authenticate(headers: &HeaderMap, tokens: &TokenIssuer) -> Result<Claims, AppError> {
    let token = bearer_token(headers).ok_or(AppError::TokenInvalid)?;
    Ok(tokens.verify(token)?)
}

#[axum::async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    TokenIssuer: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let tokens = TokenIssuer::from_ref(state);
        authenticate(&parts.headers, &tokens).map(AuthUser)
    }
}
