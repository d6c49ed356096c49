//! Auth HTTP handlers: register, login, me.

use axum::{extract::State, http::StatusCode, Json};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::auth::{AuthOutcome, Claims};
use crate::error::AppError;
use crate::handlers::UserServiceState;
use crate::middleware::auth::AuthUser;
use crate::models::user::UserSummary;

#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(length(min = 1, max = 255))]
    pub username: String,
    #[validate(email)]
    pub email: String,
    /// Plaintext password. The wire name is `passwordHash`; `password` is accepted too.
    #[serde(rename = "passwordHash", alias = "password")]
    #[validate(length(min = 1, max = 128))]
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub message: &'static str,
    pub token: String,
    pub user: UserSummary,
}

impl AuthResponse {
    fn new(message: &'static str, outcome: AuthOutcome) -> Self {
        Self {
            message,
            token: outcome.token,
            user: outcome.user,
        }
    }
}

/// POST /auth/register — 201 on creation, 200 when the email already exists.
pub async fn register(
    State(state): State<UserServiceState>,
    Json(body): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<AuthResponse>), AppError> {
    body.validate().map_err(|e| AppError::Validation(e.to_string()))?;

    let outcome = state
        .auth
        .register(&body.username, &body.email, &body.password)
        .await?;

    if outcome.created {
        Ok((
            StatusCode::CREATED,
            Json(AuthResponse::new("Registration successful", outcome)),
        ))
    } else {
        Ok((
            StatusCode::OK,
            Json(AuthResponse::new(
                "Email already registered, logged in automatically",
                outcome,
            )),
        ))
    }
}

/// POST /auth/login
pub async fn login(
    State(state): State<UserServiceState>,
    Json(body): Json<LoginRequest>,
) -> Result<Json<AuthResponse>, AppError> {
    let outcome = state.auth.login(&body.email, &body.password).await?;
    Ok(Json(AuthResponse::new("Login successful", outcome)))
}

/// GET /auth/me — claims of the presented bearer token.
pub async fn me(AuthUser(claims): AuthUser) -> Json<Claims> {
    Json(claims)
}
