//! Shared service state and the health probe.

use axum::{extract::FromRef, http::StatusCode, Json};
use serde_json::json;
use std::sync::Arc;

use crate::auth::{AuthService, TokenIssuer};
use crate::repositories::QuizStore;

/// State of the user service.
#[derive(Clone)]
pub struct UserServiceState {
    pub auth: AuthService,
}

impl FromRef<UserServiceState> for TokenIssuer {
    fn from_ref(state: &UserServiceState) -> Self {
        state.auth.tokens().clone()
    }
}

/// State of the quiz service.
#[derive(Clone)]
pub struct QuizServiceState {
    pub quizzes: Arc<dyn QuizStore>,
}

/// GET /health — liveness probe.
pub async fn health(service: &'static str) -> (StatusCode, Json<serde_json::Value>) {
    (
        StatusCode::OK,
        Json(json!({ "status": "ok", "service": service })),
    )
}
