//! Quiz platform backend built with Rust.
//!
//! Provides an API gateway (rate limiting and prefix routing), a user service
//! issuing signed session tokens on register/login, and a quiz catalogue service.

pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod gateway;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod repositories;
pub mod services;
pub mod telemetry;

pub use config::Config;
pub use error::AppError;
pub use gateway::GatewayState;
pub use handlers::{QuizServiceState, UserServiceState};

use axum::routing::{get, post};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

/// User service router: `/auth/register`, `/auth/login`, `/auth/me`, `/health`.
pub fn create_user_service_app(state: UserServiceState) -> axum::Router {
    let auth_routes = axum::Router::new()
        .route("/register", post(auth::register))
        .route("/login", post(auth::login))
        .route("/me", get(auth::me));

    axum::Router::new()
        .route("/health", get(|| handlers::health("user-service")))
        .nest("/auth", auth_routes)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Quiz service router under `/api`.
pub fn create_quiz_service_app(state: QuizServiceState) -> axum::Router {
    let api_routes = axum::Router::new()
        .route(
            "/quizzes",
            get(handlers::quiz::list_quizzes).post(handlers::quiz::create_quiz),
        )
        .route(
            "/quizzes/:quiz_id/questions",
            get(handlers::quiz::list_questions),
        );

    axum::Router::new()
        .route("/health", get(|| handlers::health("quiz-service")))
        .nest("/api", api_routes)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Gateway router. Rate limiting runs first (CORS preflights included), then routing;
/// unmatched paths are proxied or 404.
pub fn create_gateway_app(state: GatewayState) -> axum::Router {
    axum::Router::new()
        .route("/health", get(|| handlers::health("gateway")))
        .fallback(gateway::dispatch)
        .layer(CorsLayer::permissive())
        .layer(axum::middleware::from_fn_with_state(
            state.limiter.clone(),
            middleware::rate_limit,
        ))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
