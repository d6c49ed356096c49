//! API gateway: rate limit, prefix routing and forwarding to backend services.

pub mod proxy;
pub mod routes;

pub use routes::{Route, RouteTable};

use axum::{
    extract::{FromRef, Request, State},
    response::Response,
};
use std::sync::Arc;
use std::time::Duration;

use crate::auth::TokenIssuer;
use crate::config::Config;
use crate::error::{AppError, AppResult};
use crate::middleware::auth::authenticate;
use crate::middleware::rate_limit::peer_ip;
use crate::services::RateLimiter;

const UPSTREAM_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Clone)]
pub struct GatewayState {
    pub routes: Arc<RouteTable>,
    pub limiter: Arc<RateLimiter>,
    pub tokens: TokenIssuer,
    pub client: reqwest::Client,
}

impl GatewayState {
    pub fn new(routes: RouteTable, limiter: RateLimiter, tokens: TokenIssuer) -> AppResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(UPSTREAM_TIMEOUT)
            .no_proxy()
            .build()
            .map_err(|e| AppError::Internal(anyhow::anyhow!("http client: {}", e)))?;
        Ok(Self {
            routes: Arc::new(routes),
            limiter: Arc::new(limiter),
            tokens,
            client,
        })
    }

    pub fn from_config(config: &Config) -> AppResult<Self> {
        let routes = RouteTable::new(vec![
            Route::new("/auth", &config.user_service_url),
            Route::new("/api", &config.quiz_service_url).protected(),
        ]);
        let limiter = RateLimiter::new(config.rate_limit_max, config.rate_limit_window);
        Self::new(routes, limiter, TokenIssuer::new(&config.jwt_secret))
    }
}

impl FromRef<GatewayState> for TokenIssuer {
    fn from_ref(state: &GatewayState) -> Self {
        state.tokens.clone()
    }
}

/// Fallback handler: every path not served by the gateway itself.
pub async fn dispatch(State(state): State<GatewayState>, req: Request) -> AppResult<Response> {
    let route = state
        .routes
        .lookup(req.uri().path())
        .cloned()
        .ok_or_else(|| AppError::NotFound(req.uri().path().to_string()))?;

    let claims = if route.public {
        None
    } else {
        Some(authenticate(req.headers(), &state.tokens)?)
    };

    let client_ip = peer_ip(&req);
    proxy::forward(&state.client, &route, req, claims.as_ref(), client_ip).await
}
