//! Gateway rate limiting, applied ahead of routing.

use axum::{
    extract::{ConnectInfo, Request, State},
    http::{HeaderName, HeaderValue},
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;
use tracing::warn;

use crate::error::AppError;
use crate::gateway::proxy::HEADER_FORWARDED_FOR;
use crate::services::{RateDecision, RateLimiter};

pub const HEADER_RATE_LIMIT: &str = "x-ratelimit-limit";
pub const HEADER_RATE_REMAINING: &str = "x-ratelimit-remaining";
const ANONYMOUS: &str = "anonymous";

/// Socket peer address, when the server was started with connect info.
pub fn peer_ip(req: &Request) -> Option<IpAddr> {
    req.extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip())
}

/// Rate-limit key: peer IP, else first `x-forwarded-for` hop, else a shared bucket.
pub fn client_identity(req: &Request) -> String {
    if let Some(ip) = peer_ip(req) {
        return ip.to_string();
    }
    req.headers()
        .get(HEADER_FORWARDED_FOR)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| ANONYMOUS.to_string())
}

pub async fn rate_limit(
    State(limiter): State<Arc<RateLimiter>>,
    request: Request,
    next: Next,
) -> Response {
    let key = client_identity(&request);
    match limiter.check(&key) {
        RateDecision::Allowed { remaining } => {
            let mut response = next.run(request).await;
            let headers = response.headers_mut();
            headers.insert(
                HeaderName::from_static(HEADER_RATE_LIMIT),
                HeaderValue::from(limiter.max_requests()),
            );
            headers.insert(
                HeaderName::from_static(HEADER_RATE_REMAINING),
                HeaderValue::from(remaining),
            );
            response
        }
        RateDecision::Limited { retry_after } => {
            warn!(client = %key, "rate limit exceeded");
            AppError::RateLimited {
                retry_after_secs: retry_after.as_secs().max(1),
            }
            .into_response()
        }
    }
}
