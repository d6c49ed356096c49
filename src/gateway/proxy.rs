//! Request forwarding to upstream services.

use axum::{
    body::{to_bytes, Body},
    extract::Request,
    http::{header, HeaderMap, HeaderName, HeaderValue},
    response::Response,
};
use std::net::IpAddr;
use tracing::debug;

use super::routes::Route;
use crate::auth::Claims;
use crate::error::{AppError, AppResult};

/// Largest request body the gateway buffers before forwarding.
pub const MAX_BODY_BYTES: usize = 2 * 1024 * 1024;

pub const HEADER_USER_ID: &str = "x-user-id";
pub const HEADER_USER_ROLE: &str = "x-user-role";
pub const HEADER_FORWARDED_FOR: &str = "x-forwarded-for";

static HOP_BY_HOP: [HeaderName; 7] = [
    header::CONNECTION,
    header::PROXY_AUTHENTICATE,
    header::PROXY_AUTHORIZATION,
    header::TE,
    header::TRAILER,
    header::TRANSFER_ENCODING,
    header::UPGRADE,
];

fn strip_hop_by_hop(headers: &mut HeaderMap) {
    for name in HOP_BY_HOP.iter() {
        headers.remove(name);
    }
    headers.remove("keep-alive");
}

/// Forward `req` along `route` and relay the upstream status, headers and body.
pub async fn forward(
    client: &reqwest::Client,
    route: &Route,
    req: Request,
    identity: Option<&Claims>,
    client_ip: Option<IpAddr>,
) -> AppResult<Response> {
    let (parts, body) = req.into_parts();
    let url = route.target_url(parts.uri.path(), parts.uri.query());

    let body = to_bytes(body, MAX_BODY_BYTES)
        .await
        .map_err(|e| {
            debug!(error = %e, "request body rejected");
            AppError::PayloadTooLarge
        })?;

    let mut headers = parts.headers;
    strip_hop_by_hop(&mut headers);
    headers.remove(header::HOST);
    headers.remove(header::CONTENT_LENGTH);
    headers.remove(HEADER_USER_ID);
    headers.remove(HEADER_USER_ROLE);

    if let Some(claims) = identity {
        if let Ok(v) = HeaderValue::from_str(&claims.user_id.to_string()) {
            headers.insert(HEADER_USER_ID, v);
        }
        headers.insert(HEADER_USER_ROLE, HeaderValue::from_static(claims.role.as_str()));
    }

    if let Some(ip) = client_ip {
        let forwarded = match headers.get(HEADER_FORWARDED_FOR).and_then(|v| v.to_str().ok()) {
            Some(prior) => format!("{}, {}", prior, ip),
            None => ip.to_string(),
        };
        if let Ok(v) = HeaderValue::from_str(&forwarded) {
            headers.insert(HEADER_FORWARDED_FOR, v);
        }
    }

    debug!(method = %parts.method, url = %url, "forwarding");
    let upstream = client
        .request(parts.method, &url)
        .headers(headers)
        .body(body)
        .send()
        .await
        .map_err(|e| AppError::Upstream(format!("{}: {}", url, e)))?;

    let mut builder = Response::builder().status(upstream.status());
    if let Some(out) = builder.headers_mut() {
        for (name, value) in upstream.headers() {
            out.append(name.clone(), value.clone());
        }
        strip_hop_by_hop(out);
    }
    builder
        .body(Body::from_stream(upstream.bytes_stream()))
        .map_err(|e| AppError::Internal(anyhow::anyhow!("build response: {}", e)))
}
