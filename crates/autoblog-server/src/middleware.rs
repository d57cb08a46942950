//! Request filters applied in front of the handlers

use crate::error::ApiError;
use crate::state::SharedState;
use axum::extract::{Request, State};
use axum::http::header::{self, HeaderValue};
use axum::http::{HeaderMap, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use tracing::{debug, warn};

/// Standard hardening headers; API responses are never cached
pub async fn security_headers(request: Request, next: Next) -> Response {
    let is_api = request.uri().path().starts_with("/api/");
    let mut response = next.run(request).await;

    let headers = response.headers_mut();
    headers.insert(header::X_CONTENT_TYPE_OPTIONS, HeaderValue::from_static("nosniff"));
    headers.insert(header::X_FRAME_OPTIONS, HeaderValue::from_static("DENY"));
    headers.insert(
        header::REFERRER_POLICY,
        HeaderValue::from_static("strict-origin-when-cross-origin"),
    );
    if is_api {
        headers.insert(
            header::CACHE_CONTROL,
            HeaderValue::from_static("no-store, no-cache, must-revalidate"),
        );
        headers.insert(header::PRAGMA, HeaderValue::from_static("no-cache"));
    }
    response
}

/// Reject API calls with no user agent, or one naming a blocked agent
pub async fn block_bots(State(state): State<SharedState>, request: Request, next: Next) -> Response {
    if request.uri().path().starts_with("/api/") {
        let agent = request
            .headers()
            .get(header::USER_AGENT)
            .and_then(|v| v.to_str().ok())
            .map(str::to_lowercase)
            .unwrap_or_default();

        let blocked = agent.trim().is_empty()
            || state.blocked_agents.iter().any(|b| agent.contains(b.as_str()));
        if blocked {
            debug!("Blocked request from agent {:?}", agent);
            return (StatusCode::FORBIDDEN, "Access denied").into_response();
        }
    }
    next.run(request).await
}

/// Client key for rate limiting: first forwarded address, else "local"
fn client_key(headers: &HeaderMap) -> String {
    headers
        .get("x-forwarded-for")
        .or_else(|| headers.get("x-real-ip"))
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| "local".to_string())
}

/// Per client and route sliding-window limit
pub async fn rate_limit(State(state): State<SharedState>, request: Request, next: Next) -> Response {
    let key = format!("{} {}", client_key(request.headers()), request.uri().path());

    match state.limiter.check(&key) {
        Ok(()) => next.run(request).await,
        Err(retry) => {
            warn!("Rate limited {}", key);
            let secs = retry.0.as_secs().max(1);
            let mut response = ApiError::new(
                StatusCode::TOO_MANY_REQUESTS,
                "RATE_LIMITED",
                "Too many requests. Please slow down.",
            )
            .into_response();
            if let Ok(value) = HeaderValue::from_str(&secs.to_string()) {
                response.headers_mut().insert(header::RETRY_AFTER, value);
            }
            response
        }
    }
}
