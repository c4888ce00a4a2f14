//! Response construction for the client.
//!
//! # Design Decisions
//! - Upstream successes are relayed unwrapped: same status, same bytes
//! - Failures are wrapped in the `{success: false, error}` envelope by
//!   `GatewayError`'s `IntoResponse`

use axum::{
    http::{header, HeaderValue},
    response::{IntoResponse, Response},
};

use crate::upstream::UpstreamResponse;

/// Relay a successful upstream answer without re-serializing it.
pub fn relay(upstream: UpstreamResponse) -> Response {
    let content_type = upstream
        .content_type
        .unwrap_or_else(|| HeaderValue::from_static("application/json"));

    (upstream.status, [(header::CONTENT_TYPE, content_type)], upstream.body).into_response()
}
