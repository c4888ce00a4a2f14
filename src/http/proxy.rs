//! The forwarding handler.
//!
//! One inbound request produces at most one upstream call. The handler
//! only suspends on that call; if the client disconnects, axum drops this
//! future and the outbound request with it.

use std::time::Instant;

use axum::{
    extract::State,
    http::{HeaderMap, Method, Uri},
    response::{IntoResponse, Response},
};
use tracing::Instrument;

use crate::error::GatewayError;
use crate::http::request::request_id;
use crate::http::response::relay;
use crate::http::server::AppState;
use crate::observability::metrics;
use crate::upstream::UpstreamResponse;

/// `GET {prefix}*`: forward to the upstream API and relay the answer.
pub async fn forward(
    State(state): State<AppState>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
) -> Response {
    let start_time = Instant::now();
    let span = tracing::info_span!(
        "forward",
        request_id = %request_id(&headers),
        path = %uri.path(),
    );

    async move {
        match forward_once(&state, &uri).await {
            Ok(upstream) => {
                metrics::record_request(method.as_str(), upstream.status.as_u16(), "success", start_time);
                relay(upstream)
            }
            Err(err) => {
                metrics::record_request(method.as_str(), err.status().as_u16(), err.outcome(), start_time);
                err.into_response()
            }
        }
    }
    .instrument(span)
    .await
}

async fn forward_once(state: &AppState, uri: &Uri) -> Result<UpstreamResponse, GatewayError> {
    let upstream_path = state.prefix.strip(uri.path())?;
    let call = state.upstream.prepare(upstream_path, uri.query())?;

    if !state.config.observability.is_production() {
        tracing::debug!(url = %call.url, "Making request to upstream API");
    }

    state.upstream.fetch(call).await
}
