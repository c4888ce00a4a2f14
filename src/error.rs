//! Gateway error taxonomy and the client-facing error envelope.

use axum::{
    body::Bytes,
    http::{header::InvalidHeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

/// Message returned when no upstream body is available.
pub const GENERIC_FAILURE: &str = "Failed to fetch data from TMDB API";

/// Errors that can occur while forwarding a request.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// Inbound path does not begin with the configured prefix.
    #[error("path {path} does not start with {prefix}")]
    PrefixMismatch { path: String, prefix: String },

    /// Nothing remains of the inbound path after the prefix.
    #[error("path {0} names no upstream resource")]
    EmptyUpstreamPath(String),

    /// The upstream path holds a `.` or `..` segment.
    #[error("path {0} contains a relative segment")]
    RelativeSegment(String),

    /// Upstream answered with a non-success status.
    #[error("upstream responded with {status}")]
    UpstreamStatus { status: StatusCode, body: Bytes },

    /// No usable response: connect failure, timeout or broken body.
    #[error("upstream request failed: {0}")]
    Unreachable(#[source] reqwest::Error),

    /// The derived upstream URL could not be built.
    #[error("invalid upstream url: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// The configured credential cannot be sent as a header.
    #[error("invalid credential header: {0}")]
    InvalidCredential(#[from] InvalidHeaderValue),
}

/// Body sent to the client for every failed request.
#[derive(Debug, Serialize)]
pub struct ErrorEnvelope {
    pub success: bool,
    pub error: Value,
}

impl GatewayError {
    /// Status returned to the client.
    pub fn status(&self) -> StatusCode {
        match self {
            GatewayError::PrefixMismatch { .. }
            | GatewayError::EmptyUpstreamPath(_)
            | GatewayError::RelativeSegment(_) => StatusCode::BAD_REQUEST,
            GatewayError::UpstreamStatus { status, .. } => *status,
            GatewayError::Unreachable(_)
            | GatewayError::InvalidUrl(_)
            | GatewayError::InvalidCredential(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Upstream status, if a response was received at all.
    pub fn upstream_status(&self) -> Option<StatusCode> {
        match self {
            GatewayError::UpstreamStatus { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Short outcome label for metrics.
    pub fn outcome(&self) -> &'static str {
        match self {
            GatewayError::PrefixMismatch { .. }
            | GatewayError::EmptyUpstreamPath(_)
            | GatewayError::RelativeSegment(_) => "rejected",
            GatewayError::UpstreamStatus { .. } => "upstream_error",
            GatewayError::Unreachable(e) if e.is_timeout() => "timeout",
            GatewayError::Unreachable(_) => "unreachable",
            GatewayError::InvalidUrl(_) | GatewayError::InvalidCredential(_) => "internal",
        }
    }

    /// The `error` member of the envelope.
    pub fn envelope(&self) -> ErrorEnvelope {
        let error = match self {
            GatewayError::PrefixMismatch { .. }
            | GatewayError::EmptyUpstreamPath(_)
            | GatewayError::RelativeSegment(_) => Value::String(self.to_string()),
            GatewayError::UpstreamStatus { body, .. } => upstream_error_value(body),
            _ => Value::String(GENERIC_FAILURE.to_string()),
        };
        ErrorEnvelope { success: false, error }
    }
}

/// Embed an upstream error body: as JSON when it parses, else as text.
fn upstream_error_value(body: &Bytes) -> Value {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Value::String(GENERIC_FAILURE.to_string());
    }
    serde_json::from_slice(body)
        .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(body).into_owned()))
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let status = self.status();
        let upstream_status = self.upstream_status();

        tracing::error!(
            status = %upstream_status.map(|s| s.as_u16().to_string()).unwrap_or_else(|| "No response".to_string()),
            status_text = upstream_status.and_then(|s| s.canonical_reason()).unwrap_or("No status text"),
            message = %self,
            "Error fetching data from upstream"
        );

        (status, Json(self.envelope())).into_response()
    }
}
