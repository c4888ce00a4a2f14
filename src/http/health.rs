//! Liveness endpoints. These never consult the upstream.

use axum::{
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

pub const HEALTH_PATH: &str = "/health";

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthStatus {
    pub status_code: u16,
    pub status: &'static str,
    pub message: &'static str,
}

/// `GET /` sends clients to the health endpoint.
pub async fn root() -> Response {
    (StatusCode::FOUND, [(header::LOCATION, HEALTH_PATH)]).into_response()
}

/// `GET /health`
pub async fn health() -> (StatusCode, Json<HealthStatus>) {
    (
        StatusCode::OK,
        Json(HealthStatus {
            status_code: 200,
            status: "OK",
            message: "Proxy server is running and healthy.",
        }),
    )
}
