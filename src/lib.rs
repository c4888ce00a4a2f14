//! TMDB forwarding gateway library.
//!
//! Accepts `GET /tmdb/*`, forwards it to the TMDB API with the configured
//! bearer credential and the client's query, and relays the answer.

pub mod config;
pub mod error;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod routing;
pub mod security;
pub mod upstream;

pub use config::GatewayConfig;
pub use error::GatewayError;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
