//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware stack)
//!     → request.rs (request ID, query extraction)
//!     → health.rs ("/" and "/health")
//!     → proxy.rs ("{prefix}*": strip prefix, call upstream)
//!     → response.rs (relay success) / error.rs (wrap failure)
//!     → Send to client
//! ```

pub mod health;
pub mod proxy;
pub mod request;
pub mod response;
pub mod server;

pub use request::{MakeRequestUuidV4, X_REQUEST_ID};
pub use server::{AppState, HttpServer};
