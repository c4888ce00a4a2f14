//! Security subsystem.
//!
//! # Data Flow
//! ```text
//! Outgoing response:
//!     → headers.rs (CORS, hardening headers)
//!     → Send to client
//! ```
//!
//! Inbound body size is capped in the HTTP server's middleware stack.

pub mod headers;
