//! Upstream API subsystem.
//!
//! # Data Flow
//! ```text
//! derived path + inbound query
//!     → client.rs (OutboundCall: URL, query, Accept/Authorization)
//!     → reqwest (connect + total deadline)
//!     → UpstreamResponse (2xx) or GatewayError (non-2xx / unreachable)
//! ```
//!
//! # Design Decisions
//! - One pooled client shared by every request
//! - Exactly one call per inbound request: no retries, no caching
//! - Bodies are buffered whole; payloads are small JSON documents

pub mod client;

pub use client::{ClientError, OutboundCall, UpstreamClient, UpstreamResponse};
