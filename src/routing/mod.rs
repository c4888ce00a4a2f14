//! Request routing subsystem.
//!
//! # Data Flow
//! ```text
//! Inbound path "/tmdb/movie/550"
//!     → matcher.rs (check prefix, remove it once)
//!     → "movie/550" handed to the upstream client
//! ```

pub mod matcher;

pub use matcher::PathPrefix;
