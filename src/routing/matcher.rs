//! Path prefix matching and removal.
//!
//! # Design Decisions
//! - Only a single leading occurrence of the prefix is removed; the same
//!   text appearing later in the path is left alone
//! - Path matching is case-sensitive
//! - A path without the prefix, or with nothing after it, has no upstream
//!   counterpart and is rejected rather than forwarded
//! - `.` and `..` segments, plain or percent-encoded, are rejected so the
//!   derived path always stays below the upstream base

use crate::error::GatewayError;

/// A literal inbound path prefix such as `/tmdb/`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathPrefix {
    prefix: String,
}

impl PathPrefix {
    /// Create a new prefix. A missing trailing slash is added.
    pub fn new(prefix: impl Into<String>) -> Self {
        let mut prefix = prefix.into();
        if !prefix.ends_with('/') {
            prefix.push('/');
        }
        Self { prefix }
    }

    pub fn as_str(&self) -> &str {
        &self.prefix
    }

    /// Axum route pattern capturing everything after the prefix.
    pub fn route_pattern(&self) -> String {
        format!("{}{{*path}}", self.prefix)
    }

    pub fn matches(&self, path: &str) -> bool {
        path.starts_with(&self.prefix)
    }

    /// Derive the upstream path by removing the prefix once from the front.
    ///
    /// Extra leading slashes left over after the prefix are dropped so the
    /// result never starts with `/`.
    pub fn strip<'a>(&self, path: &'a str) -> Result<&'a str, GatewayError> {
        let rest = path
            .strip_prefix(self.prefix.as_str())
            .ok_or_else(|| GatewayError::PrefixMismatch {
                path: path.to_string(),
                prefix: self.prefix.clone(),
            })?;

        let rest = rest.trim_start_matches('/');
        if rest.is_empty() {
            return Err(GatewayError::EmptyUpstreamPath(path.to_string()));
        }
        if rest.split(['/', '\\']).any(is_relative_segment) {
            return Err(GatewayError::RelativeSegment(path.to_string()));
        }
        Ok(rest)
    }
}

/// `.` or `..`, including the `%2e` spellings URL parsers resolve.
fn is_relative_segment(segment: &str) -> bool {
    let decoded = segment.to_ascii_lowercase().replace("%2e", ".");
    decoded == "." || decoded == ".."
}
