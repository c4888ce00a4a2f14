//! Response hardening headers and cross-origin policy.
//!
//! # Responsibilities
//! - Add the standard set of security response headers
//! - Allow cross-origin requests from any origin
//!
//! # Design Decisions
//! - Headers are only added when the response does not already carry them
//! - Both layers can be switched off in `[security]`

use axum::{
    http::{HeaderName, HeaderValue},
    Router,
};
use tower_http::{cors::CorsLayer, set_header::SetResponseHeaderLayer};

use crate::config::SecurityConfig;

/// Security headers added to every response.
pub const SECURITY_HEADERS: &[(&str, &str)] = &[
    (
        "content-security-policy",
        "default-src 'self';base-uri 'self';font-src 'self' https: data:;form-action 'self';\
         frame-ancestors 'self';img-src 'self' data:;object-src 'none';script-src 'self';\
         script-src-attr 'none';style-src 'self' https: 'unsafe-inline';upgrade-insecure-requests",
    ),
    ("cross-origin-opener-policy", "same-origin"),
    ("cross-origin-resource-policy", "same-origin"),
    ("origin-agent-cluster", "?1"),
    ("referrer-policy", "no-referrer"),
    ("strict-transport-security", "max-age=31536000; includeSubDomains"),
    ("x-content-type-options", "nosniff"),
    ("x-dns-prefetch-control", "off"),
    ("x-download-options", "noopen"),
    ("x-frame-options", "SAMEORIGIN"),
    ("x-permitted-cross-domain-policies", "none"),
    ("x-xss-protection", "0"),
];

/// Wrap `router` in the configured security layers.
pub fn apply_security_layers(mut router: Router, config: &SecurityConfig) -> Router {
    if config.enable_headers {
        for &(name, value) in SECURITY_HEADERS {
            router = router.layer(SetResponseHeaderLayer::if_not_present(
                HeaderName::from_static(name),
                HeaderValue::from_static(value),
            ));
        }
    }

    if config.cors_allow_all {
        router = router.layer(CorsLayer::permissive());
    }

    router
}
