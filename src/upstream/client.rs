//! Outbound calls to the upstream API.
//!
//! # Responsibilities
//! - Resolve `{base_url}/{upstream_path}` and copy the inbound query as-is
//! - Attach `Accept` and, when configured, `Authorization` headers
//! - Enforce connect and total deadlines on every call
//! - Classify the result into success, upstream error or unreachable

use std::time::Duration;

use axum::body::Bytes;
use reqwest::header::{self, HeaderMap, HeaderValue};
use reqwest::StatusCode;
use thiserror::Error;
use url::Url;

use crate::config::{TimeoutConfig, UpstreamConfig};
use crate::error::GatewayError;

/// Failure to construct the upstream client at startup.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("invalid upstream base url: {0}")]
    BaseUrl(#[from] url::ParseError),

    #[error("failed to build HTTP client: {0}")]
    Build(#[from] reqwest::Error),
}

/// A fully resolved outbound GET.
#[derive(Debug, Clone)]
pub struct OutboundCall {
    pub url: Url,
    pub headers: HeaderMap,
}

impl OutboundCall {
    /// Resolve the call for `upstream_path` under `base`.
    ///
    /// The raw query is copied without decoding, so every key and value
    /// reaches the upstream byte for byte. No `?` is added when it is empty.
    pub fn build(
        base: &Url,
        upstream_path: &str,
        query: Option<&str>,
        token: Option<&str>,
    ) -> Result<Self, GatewayError> {
        let base_path = base.path().trim_end_matches('/');
        let mut url = base.clone();
        url.set_path(&format!(
            "{}/{}",
            base_path,
            upstream_path.trim_start_matches('/')
        ));
        // set_path resolves dot segments; the result must stay under the base.
        if !url.path().starts_with(&format!("{}/", base_path)) {
            return Err(GatewayError::RelativeSegment(upstream_path.to_string()));
        }
        url.set_query(query.filter(|q| !q.is_empty()));

        let mut headers = HeaderMap::new();
        headers.insert(header::ACCEPT, HeaderValue::from_static("application/json"));
        if let Some(token) = token.filter(|t| !t.is_empty()) {
            let mut value = HeaderValue::from_str(&format!("Bearer {}", token))?;
            value.set_sensitive(true);
            headers.insert(header::AUTHORIZATION, value);
        }

        Ok(Self { url, headers })
    }
}

/// A successful upstream answer, relayed to the client unchanged.
#[derive(Debug)]
pub struct UpstreamResponse {
    pub status: StatusCode,
    pub content_type: Option<HeaderValue>,
    pub body: Bytes,
}

/// Shared handle to the upstream API. Cheap to clone.
#[derive(Clone)]
pub struct UpstreamClient {
    http: reqwest::Client,
    base_url: Url,
    token: Option<String>,
}

impl UpstreamClient {
    pub fn new(upstream: &UpstreamConfig, timeouts: &TimeoutConfig) -> Result<Self, ClientError> {
        let base_url = Url::parse(&upstream.base_url)?;
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeouts.upstream_secs))
            .connect_timeout(Duration::from_secs(timeouts.connect_secs))
            .user_agent(concat!("tmdb-gateway/", env!("CARGO_PKG_VERSION")))
            .no_proxy()
            .build()?;

        Ok(Self {
            http,
            base_url,
            token: upstream.token().map(str::to_string),
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Resolve the outbound call for a derived path and inbound query.
    pub fn prepare(
        &self,
        upstream_path: &str,
        query: Option<&str>,
    ) -> Result<OutboundCall, GatewayError> {
        OutboundCall::build(&self.base_url, upstream_path, query, self.token.as_deref())
    }

    /// Issue the call. Dropping the returned future aborts the request.
    pub async fn fetch(&self, call: OutboundCall) -> Result<UpstreamResponse, GatewayError> {
        let response = self
            .http
            .get(call.url)
            .headers(call.headers)
            .send()
            .await
            .map_err(GatewayError::Unreachable)?;

        let status = response.status();
        let content_type = response.headers().get(header::CONTENT_TYPE).cloned();
        let body = response.bytes().await.map_err(GatewayError::Unreachable)?;

        if !status.is_success() {
            return Err(GatewayError::UpstreamStatus { status, body });
        }

        Ok(UpstreamResponse {
            status,
            content_type,
            body,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> Url {
        Url::parse("https://api.themoviedb.org/3").unwrap()
    }

    #[test]
    fn test_url_joins_base_and_path() {
        let call = OutboundCall::build(&base(), "movie/550", None, None).unwrap();
        assert_eq!(call.url.as_str(), "https://api.themoviedb.org/3/movie/550");

        let trailing = Url::parse("https://api.themoviedb.org/3/").unwrap();
        let call = OutboundCall::build(&trailing, "/movie/550", None, None).unwrap();
        assert_eq!(call.url.as_str(), "https://api.themoviedb.org/3/movie/550");
    }

    #[test]
    fn test_path_cannot_escape_base() {
        for path in ["../account", "movie/../../account", "%2e%2e/account", "..\\account"] {
            let err = OutboundCall::build(&base(), path, None, Some("secret")).unwrap_err();
            assert!(matches!(err, GatewayError::RelativeSegment(_)), "{path} escaped");
        }
    }

    #[test]
    fn test_query_is_copied_verbatim() {
        let query = "language=en-US&page=2&with_genres=28&with_genres=12";
        let call = OutboundCall::build(&base(), "discover/movie", Some(query), None).unwrap();
        assert_eq!(call.url.query(), Some(query));
    }

    #[test]
    fn test_query_bytes_are_not_reencoded() {
        let query = "query=%FF&x=a%20b&y=c+d&z=%E2%9C%93";
        let call = OutboundCall::build(&base(), "search/movie", Some(query), None).unwrap();
        assert_eq!(call.url.query(), Some(query));
        assert_eq!(
            call.url.as_str(),
            "https://api.themoviedb.org/3/search/movie?query=%FF&x=a%20b&y=c+d&z=%E2%9C%93"
        );
    }

    #[test]
    fn test_no_query_means_no_question_mark() {
        let call = OutboundCall::build(&base(), "configuration", None, None).unwrap();
        assert_eq!(call.url.query(), None);

        let call = OutboundCall::build(&base(), "configuration", Some(""), None).unwrap();
        assert_eq!(call.url.query(), None);
    }

    #[test]
    fn test_token_sets_authorization() {
        let call = OutboundCall::build(&base(), "movie/550", None, Some("abc123")).unwrap();
        assert_eq!(call.headers[header::AUTHORIZATION], "Bearer abc123");
        assert_eq!(call.headers[header::ACCEPT], "application/json");
    }

    #[test]
    fn test_missing_or_empty_token_omits_authorization() {
        let call = OutboundCall::build(&base(), "movie/550", None, None).unwrap();
        assert!(call.headers.get(header::AUTHORIZATION).is_none());

        let call = OutboundCall::build(&base(), "movie/550", None, Some("")).unwrap();
        assert!(call.headers.get(header::AUTHORIZATION).is_none());
        assert_eq!(call.headers.len(), 1);
    }

    #[test]
    fn test_invalid_token_is_an_error() {
        let err = OutboundCall::build(&base(), "movie/550", None, Some("bad\ntoken")).unwrap_err();
        assert!(matches!(err, GatewayError::InvalidCredential(_)));
    }

    #[test]
    fn test_client_uses_configured_base() {
        let upstream = UpstreamConfig {
            base_url: "http://127.0.0.1:9/3".into(),
            bearer_token: Some("t".into()),
            ..UpstreamConfig::default()
        };
        let client = UpstreamClient::new(&upstream, &TimeoutConfig::default()).unwrap();
        let call = client.prepare("tv/1399", Some("a=1")).unwrap();
        assert_eq!(call.url.as_str(), "http://127.0.0.1:9/3/tv/1399?a=1");
        assert_eq!(call.headers[header::AUTHORIZATION], "Bearer t");
    }

    #[tokio::test]
    async fn test_refused_connection_is_unreachable() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let upstream = UpstreamConfig {
            base_url: format!("http://{}/3", addr),
            ..UpstreamConfig::default()
        };
        let client = UpstreamClient::new(&upstream, &TimeoutConfig::default()).unwrap();
        let call = client.prepare("movie/550", None).unwrap();

        let err = client.fetch(call).await.unwrap_err();
        assert!(matches!(err, GatewayError::Unreachable(_)));
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
