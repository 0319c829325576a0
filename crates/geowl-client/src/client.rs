//! Geo service client implementation.

use crate::config::RateLimitConfig;
use async_trait::async_trait;
use geowl_core::{Address, GeoLookup, GeoLookupResult, GeoWlError, Result};
use governor::DefaultDirectRateLimiter;
use reqwest::Client as HttpClient;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// The geojs.io geo endpoint; the address is appended as the last path segment
pub const DEFAULT_BASE_URL: &str = "https://get.geojs.io/v1/ip/geo";

/// Default request timeout
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// HTTP client for a geojs-compatible geolocation service
///
/// Issues `GET <base-url>/<escaped address>` and expects a JSON body with
/// at least `country_code`.
#[derive(Clone)]
pub struct GeoClient {
    inner: Arc<ClientInner>,
}

struct ClientInner {
    http: HttpClient,
    base_url: String,
    timeout: Duration,
    rate_limiter: Option<DefaultDirectRateLimiter>,
}

impl std::fmt::Debug for GeoClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeoClient")
            .field("base_url", &self.inner.base_url)
            .field("timeout", &self.inner.timeout)
            .field("rate_limited", &self.inner.rate_limiter.is_some())
            .finish()
    }
}

impl GeoClient {
    /// Create a client for the default service
    pub fn new() -> Result<Self> {
        GeoClientBuilder::new().build()
    }

    /// Create a builder for custom configuration
    #[must_use]
    pub fn builder() -> GeoClientBuilder {
        GeoClientBuilder::new()
    }

    /// Base URL requests are sent to
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.inner.base_url
    }

    /// Look up an address
    pub async fn lookup(&self, addr: &Address) -> Result<GeoLookupResult> {
        if let Some(limiter) = &self.inner.rate_limiter {
            limiter.until_ready().await;
        }

        let url = self.build_url(addr);
        debug!(url = %url, "GET request");

        let response = self
            .inner
            .http
            .get(&url)
            .send()
            .await
            .map_err(|e| self.transport_error(&e))?;

        let status = response.status();
        if !status.is_success() {
            warn!(addr = %addr, status = status.as_u16(), "geo service error response");
            return Err(GeoWlError::Status {
                code: status.as_u16(),
            });
        }

        let body = response
            .text()
            .await
            .map_err(|e| self.transport_error(&e))?;
        let geo: GeoLookupResult = serde_json::from_str(&body)?;

        if geo.country_code().is_none() {
            return Err(GeoWlError::MissingCountryCode {
                addr: addr.canonical().to_string(),
            });
        }

        debug!(
            addr = %addr,
            country = ?geo.country_code(),
            region = ?geo.region(),
            "geo info found"
        );
        Ok(geo)
    }

    /// Build the request URL for an address
    fn build_url(&self, addr: &Address) -> String {
        format!(
            "{}/{}",
            self.inner.base_url.trim_end_matches('/'),
            urlencoding::encode(addr.canonical())
        )
    }

    fn transport_error(&self, err: &reqwest::Error) -> GeoWlError {
        if err.is_timeout() {
            GeoWlError::Timeout(self.inner.timeout)
        } else {
            GeoWlError::Http(err.to_string())
        }
    }
}

#[async_trait]
impl GeoLookup for GeoClient {
    async fn resolve(&self, addr: &Address) -> Result<GeoLookupResult> {
        self.lookup(addr).await
    }

    fn name(&self) -> &'static str {
        "geojs"
    }
}

/// Builder for configuring a [`GeoClient`]
pub struct GeoClientBuilder {
    base_url: String,
    timeout: Duration,
    user_agent: String,
    rate_limit: Option<RateLimitConfig>,
}

impl Default for GeoClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl GeoClientBuilder {
    /// Create a new builder with default settings
    #[must_use]
    pub fn new() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
            user_agent: format!("geowl/{}", env!("CARGO_PKG_VERSION")),
            rate_limit: None,
        }
    }

    /// Set the base URL (useful for testing)
    #[must_use]
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Set the request timeout
    #[must_use]
    pub const fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the User-Agent header
    #[must_use]
    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.user_agent = agent.into();
        self
    }

    /// Throttle outbound lookups
    #[must_use]
    pub const fn rate_limit(mut self, config: RateLimitConfig) -> Self {
        self.rate_limit = Some(config);
        self
    }

    /// Build the client
    pub fn build(self) -> Result<GeoClient> {
        url::Url::parse(&self.base_url)
            .map_err(|e| GeoWlError::Config(format!("invalid service URL {:?}: {e}", self.base_url)))?;

        let http = HttpClient::builder()
            .timeout(self.timeout)
            .user_agent(&self.user_agent)
            .gzip(true)
            .build()
            .map_err(|e| GeoWlError::Http(e.to_string()))?;

        Ok(GeoClient {
            inner: Arc::new(ClientInner {
                http,
                base_url: self.base_url,
                timeout: self.timeout,
                rate_limiter: self
                    .rate_limit
                    .map(|config| governor::RateLimiter::direct(config.quota())),
            }),
        })
    }
}

// URL encoding helper
mod urlencoding {
    pub fn encode(s: &str) -> String {
        url::form_urlencoded::byte_serialize(s.as_bytes()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geowl_core::classify;
    use serde_json::json;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer) -> GeoClient {
        GeoClient::builder()
            .base_url(format!("{}/v1/ip/geo/", server.uri()))
            .timeout(Duration::from_millis(200))
            .build()
            .unwrap()
    }

    #[tokio::test]
    async fn test_lookup_success() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/ip/geo/8.8.8.8"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "ip": "8.8.8.8",
                "country_code": "US",
                "region": "California",
                "city": "Mountain View"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let geo = client_for(&server)
            .lookup(&classify("8.8.8.8").unwrap())
            .await
            .unwrap();
        assert_eq!(geo.country_code(), Some("US"));
        assert_eq!(geo.region(), Some("California"));
    }

    #[tokio::test]
    async fn test_ipv6_address_is_escaped() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/ip/geo/2001%3Adb8%3A%3A1"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({ "country_code": "DE" })),
            )
            .expect(1)
            .mount(&server)
            .await;

        let geo = client_for(&server)
            .lookup(&classify("2001:0db8::0001").unwrap())
            .await
            .unwrap();
        assert_eq!(geo.country_code(), Some("DE"));
        assert_eq!(geo.region(), None);
    }

    #[tokio::test]
    async fn test_non_success_status_is_failure() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let err = client_for(&server)
            .lookup(&classify("1.2.3.4").unwrap())
            .await
            .unwrap_err();
        assert_eq!(err.status_code(), Some(503));
        assert!(err.is_lookup_failure());
    }

    #[tokio::test]
    async fn test_malformed_body_is_failure() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>nope</html>"))
            .mount(&server)
            .await;

        let err = client_for(&server)
            .lookup(&classify("1.2.3.4").unwrap())
            .await
            .unwrap_err();
        assert!(matches!(err, GeoWlError::Json(_)));
    }

    #[tokio::test]
    async fn test_missing_country_code_is_failure() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({ "region": "Oregon" })),
            )
            .mount(&server)
            .await;

        let err = client_for(&server)
            .lookup(&classify("1.2.3.4").unwrap())
            .await
            .unwrap_err();
        assert!(matches!(err, GeoWlError::MissingCountryCode { ref addr } if addr == "1.2.3.4"));
    }

    #[tokio::test]
    async fn test_slow_service_times_out() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({ "country_code": "US" }))
                    .set_delay(Duration::from_secs(2)),
            )
            .mount(&server)
            .await;

        let err = client_for(&server)
            .lookup(&classify("1.2.3.4").unwrap())
            .await
            .unwrap_err();
        assert!(matches!(err, GeoWlError::Timeout(_)));
    }

    #[tokio::test]
    async fn test_rate_limited_client_still_resolves() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "country_code": "FR" })))
            .expect(2)
            .mount(&server)
            .await;

        let client = GeoClient::builder()
            .base_url(server.uri())
            .rate_limit(RateLimitConfig::new().requests_per_second(100).burst_size(2))
            .build()
            .unwrap();
        let addr = classify("5.6.7.8").unwrap();
        assert!(client.resolve(&addr).await.is_ok());
        assert!(client.resolve(&addr).await.is_ok());
        assert_eq!(client.name(), "geojs");
    }

    #[test]
    fn test_invalid_base_url() {
        let err = GeoClient::builder().base_url("not a url").build().unwrap_err();
        assert!(matches!(err, GeoWlError::Config(_)));
    }
}
