//! HTTP plumbing shared by every endpoint group.

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;
use reqwest::{Method, RequestBuilder, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

use crate::cache::CacheValue;
use crate::error::{BackendError, extract_message};

/// Connection settings for the backend.
#[derive(Debug, Clone)]
pub struct BackendConfig {
    /// Root of the REST API, e.g. `https://api.example.com/api/`.
    pub base_url: Url,
    /// Per-request timeout.
    pub timeout: Duration,
    /// How long product and category reads stay cached.
    pub cache_ttl: Duration,
}

impl BackendConfig {
    /// Settings with the default timeout and cache lifetime.
    #[must_use]
    pub const fn new(base_url: Url) -> Self {
        Self {
            base_url,
            timeout: Duration::from_secs(15),
            cache_ttl: Duration::from_secs(60),
        }
    }
}

// =============================================================================
// BackendClient
// =============================================================================

/// Client for the commerce REST backend.
///
/// Cheap to clone. Product and category reads are cached; everything else
/// goes straight to the backend. Use [`Self::authorized`] to obtain a copy
/// that sends a user's bearer token.
#[derive(Clone)]
pub struct BackendClient {
    inner: Arc<BackendClientInner>,
    token: Option<Arc<SecretString>>,
}

struct BackendClientInner {
    client: reqwest::Client,
    base_url: Url,
    cache: Cache<String, CacheValue>,
}

impl std::fmt::Debug for BackendClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BackendClient")
            .field("base_url", &self.inner.base_url.as_str())
            .field("authorized", &self.token.is_some())
            .finish_non_exhaustive()
    }
}

impl BackendClient {
    /// Create a new backend client.
    ///
    /// # Errors
    ///
    /// Returns an error if the base URL cannot be a base for relative paths
    /// or the HTTP client cannot be constructed.
    pub fn new(config: &BackendConfig) -> Result<Self, BackendError> {
        if config.base_url.cannot_be_a_base() {
            return Err(BackendError::InvalidUrl(config.base_url.to_string()));
        }

        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(concat!("threadline/", env!("CARGO_PKG_VERSION")))
            .build()?;

        let cache = Cache::builder()
            .max_capacity(1000)
            .time_to_live(config.cache_ttl)
            .build();

        Ok(Self {
            inner: Arc::new(BackendClientInner {
                client,
                base_url: config.base_url.clone(),
                cache,
            }),
            token: None,
        })
    }

    /// A copy of this client that authenticates as the token's owner.
    #[must_use]
    pub fn authorized(&self, token: &str) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
            token: Some(Arc::new(SecretString::from(token))),
        }
    }

    /// Whether a bearer token is attached.
    #[must_use]
    pub const fn is_authorized(&self) -> bool {
        self.token.is_some()
    }

    pub(crate) fn cache(&self) -> &Cache<String, CacheValue> {
        &self.inner.cache
    }

    /// Resolve path segments against the base URL, percent-encoding each.
    pub(crate) fn url(&self, segments: &[&str]) -> Result<Url, BackendError> {
        let mut url = self.inner.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| BackendError::InvalidUrl(self.inner.base_url.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// Start a request for `segments`, attaching the bearer token if any.
    pub(crate) fn request(
        &self,
        method: Method,
        segments: &[&str],
    ) -> Result<RequestBuilder, BackendError> {
        let url = self.url(segments)?;
        let builder = self.inner.client.request(method, url);
        Ok(match &self.token {
            Some(token) => builder.bearer_auth(token.expose_secret()),
            None => builder,
        })
    }

    /// Send a request and decode its JSON body.
    pub(crate) async fn send_json<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
    ) -> Result<T, BackendError> {
        let body = self.send(request).await?;
        serde_json::from_str(&body).map_err(|e| {
            tracing::error!(
                error = %e,
                body = %body.chars().take(500).collect::<String>(),
                "Failed to parse backend response"
            );
            BackendError::Parse(e)
        })
    }

    /// Send a request whose response body is irrelevant.
    pub(crate) async fn send_empty(&self, request: RequestBuilder) -> Result<(), BackendError> {
        self.send(request).await.map(drop)
    }

    /// Send a request, mapping non-success statuses to [`BackendError`].
    async fn send(&self, request: RequestBuilder) -> Result<String, BackendError> {
        let response = request.send().await?;
        let status = response.status();
        let path = response.url().path().to_string();

        // Check for rate limiting
        if status == StatusCode::TOO_MANY_REQUESTS {
            let retry_after = response
                .headers()
                .get(reqwest::header::RETRY_AFTER)
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse::<u64>().ok())
                .unwrap_or(1);
            return Err(BackendError::RateLimited(retry_after));
        }

        let body = response.text().await?;
        debug!(status = %status, path = %path, "Backend responded");

        match status {
            s if s.is_success() => Ok(body),
            StatusCode::UNAUTHORIZED => Err(BackendError::Unauthorized),
            StatusCode::FORBIDDEN => Err(BackendError::Forbidden),
            StatusCode::NOT_FOUND => Err(BackendError::NotFound(path)),
            s => {
                if s.is_server_error() {
                    tracing::error!(
                        status = %s,
                        path = %path,
                        body = %body.chars().take(500).collect::<String>(),
                        "Backend returned server error"
                    );
                } else {
                    tracing::warn!(status = %s, path = %path, "Backend rejected request");
                }
                Err(BackendError::Status {
                    status: s.as_u16(),
                    message: extract_message(&body),
                })
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn client(base: &str) -> BackendClient {
        BackendClient::new(&BackendConfig::new(Url::parse(base).unwrap())).unwrap()
    }

    #[test]
    fn test_url_joins_and_encodes_segments() {
        let client = client("https://api.test/api/");
        let url = client.url(&["users", "a b/c", "cart"]).unwrap();
        assert_eq!(url.as_str(), "https://api.test/api/users/a%20b%2Fc/cart");
    }

    #[test]
    fn test_url_without_trailing_slash() {
        let client = client("https://api.test/api");
        assert_eq!(
            client.url(&["products"]).unwrap().as_str(),
            "https://api.test/api/products"
        );
    }

    #[test]
    fn test_rejects_non_base_url() {
        let config = BackendConfig::new(Url::parse("mailto:ops@example.com").unwrap());
        assert!(matches!(
            BackendClient::new(&config),
            Err(BackendError::InvalidUrl(_))
        ));
    }

    #[test]
    fn test_authorized_shares_inner_state() {
        let anonymous = client("https://api.test/api/");
        let authed = anonymous.authorized("token-123");
        assert!(!anonymous.is_authorized());
        assert!(authed.is_authorized());
        assert!(Arc::ptr_eq(&anonymous.inner, &authed.inner));
        assert!(!format!("{authed:?}").contains("token-123"));
    }
}
