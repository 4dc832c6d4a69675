//! HTTP client with retry and rate limiting
//!
//! Every request goes through the same loop: wait for the rate limiter,
//! apply credentials, send with an explicit timeout, then either return the
//! response or classify the failure as retryable or final.

use super::rate_limit::{RateLimiter, RateLimiterConfig};
use crate::auth::{AuthConfig, Authenticator};
use crate::error::{Error, Result};
use crate::types::BackoffType;
use reqwest::{Client, Method, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::collections::HashMap;
use std::time::Duration;
use tracing::{debug, warn};

/// Configuration for the HTTP client
#[derive(Debug, Clone)]
pub struct HttpClientConfig {
    /// Base URL for relative paths
    pub base_url: Option<String>,
    /// Request timeout
    pub timeout: Duration,
    /// Maximum number of retries
    pub max_retries: u32,
    /// Initial delay for backoff
    pub initial_backoff: Duration,
    /// Maximum delay for backoff
    pub max_backoff: Duration,
    /// Type of backoff strategy
    pub backoff_type: BackoffType,
    /// Rate limiter configuration
    pub rate_limit: Option<RateLimiterConfig>,
    /// Default headers for all requests
    pub default_headers: HashMap<String, String>,
    /// User agent string
    pub user_agent: String,
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            timeout: Duration::from_secs(30),
            max_retries: 3,
            initial_backoff: Duration::from_millis(250),
            max_backoff: Duration::from_secs(30),
            backoff_type: BackoffType::Exponential,
            rate_limit: None,
            default_headers: HashMap::new(),
            user_agent: format!("firestore-source/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl HttpClientConfig {
    /// Create a new config builder
    pub fn builder() -> HttpClientConfigBuilder {
        HttpClientConfigBuilder::default()
    }
}

/// Builder for HTTP client config
#[derive(Debug, Default)]
pub struct HttpClientConfigBuilder {
    config: HttpClientConfig,
}

impl HttpClientConfigBuilder {
    /// Set the base URL
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.config.base_url = Some(url.into());
        self
    }

    /// Set the request timeout
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = timeout;
        self
    }

    /// Set max retries
    pub fn max_retries(mut self, retries: u32) -> Self {
        self.config.max_retries = retries;
        self
    }

    /// Set backoff configuration
    pub fn backoff(mut self, backoff_type: BackoffType, initial: Duration, max: Duration) -> Self {
        self.config.backoff_type = backoff_type;
        self.config.initial_backoff = initial;
        self.config.max_backoff = max;
        self
    }

    /// Set rate limiter
    pub fn rate_limit(mut self, config: Option<RateLimiterConfig>) -> Self {
        self.config.rate_limit = config;
        self
    }

    /// Add a default header
    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.config.default_headers.insert(key.into(), value.into());
        self
    }

    /// Build the config
    pub fn build(self) -> HttpClientConfig {
        self.config
    }
}

/// Configuration for a single request
#[derive(Debug, Clone, Default)]
pub struct RequestConfig {
    /// Request headers
    pub headers: HashMap<String, String>,
    /// Request body (JSON)
    pub body: Option<Value>,
    /// Override timeout for this request
    pub timeout: Option<Duration>,
    /// Override max retries for this request
    pub max_retries: Option<u32>,
}

impl RequestConfig {
    /// Set JSON body
    #[must_use]
    pub fn json(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }
}

/// Outcome of one attempt that did not produce a usable response
enum Attempt {
    /// Try again after the given delay
    Retry(Duration, Error),
    /// Give up with this error
    Fail(Error),
}

/// HTTP client with retry and rate limiting
pub struct HttpClient {
    client: Client,
    config: HttpClientConfig,
    authenticator: Option<Authenticator>,
    rate_limiter: Option<RateLimiter>,
}

impl HttpClient {
    /// Create a new HTTP client with custom configuration
    pub fn with_config(config: HttpClientConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .user_agent(&config.user_agent)
            .build()
            .map_err(Error::Http)?;

        let rate_limiter = config.rate_limit.as_ref().map(RateLimiter::new);

        Ok(Self {
            client,
            config,
            authenticator: None,
            rate_limiter,
        })
    }

    /// Create a client with authentication
    pub fn with_auth(config: HttpClientConfig, auth_config: AuthConfig) -> Result<Self> {
        let mut client = Self::with_config(config)?;
        client.authenticator = Some(Authenticator::with_client(
            auth_config,
            client.client.clone(),
        ));
        Ok(client)
    }

    /// Authenticate ahead of the first request
    pub async fn authenticate(&self) -> Result<()> {
        match self.authenticator {
            Some(ref auth) => auth.authenticate().await,
            None => Ok(()),
        }
    }

    /// Get the client configuration
    pub fn config(&self) -> &HttpClientConfig {
        &self.config
    }

    /// Make a GET request
    pub async fn get(&self, url: &str) -> Result<Response> {
        self.request(Method::GET, url, RequestConfig::default())
            .await
    }

    /// Make a GET request and parse the JSON response
    pub async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T> {
        self.request_json(Method::GET, url, RequestConfig::default())
            .await
    }

    /// Make a POST request with a serializable body and parse the JSON response
    pub async fn post_json<B: Serialize, T: DeserializeOwned>(
        &self,
        url: &str,
        body: &B,
    ) -> Result<T> {
        let body = serde_json::to_value(body)?;
        self.request_json(Method::POST, url, RequestConfig::default().json(body))
            .await
    }

    /// Make a request and parse the JSON response
    pub async fn request_json<T: DeserializeOwned>(
        &self,
        method: Method,
        url: &str,
        config: RequestConfig,
    ) -> Result<T> {
        let response = self.request(method, url, config).await?;
        let text = response.text().await.map_err(Error::Http)?;
        serde_json::from_str(&text).map_err(|e| Error::malformed(format!("invalid JSON body: {e}")))
    }

    /// Make a request, retrying transient failures
    pub async fn request(
        &self,
        method: Method,
        url: &str,
        config: RequestConfig,
    ) -> Result<Response> {
        let full_url = self.build_url(url);
        let max_retries = config.max_retries.unwrap_or(self.config.max_retries);
        let timeout = config.timeout.unwrap_or(self.config.timeout);

        let mut attempt = 0;
        loop {
            if let Some(ref limiter) = self.rate_limiter {
                limiter.wait().await;
            }

            let mut req = self
                .client
                .request(method.clone(), &full_url)
                .timeout(timeout);
            for (key, value) in self.config.default_headers.iter().chain(&config.headers) {
                req = req.header(key.as_str(), value.as_str());
            }
            if let Some(ref body) = config.body {
                req = req.json(body);
            }
            if let Some(ref auth) = self.authenticator {
                req = auth.apply(req).await?;
            }

            let outcome = match req.send().await {
                Ok(response) if response.status().is_success() => {
                    debug!("Request succeeded: {} {}", method, full_url);
                    return Ok(response);
                }
                Ok(response) => self.classify_status(response, attempt).await,
                Err(e) => self.classify_transport(e, attempt, timeout),
            };

            match outcome {
                Attempt::Retry(delay, error) if attempt < max_retries => {
                    warn!(
                        "{} {} failed ({}), attempt {}/{}, retrying in {:?}",
                        method,
                        full_url,
                        error,
                        attempt + 1,
                        max_retries + 1,
                        delay
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Attempt::Retry(_, error) | Attempt::Fail(error) => return Err(error),
            }
        }
    }

    async fn classify_status(&self, response: Response, attempt: u32) -> Attempt {
        let status = response.status();
        let retry_after = extract_retry_after(&response);
        let body = response.text().await.unwrap_or_default();

        if status == StatusCode::TOO_MANY_REQUESTS {
            let delay = retry_after.unwrap_or_else(|| self.calculate_backoff(attempt));
            return Attempt::Retry(
                delay,
                Error::RateLimited {
                    retry_after_seconds: delay.as_secs(),
                },
            );
        }

        let error = Error::http_status(status.as_u16(), body);
        if error.is_retryable() {
            Attempt::Retry(self.calculate_backoff(attempt), error)
        } else {
            Attempt::Fail(error)
        }
    }

    fn classify_transport(&self, e: reqwest::Error, attempt: u32, timeout: Duration) -> Attempt {
        if e.is_timeout() {
            return Attempt::Retry(
                self.calculate_backoff(attempt),
                Error::Timeout {
                    timeout_ms: timeout.as_millis() as u64,
                },
            );
        }
        if e.is_connect() {
            return Attempt::Retry(self.calculate_backoff(attempt), Error::Http(e));
        }
        Attempt::Fail(Error::Http(e))
    }

    /// Check if rate limiting is enabled
    pub fn has_rate_limiter(&self) -> bool {
        self.rate_limiter.is_some()
    }

    /// Build full URL from path
    fn build_url(&self, path: &str) -> String {
        if path.starts_with("http://") || path.starts_with("https://") {
            return path.to_string();
        }

        match &self.config.base_url {
            Some(base) => {
                let base = base.trim_end_matches('/');
                let path = path.trim_start_matches('/');
                format!("{base}/{path}")
            }
            None => path.to_string(),
        }
    }

    /// Calculate backoff delay for a given attempt
    pub fn calculate_backoff(&self, attempt: u32) -> Duration {
        let delay = match self.config.backoff_type {
            BackoffType::Constant => self.config.initial_backoff,
            BackoffType::Linear => self.config.initial_backoff * (attempt + 1),
            BackoffType::Exponential => {
                let factor = 2u32.saturating_pow(attempt);
                self.config.initial_backoff.saturating_mul(factor)
            }
        };

        std::cmp::min(delay, self.config.max_backoff)
    }
}

impl std::fmt::Debug for HttpClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpClient")
            .field("config", &self.config)
            .field("has_authenticator", &self.authenticator.is_some())
            .field("has_rate_limiter", &self.rate_limiter.is_some())
            .finish_non_exhaustive()
    }
}

/// Delay requested by a `Retry-After` header, in seconds
fn extract_retry_after(response: &Response) -> Option<Duration> {
    response
        .headers()
        .get("retry-after")
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.trim().parse().ok())
        .map(Duration::from_secs)
}
