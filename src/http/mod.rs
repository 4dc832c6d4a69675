//! HTTP client module
//!
//! Request plumbing shared by the token exchange and the document API:
//! explicit timeouts, retries with backoff, and optional rate limiting.
//!
//! # Features
//!
//! - **Automatic Retries**: 429, 5xx, timeouts and connect errors
//! - **Rate Limiting**: Token bucket rate limiter using governor
//! - **Backoff Strategies**: Constant, linear, and exponential backoff

mod client;
mod rate_limit;

pub use client::{HttpClient, HttpClientConfig, HttpClientConfigBuilder, RequestConfig};
pub use rate_limit::{RateLimiter, RateLimiterConfig};
