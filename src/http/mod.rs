//! HTTP transport module
//!
//! The network side of view execution: an HTTP client with retry, backoff
//! and rate limiting. Pagination never retries by itself; transient failures
//! are absorbed here or surfaced as errors.

mod client;
mod rate_limit;

pub use client::{HttpClient, HttpClientConfig, HttpClientConfigBuilder, RequestConfig};
pub use rate_limit::{RateLimiter, RateLimiterConfig};
