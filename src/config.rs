//! Client configuration
//!
//! A YAML file names the server, the database, credentials and transport
//! settings. String values may contain `{{ env.NAME }}` placeholders, which
//! are interpolated after parsing and before the file is typed.
//!
//! ```yaml
//! url: http://localhost:5984
//! database: music
//! auth:
//!   type: basic
//!   username: admin
//!   password: "{{ env.COUCHDB_PASSWORD }}"
//! http:
//!   timeout_secs: 30
//!   max_retries: 3
//!   backoff: exponential
//!   rate_limit: { requests_per_second: 10, burst_size: 10 }
//! page_size: 500
//! ```

use crate::auth::AuthConfig;
use crate::error::{Error, Result};
use crate::executor::HttpViewExecutor;
use crate::http::{HttpClient, HttpClientConfig, RateLimiterConfig};
use crate::pagination::{checked_page_size, DEFAULT_PAGE_SIZE};
use crate::template::{render_value, TemplateContext};
use crate::types::BackoffType;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;
use tracing::debug;

// ============================================================================
// Top-Level Config
// ============================================================================

/// Connection settings for one database
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Server URL, e.g. `http://localhost:5984`
    pub url: String,

    /// Database name
    pub database: String,

    #[serde(default)]
    pub auth: AuthConfig,

    #[serde(default)]
    pub http: HttpConfig,

    /// Rows per page
    #[serde(default = "default_page_size")]
    pub page_size: i64,
}

fn default_page_size() -> i64 {
    DEFAULT_PAGE_SIZE as i64
}

impl ClientConfig {
    /// Minimal config with default transport settings
    pub fn new(url: impl Into<String>, database: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            database: database.into(),
            auth: AuthConfig::None,
            http: HttpConfig::default(),
            page_size: default_page_size(),
        }
    }

    /// Validated page size
    pub fn page_size(&self) -> Result<usize> {
        checked_page_size(self.page_size)
    }

    /// HTTP client built from the `http` and `auth` sections
    pub fn http_client(&self) -> Result<HttpClient> {
        HttpClient::with_auth(self.http.client_config(), self.auth.clone())
    }

    /// Executor for the configured database
    pub fn executor(&self) -> Result<HttpViewExecutor> {
        HttpViewExecutor::new(self.http_client()?, &self.url, self.database.clone())
    }

    fn validate(&self) -> Result<()> {
        if self.url.trim().is_empty() {
            return Err(Error::config("url cannot be empty"));
        }
        if self.database.trim().is_empty() {
            return Err(Error::config("database cannot be empty"));
        }
        self.page_size()?;
        Ok(())
    }
}

// ============================================================================
// HTTP Config
// ============================================================================

/// Transport settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HttpConfig {
    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    /// Maximum number of retries
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    #[serde(default)]
    pub backoff: BackoffType,

    /// Initial backoff delay in milliseconds
    #[serde(default = "default_initial_backoff_ms")]
    pub initial_backoff_ms: u64,

    /// Backoff cap in milliseconds
    #[serde(default = "default_max_backoff_ms")]
    pub max_backoff_ms: u64,

    /// Request rate limit; `null` disables it
    #[serde(default = "default_rate_limit")]
    pub rate_limit: Option<RateLimiterConfig>,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout(),
            max_retries: default_max_retries(),
            backoff: BackoffType::default(),
            initial_backoff_ms: default_initial_backoff_ms(),
            max_backoff_ms: default_max_backoff_ms(),
            rate_limit: default_rate_limit(),
        }
    }
}

fn default_timeout() -> u64 {
    30
}

fn default_max_retries() -> u32 {
    3
}

fn default_initial_backoff_ms() -> u64 {
    100
}

fn default_max_backoff_ms() -> u64 {
    60_000
}

fn default_rate_limit() -> Option<RateLimiterConfig> {
    Some(RateLimiterConfig::default())
}

impl HttpConfig {
    /// Convert to the HTTP client's own config
    pub fn client_config(&self) -> HttpClientConfig {
        let builder = HttpClientConfig::builder()
            .timeout(Duration::from_secs(self.timeout_secs))
            .max_retries(self.max_retries)
            .backoff(
                self.backoff,
                Duration::from_millis(self.initial_backoff_ms),
                Duration::from_millis(self.max_backoff_ms),
            );

        match &self.rate_limit {
            Some(limit) => builder.rate_limit(limit.clone()),
            None => builder.no_rate_limit(),
        }
        .build()
    }
}

// ============================================================================
// Loading
// ============================================================================

/// Load a config file, interpolating from the process environment
pub fn load_config(path: impl AsRef<Path>) -> Result<ClientConfig> {
    let path = path.as_ref();
    let content = fs::read_to_string(path).map_err(|e| {
        Error::config(format!(
            "Failed to read config file '{}': {e}",
            path.display()
        ))
    })?;
    debug!(path = %path.display(), "Loading client config");
    load_config_from_str(&content)
}

/// Load a config from YAML text, interpolating from the process environment
pub fn load_config_from_str(yaml: &str) -> Result<ClientConfig> {
    load_config_with(yaml, &TemplateContext::new())
}

/// Load a config from YAML text with an explicit template context
pub fn load_config_with(yaml: &str, ctx: &TemplateContext) -> Result<ClientConfig> {
    let raw: serde_json::Value = serde_yaml::from_str(yaml)?;
    let rendered = render_value(&raw, ctx)?;
    let config: ClientConfig = serde_json::from_value(rendered)
        .map_err(|e| Error::config(format!("Invalid client config: {e}")))?;

    config.validate()?;
    Ok(config)
}
