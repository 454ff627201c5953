//! Error types for couchview
//!
//! Every public API returns `Result<T, Error>`. Errors fall into four
//! families (see [`ErrorKind`]) so callers of the pagination engine can tell a
//! bad query apart from a failed request or a programming mistake.

use thiserror::Error;

/// The main error type for couchview
#[derive(Error, Debug)]
pub enum Error {
    // ============================================================================
    // Query Compilation Errors
    // ============================================================================
    #[error("Failed to compile view query, '{field}' could not be encoded as JSON: {message}")]
    QueryCompilation { field: String, message: String },

    // ============================================================================
    // Execution Errors
    // ============================================================================
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Server returned {status} ({error}): {reason}")]
    Couch {
        status: u16,
        error: String,
        reason: String,
    },

    #[error("HTTP {status}: {body}")]
    HttpStatus { status: u16, body: String },

    #[error("Rate limited, retry after {retry_after_seconds}s")]
    RateLimited { retry_after_seconds: u64 },

    #[error("Request timeout after {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },

    #[error("Max retries ({max_retries}) exceeded")]
    MaxRetriesExceeded { max_retries: u32 },

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("Failed to parse JSON: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("Failed to decode view response: {message}")]
    Decode { message: String },

    // ============================================================================
    // Usage Errors
    // ============================================================================
    #[error("Page size must be at least 1 and below i64::MAX, got {page_size}")]
    InvalidPageSize { page_size: i64 },

    #[error("No more pages: the view has been paged to exhaustion")]
    PagesExhausted,

    #[error("Field '{field}' is not present in this result (reduced or ad-hoc view?)")]
    MissingField { field: String },

    #[error("Invalid view query: {message}")]
    InvalidQuery { message: String },

    // ============================================================================
    // Configuration Errors
    // ============================================================================
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Failed to parse YAML: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    #[error("Undefined variable in template: {variable}")]
    UndefinedVariable { variable: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // ============================================================================
    // Generic Errors
    // ============================================================================
    #[error("{0}")]
    Other(String),

    #[error(transparent)]
    Anyhow(#[from] anyhow::Error),
}

/// Broad classification of an [`Error`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The query could not be turned into a query string
    Compilation,
    /// The executor failed: transport, server status, or malformed response
    Execution,
    /// The API was used incorrectly
    Usage,
    /// Loading or interpreting configuration failed
    Config,
}

impl Error {
    /// Create a query compilation error
    pub fn compilation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::QueryCompilation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create a server error from the `error`/`reason` pair of a response body
    pub fn couch(status: u16, error: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Couch {
            status,
            error: error.into(),
            reason: reason.into(),
        }
    }

    /// Create an HTTP status error
    pub fn http_status(status: u16, body: impl Into<String>) -> Self {
        Self::HttpStatus {
            status,
            body: body.into(),
        }
    }

    /// Create a decode error
    pub fn decode(message: impl Into<String>) -> Self {
        Self::Decode {
            message: message.into(),
        }
    }

    /// Create a missing field error
    pub fn missing_field(field: impl Into<String>) -> Self {
        Self::MissingField {
            field: field.into(),
        }
    }

    /// Create an invalid query error
    pub fn invalid_query(message: impl Into<String>) -> Self {
        Self::InvalidQuery {
            message: message.into(),
        }
    }

    /// Create a config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create an undefined variable error
    pub fn undefined_var(variable: impl Into<String>) -> Self {
        Self::UndefinedVariable {
            variable: variable.into(),
        }
    }

    /// Build an error from a non-success response.
    ///
    /// The server reports failures as `{"error": "...", "reason": "..."}`;
    /// anything else is kept verbatim in an [`Error::HttpStatus`].
    pub fn from_response(status: u16, body: &str) -> Self {
        let parsed: Option<serde_json::Value> = serde_json::from_str(body).ok();
        match parsed
            .as_ref()
            .and_then(|v| v.get("error"))
            .and_then(serde_json::Value::as_str)
        {
            Some(error) => {
                let reason = parsed
                    .as_ref()
                    .and_then(|v| v.get("reason"))
                    .and_then(serde_json::Value::as_str)
                    .unwrap_or_default();
                Self::couch(status, error, reason)
            }
            None => Self::http_status(status, body),
        }
    }

    /// Classify this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::QueryCompilation { .. } => ErrorKind::Compilation,
            Error::InvalidPageSize { .. }
            | Error::PagesExhausted
            | Error::MissingField { .. }
            | Error::InvalidQuery { .. } => ErrorKind::Usage,
            Error::Config { .. }
            | Error::YamlParse(_)
            | Error::UndefinedVariable { .. }
            | Error::Io(_) => ErrorKind::Config,
            _ => ErrorKind::Execution,
        }
    }

    /// Check if this error is a programmer error
    pub fn is_usage(&self) -> bool {
        self.kind() == ErrorKind::Usage
    }

    /// Check if this error is retryable at the transport level
    pub fn is_retryable(&self) -> bool {
        match self {
            Error::Http(_) | Error::RateLimited { .. } | Error::Timeout { .. } => true,
            Error::HttpStatus { status, .. } | Error::Couch { status, .. } => {
                is_retryable_status(*status)
            }
            _ => false,
        }
    }
}

/// Check if an HTTP status code is retryable. Shared with the HTTP client's
/// retry loop.
pub(crate) fn is_retryable_status(status: u16) -> bool {
    matches!(
        status,
        429 | 500 | 502 | 503 | 504 | 520 | 521 | 522 | 523 | 524
    )
}

/// Result type alias for couchview
pub type Result<T> = std::result::Result<T, Error>;

/// Extension trait for adding context to errors
pub trait ResultExt<T> {
    /// Add context to an error
    fn context(self, message: impl Into<String>) -> Result<T>;

    /// Add context with a closure (lazy evaluation)
    fn with_context<F: FnOnce() -> String>(self, f: F) -> Result<T>;
}

impl<T, E: Into<Error>> ResultExt<T> for std::result::Result<T, E> {
    fn context(self, message: impl Into<String>) -> Result<T> {
        self.map_err(|e| {
            let inner = e.into();
            Error::Other(format!("{}: {}", message.into(), inner))
        })
    }

    fn with_context<F: FnOnce() -> String>(self, f: F) -> Result<T> {
        self.map_err(|e| {
            let inner = e.into();
            Error::Other(format!("{}: {}", f(), inner))
        })
    }
}
