//! Error types for the DDNS updater
//!
//! Every failure the updater can observe is one of these variants. Only
//! [`Error::Config`] is fatal, and only before the poll loop starts; all other
//! variants are logged by the loop and the affected family is skipped for the
//! current tick.

use thiserror::Error;

/// Result type alias for DDNS operations
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for the DDNS updater
#[derive(Error, Debug)]
pub enum Error {
    /// IP check errors (echo endpoint unreachable, unreadable body)
    #[error("IP check error: {0}")]
    IpCheck(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Transport failures and non-2xx responses
    #[error("HTTP error: {0}")]
    Http(String),

    /// 401/403 from the provider
    #[error("Authentication failed: {0}")]
    Authentication(String),

    /// 429 from the provider
    #[error("Rate limited: {0}")]
    RateLimited(String),

    /// Record not found
    #[error("Record not found: {0}")]
    NotFound(String),

    /// Provider-specific error
    #[error("Provider error ({provider}): {message}")]
    Provider {
        /// Provider name
        provider: String,
        /// Error message
        message: String,
    },

    /// Generic error with context
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create an IP check error
    pub fn ip_check(msg: impl Into<String>) -> Self {
        Self::IpCheck(msg.into())
    }

    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create an HTTP error
    pub fn http(msg: impl Into<String>) -> Self {
        Self::Http(msg.into())
    }

    /// Create a "not found" error
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    /// Create a provider-specific error
    pub fn provider(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Provider {
            provider: provider.into(),
            message: message.into(),
        }
    }

    /// Map a non-2xx HTTP response to an error
    ///
    /// `source` names who answered (e.g. "cloudflare", an echo URL). The body
    /// is trimmed and included verbatim so the log line shows what the remote
    /// said.
    pub fn from_status(source: &str, status: u16, body: &str) -> Self {
        let body = body.trim();
        match status {
            401 | 403 => Self::Authentication(format!(
                "{} rejected the credential (status {}): {}",
                source, status, body
            )),
            429 => Self::RateLimited(format!("{} (status {}): {}", source, status, body)),
            _ => Self::Http(format!(
                "{}: unexpected status {}: {}",
                source, status, body
            )),
        }
    }

    /// Whether this error aborts startup
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Config(_))
    }
}

/// Helper for converting anyhow::Error to our Error type
impl From<anyhow::Error> for Error {
    fn from(err: anyhow::Error) -> Self {
        Self::Other(err.to_string())
    }
}
