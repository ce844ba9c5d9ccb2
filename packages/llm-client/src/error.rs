//! Error types for the LLM client.

use thiserror::Error;

/// Result type for LLM client operations.
pub type Result<T> = std::result::Result<T, LlmClientError>;

/// LLM client errors.
#[derive(Debug, Clone, Error)]
pub enum LlmClientError {
    /// Configuration error (missing API key, invalid settings)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Network error (connection failed, timeout)
    #[error("Network error: {0}")]
    Network(String),

    /// Provider rejected the request with HTTP 429
    #[error("Rate limited{}", retry_hint(.retry_after))]
    RateLimited {
        /// Seconds from the `Retry-After` header, when present
        retry_after: Option<u64>,
    },

    /// API error (non-2xx response, invalid request, invalid schema)
    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// Parse error (invalid JSON, unexpected response format)
    #[error("Parse error: {0}")]
    Parse(String),
}

fn retry_hint(retry_after: &Option<u64>) -> String {
    retry_after
        .map(|secs| format!(" (retry after {}s)", secs))
        .unwrap_or_default()
}
