//! Typed errors for the extractor library.
//!
//! Uses `thiserror` for library errors (not `anyhow`) to provide
//! strongly-typed, composable error handling.

use thiserror::Error;

/// Errors that abort an extraction or pagination batch.
#[derive(Debug, Error)]
pub enum ExtractionError {
    /// Field list rejected by the schema builder
    #[error("invalid schema: {reason}")]
    InvalidSchema { reason: String },

    /// No API credential configured for the requested model
    #[error("missing credential {variable} for model {model}")]
    CredentialMissing { model: String, variable: String },

    /// Model id not present in the catalog
    #[error("unknown model: {model}")]
    UnknownModel { model: String },

    /// Catalog points at a backend nobody registered
    #[error("no backend registered for: {backend}")]
    UnknownBackend { backend: String },

    /// Provider failure (network, rate limit, rejected request)
    #[error("backend error: {0}")]
    Backend(#[from] llm_client::LlmClientError),

    /// Storage operation failed
    #[error("storage error: {0}")]
    Storage(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// JSON parsing error
    #[error("JSON parse error: {0}")]
    JsonParse(#[from] serde_json::Error),

    /// HTTP client could not be constructed
    #[error("failed to build HTTP client: {0}")]
    HttpClient(#[source] reqwest::Error),

    /// Run request rejected before any work started
    #[error("invalid run: {reason}")]
    InvalidRun { reason: String },

    /// A run is already in flight on this controller
    #[error("a run is already in progress")]
    RunInProgress,
}

impl ExtractionError {
    /// Wrap any storage-layer error.
    pub fn storage(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Storage(Box::new(err))
    }

    /// Message suitable for showing to the person who launched the run.
    pub fn user_message(&self) -> String {
        match self {
            Self::CredentialMissing { variable, .. } => {
                format!("Set {} before running with this model.", variable)
            }
            Self::Backend(llm_client::LlmClientError::RateLimited { .. }) => {
                "The model provider is rate limiting requests. Try again shortly.".to_string()
            }
            other => format!("An error occurred during scraping: {}", other),
        }
    }
}

/// Model output that does not conform to the requested schema.
///
/// Never fatal: orchestrators log it and keep the normalized data.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaValidationError {
    /// Top-level value is not a JSON object
    #[error("expected a JSON object, got {found}")]
    NotAnObject { found: &'static str },

    /// Required field absent
    #[error("missing field: {field}")]
    MissingField { field: String },

    /// Field not declared in the schema
    #[error("unexpected field: {field}")]
    UnexpectedField { field: String },

    /// Field present with the wrong JSON type
    #[error("field {field} should be {expected}, got {found}")]
    WrongType {
        field: String,
        expected: &'static str,
        found: &'static str,
    },

    /// Error inside one item of a list-valued field
    #[error("{field}[{index}]: {source}")]
    InItem {
        field: String,
        index: usize,
        #[source]
        source: Box<SchemaValidationError>,
    },
}

/// Result type alias for extractor operations.
pub type Result<T> = std::result::Result<T, ExtractionError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_credential_message_names_variable() {
        let err = ExtractionError::CredentialMissing {
            model: "gpt-4o-mini".into(),
            variable: "OPENAI_API_KEY".into(),
        };
        assert!(err.user_message().contains("OPENAI_API_KEY"));
        assert!(err.to_string().contains("gpt-4o-mini"));
    }

    #[test]
    fn test_nested_validation_display() {
        let err = SchemaValidationError::InItem {
            field: "listings".into(),
            index: 2,
            source: Box::new(SchemaValidationError::MissingField {
                field: "price".into(),
            }),
        };
        assert_eq!(err.to_string(), "listings[2]: missing field: price");
    }
}
