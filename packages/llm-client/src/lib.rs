//! Pure OpenAI-compatible chat completions client
//!
//! A clean, minimal client with no domain-specific logic. Works against
//! OpenAI itself and any provider exposing the same `/chat/completions`
//! surface (Gemini's and Groq's OpenAI-compatible endpoints, proxies).
//!
//! # Example
//!
//! ```rust,ignore
//! use llm_client::{LlmClient, ChatRequest, Message, ResponseFormat};
//!
//! let client = LlmClient::from_env()?;
//!
//! let response = client.chat_completion(
//!     &ChatRequest::new("gpt-4o-mini")
//!         .message(Message::system("Respond only with JSON."))
//!         .message(Message::user("Name three colors."))
//!         .response_format(ResponseFormat::JsonObject),
//! ).await?;
//! ```

pub mod error;
pub mod schema;
pub mod types;

pub use error::{LlmClientError, Result};
pub use schema::into_strict;
pub use types::*;

use reqwest::{header, Client, StatusCode};
use std::time::Duration;
use tracing::{debug, warn};

/// Default OpenAI endpoint.
pub const OPENAI_BASE_URL: &str = "https://api.openai.com/v1";

/// OpenAI-compatible API client.
#[derive(Clone)]
pub struct LlmClient {
    http_client: Client,
    api_key: String,
    base_url: String,
}

impl std::fmt::Debug for LlmClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LlmClient")
            .field("api_key", &"[REDACTED]")
            .field("base_url", &self.base_url)
            .finish()
    }
}

impl LlmClient {
    /// Create a new client with the given API key.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self::with_http_client(Client::new(), api_key)
    }

    /// Create a client sharing an existing `reqwest::Client` (connection pool, timeouts).
    pub fn with_http_client(http_client: Client, api_key: impl Into<String>) -> Self {
        Self {
            http_client,
            api_key: api_key.into(),
            base_url: OPENAI_BASE_URL.to_string(),
        }
    }

    /// Create from environment variable `OPENAI_API_KEY`.
    pub fn from_env() -> Result<Self> {
        let api_key = std::env::var("OPENAI_API_KEY")
            .map_err(|_| LlmClientError::Config("OPENAI_API_KEY not set".into()))?;
        Ok(Self::new(api_key))
    }

    /// Build a `reqwest::Client` with a whole-request timeout.
    pub fn http_client_with_timeout(timeout: Duration) -> Result<Client> {
        Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| LlmClientError::Config(format!("Failed to build HTTP client: {}", e)))
    }

    /// Set a custom base URL (for Gemini, Groq, Azure, proxies, etc.).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    /// Get the base URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Chat completion.
    ///
    /// Sends the request once; rate limits and provider errors are returned
    /// as typed errors and never retried here.
    pub async fn chat_completion(&self, request: &ChatRequest) -> Result<ChatResponse> {
        let start = std::time::Instant::now();

        let response = self
            .http_client
            .post(format!("{}/chat/completions", self.base_url))
            .header(header::AUTHORIZATION, format!("Bearer {}", self.api_key))
            .header(header::CONTENT_TYPE, "application/json")
            .json(request)
            .send()
            .await
            .map_err(|e| {
                warn!(error = %e, model = %request.model, "LLM request failed");
                LlmClientError::Network(e.to_string())
            })?;

        let status = response.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            let retry_after = response
                .headers()
                .get(header::RETRY_AFTER)
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.trim().parse::<u64>().ok());
            warn!(model = %request.model, ?retry_after, "LLM provider rate limited request");
            return Err(LlmClientError::RateLimited { retry_after });
        }
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            warn!(status = %status, error = %error_text, "LLM API error");
            return Err(LlmClientError::Api {
                status: status.as_u16(),
                message: error_text,
            });
        }

        let chat_response: types::ChatResponseRaw = response
            .json()
            .await
            .map_err(|e| LlmClientError::Parse(e.to_string()))?;

        let choice = chat_response
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| LlmClientError::Parse("No choices in response".into()))?;

        debug!(
            model = %request.model,
            duration_ms = start.elapsed().as_millis(),
            finish_reason = ?choice.finish_reason,
            "LLM chat completion"
        );

        Ok(ChatResponse {
            content: choice.message.content.unwrap_or_default(),
            finish_reason: choice.finish_reason,
            usage: chat_response.usage,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_builder() {
        let client = LlmClient::new("sk-test").with_base_url("https://custom.api.com/v1/");

        assert_eq!(client.api_key, "sk-test");
        assert_eq!(client.base_url(), "https://custom.api.com/v1");
    }

    #[test]
    fn test_debug_redacts_key() {
        let client = LlmClient::new("sk-super-secret");
        let debug = format!("{:?}", client);
        assert!(!debug.contains("sk-super-secret"));
        assert!(debug.contains("[REDACTED]"));
    }
}
