//! OpenAI-compatible backends for OpenAI, Gemini and Groq.
//!
//! All three speak the `/chat/completions` wire format, so each one is a thin
//! wrapper that points an [`LlmClient`] at the right base URL.

use async_trait::async_trait;
use llm_client::{ChatRequest, ChatResponse, LlmClient, OPENAI_BASE_URL};
use reqwest::Client;
use tracing::debug;

use crate::error::Result;
use crate::security::SecretString;
use crate::traits::backend::CompletionBackend;

/// Gemini's OpenAI-compatible endpoint.
pub const GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta/openai";

/// Groq's OpenAI-compatible endpoint.
pub const GROQ_BASE_URL: &str = "https://api.groq.com/openai/v1";

async fn send(
    http: &Client,
    base_url: &str,
    backend: &str,
    request: &ChatRequest,
    credential: &SecretString,
) -> Result<ChatResponse> {
    debug!(backend, model = %request.model, "Sending completion request");
    let client = LlmClient::with_http_client(http.clone(), credential.expose()).with_base_url(base_url);
    Ok(client.chat_completion(request).await?)
}

/// OpenAI (`api.openai.com`), strict `json_schema` output.
#[derive(Debug, Clone)]
pub struct OpenAiBackend {
    http: Client,
    base_url: String,
}

impl OpenAiBackend {
    pub fn new(http: Client) -> Self {
        Self {
            http,
            base_url: OPENAI_BASE_URL.to_string(),
        }
    }

    /// Point at a different endpoint (proxies, test servers).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }
}

#[async_trait]
impl CompletionBackend for OpenAiBackend {
    fn id(&self) -> &str {
        "openai"
    }

    fn supports_json_schema(&self) -> bool {
        true
    }

    async fn complete(&self, request: &ChatRequest, credential: &SecretString) -> Result<ChatResponse> {
        send(&self.http, &self.base_url, self.id(), request, credential).await
    }
}

/// Google Gemini through its OpenAI-compatible surface.
#[derive(Debug, Clone)]
pub struct GeminiBackend {
    http: Client,
    base_url: String,
}

impl GeminiBackend {
    pub fn new(http: Client) -> Self {
        Self {
            http,
            base_url: GEMINI_BASE_URL.to_string(),
        }
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }
}

#[async_trait]
impl CompletionBackend for GeminiBackend {
    fn id(&self) -> &str {
        "gemini"
    }

    fn supports_json_schema(&self) -> bool {
        true
    }

    async fn complete(&self, request: &ChatRequest, credential: &SecretString) -> Result<ChatResponse> {
        send(&self.http, &self.base_url, self.id(), request, credential).await
    }
}

/// Groq. Only `json_object` mode; output is validated by the caller.
#[derive(Debug, Clone)]
pub struct GroqBackend {
    http: Client,
    base_url: String,
}

impl GroqBackend {
    pub fn new(http: Client) -> Self {
        Self {
            http,
            base_url: GROQ_BASE_URL.to_string(),
        }
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }
}

#[async_trait]
impl CompletionBackend for GroqBackend {
    fn id(&self) -> &str {
        "groq"
    }

    fn supports_json_schema(&self) -> bool {
        false
    }

    async fn complete(&self, request: &ChatRequest, credential: &SecretString) -> Result<ChatResponse> {
        send(&self.http, &self.base_url, self.id(), request, credential).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use llm_client::Message;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn test_backend_capabilities() {
        let http = Client::new();
        assert!(OpenAiBackend::new(http.clone()).supports_json_schema());
        assert!(GeminiBackend::new(http.clone()).supports_json_schema());
        assert!(!GroqBackend::new(http).supports_json_schema());
    }

    #[tokio::test]
    async fn test_credential_sent_as_bearer() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .and(header("authorization", "Bearer gsk-test"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "choices": [{"message": {"content": "{}"}, "finish_reason": "stop"}]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let backend = GroqBackend::new(Client::new()).with_base_url(server.uri());
        let request = ChatRequest::new("deepseek-r1-distill-llama-70b").message(Message::user("hi"));
        let response = backend
            .complete(&request, &SecretString::new("gsk-test"))
            .await
            .unwrap();

        assert_eq!(response.content, "{}");
    }
}
