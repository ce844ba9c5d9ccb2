//! Testing utilities including mock implementations.
//!
//! These are useful for testing applications that use the extractor library
//! without making real LLM or network calls.

use async_trait::async_trait;
use llm_client::{ChatRequest, ChatResponse, LlmClientError, Usage};
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, RwLock};

use crate::error::Result;
use crate::gateway::ModelGateway;
use crate::security::SecretString;
use crate::traits::backend::CompletionBackend;
use crate::traits::fetcher::PageFetcher;
use crate::types::model::ModelCatalog;

/// A mock completion backend.
///
/// Canned responses are returned in order; the last one repeats once the
/// queue is down to it. Every request is recorded for assertions.
pub struct MockBackend {
    id: String,
    json_schema: bool,
    responses: RwLock<VecDeque<String>>,
    usage: Option<Usage>,
    error: Option<LlmClientError>,
    calls: Arc<RwLock<Vec<ChatRequest>>>,
}

impl MockBackend {
    /// Mock registered under `id`. `groq` defaults to `json_object` mode.
    pub fn new(id: impl Into<String>) -> Self {
        let id = id.into();
        Self {
            json_schema: id != "groq",
            id,
            responses: RwLock::new(VecDeque::new()),
            usage: None,
            error: None,
            calls: Arc::new(RwLock::new(Vec::new())),
        }
    }

    /// Queue a response body.
    pub fn with_response(self, content: impl Into<String>) -> Self {
        self.responses.write().unwrap().push_back(content.into());
        self
    }

    /// Report provider usage on every response.
    pub fn with_usage(mut self, prompt_tokens: u32, completion_tokens: u32) -> Self {
        self.usage = Some(Usage {
            prompt_tokens,
            completion_tokens,
            total_tokens: prompt_tokens + completion_tokens,
        });
        self
    }

    /// Fail every call with `error`.
    pub fn with_error(mut self, error: LlmClientError) -> Self {
        self.error = Some(error);
        self
    }

    /// Recorded requests.
    pub fn calls(&self) -> Vec<ChatRequest> {
        self.calls.read().unwrap().clone()
    }

    /// Shared handle to the request log, usable after the mock is moved.
    pub fn call_log(&self) -> Arc<RwLock<Vec<ChatRequest>>> {
        self.calls.clone()
    }
}

#[async_trait]
impl CompletionBackend for MockBackend {
    fn id(&self) -> &str {
        &self.id
    }

    fn supports_json_schema(&self) -> bool {
        self.json_schema
    }

    async fn complete(&self, request: &ChatRequest, _credential: &SecretString) -> Result<ChatResponse> {
        self.calls.write().unwrap().push(request.clone());

        if let Some(error) = &self.error {
            return Err(error.clone().into());
        }

        let content = {
            let mut responses = self.responses.write().unwrap();
            if responses.len() > 1 {
                responses.pop_front()
            } else {
                responses.front().cloned()
            }
        }
        .ok_or_else(|| LlmClientError::Parse("no canned response".into()))?;

        Ok(ChatResponse {
            content,
            finish_reason: Some("stop".to_string()),
            usage: self.usage,
        })
    }
}

/// A gateway over the default catalog with `backend` as its only backend.
pub fn test_gateway(backend: MockBackend) -> Arc<ModelGateway> {
    Arc::new(ModelGateway::new(ModelCatalog::default()).with_backend(Arc::new(backend)))
}

/// A mock page fetcher with canned pages by URL.
///
/// Unknown URLs yield an empty string, like a failed fetch.
#[derive(Default)]
pub struct MockFetcher {
    pages: RwLock<HashMap<String, String>>,
    fetched: Arc<RwLock<Vec<String>>>,
}

impl MockFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a page.
    pub fn with_page(self, url: impl Into<String>, text: impl Into<String>) -> Self {
        self.pages.write().unwrap().insert(url.into(), text.into());
        self
    }

    /// URLs fetched so far, in order.
    pub fn fetched(&self) -> Vec<String> {
        self.fetched.read().unwrap().clone()
    }

    /// Shared handle to the fetch log.
    pub fn fetch_log(&self) -> Arc<RwLock<Vec<String>>> {
        self.fetched.clone()
    }
}

#[async_trait]
impl PageFetcher for MockFetcher {
    async fn fetch_text(&self, url: &str) -> String {
        self.fetched.write().unwrap().push(url.to_string());
        self.pages
            .read()
            .unwrap()
            .get(url)
            .cloned()
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ExtractionError;

    #[tokio::test]
    async fn test_mock_backend_queue_repeats_last() {
        let backend = MockBackend::new("openai")
            .with_response("one")
            .with_response("two");
        let request = ChatRequest::new("gpt-4o-mini");
        let key = SecretString::new("sk");

        let mut seen = Vec::new();
        for _ in 0..3 {
            seen.push(backend.complete(&request, &key).await.unwrap().content);
        }

        assert_eq!(seen, vec!["one", "two", "two"]);
        assert_eq!(backend.calls().len(), 3);
    }

    #[tokio::test]
    async fn test_mock_backend_without_responses_errors() {
        let backend = MockBackend::new("openai");
        let err = backend
            .complete(&ChatRequest::new("x"), &SecretString::new("sk"))
            .await
            .unwrap_err();
        assert!(matches!(err, ExtractionError::Backend(LlmClientError::Parse(_))));
    }

    #[tokio::test]
    async fn test_mock_fetcher_records_calls() {
        let fetcher = MockFetcher::new().with_page("https://a.com", "text");
        assert_eq!(fetcher.fetch_text("https://a.com").await, "text");
        assert_eq!(fetcher.fetch_text("https://b.com").await, "");
        assert_eq!(fetcher.fetched(), vec!["https://a.com", "https://b.com"]);
    }
}
