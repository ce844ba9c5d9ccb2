//! Pagination orchestrator: infer the page URL sequence of each document.

use std::sync::Arc;
use tracing::{info, warn};

use crate::error::Result;
use crate::gateway::{GatewayRequest, ModelGateway, OutputCeiling};
use crate::pipeline::normalize::normalize;
use crate::pipeline::prompts::format_pagination_prompt;
use crate::pipeline::BatchCredential;
use crate::security::CredentialSource;
use crate::traits::store::{ContentCache, ResultKind};
use crate::types::document::{BatchOutcome, PaginatedDocument, SourceDocument};
use crate::types::schema::{pagination_schema, validate_pagination};

/// Runs pagination discovery over a batch of documents.
pub struct Paginator {
    gateway: Arc<ModelGateway>,
    cache: Arc<dyn ContentCache>,
    credentials: Arc<dyn CredentialSource>,
    ceiling: OutputCeiling,
}

impl Paginator {
    pub fn new(
        gateway: Arc<ModelGateway>,
        cache: Arc<dyn ContentCache>,
        credentials: Arc<dyn CredentialSource>,
    ) -> Self {
        Self {
            gateway,
            cache,
            credentials,
            ceiling: OutputCeiling::Unbounded,
        }
    }

    pub fn with_output_ceiling(mut self, ceiling: OutputCeiling) -> Self {
        self.ceiling = ceiling;
        self
    }

    /// Ask the model for each document's pagination URLs.
    ///
    /// `guidance` is the caller's free-text hint; blank means default logic.
    pub async fn discover_pagination(
        &self,
        documents: &[SourceDocument],
        guidance: &str,
        model_id: &str,
    ) -> Result<BatchOutcome<PaginatedDocument>> {
        let mut credential = BatchCredential::new(&self.gateway, self.credentials.as_ref(), model_id);
        let target = pagination_schema();

        let mut outcome = BatchOutcome::default();

        for document in documents {
            if document.is_blank() {
                warn!(key = %document.key, "No raw text for document, skipping pagination");
                continue;
            }

            let prompt = format_pagination_prompt(guidance, &document.url);
            let response = self
                .gateway
                .call(
                    GatewayRequest {
                        content: &document.raw_text,
                        schema: &target,
                        model_id,
                        system_prompt: &prompt,
                        user_guidance: "",
                        max_output_tokens: self.ceiling,
                    },
                    credential.get()?,
                )
                .await?;
            outcome.record(&response);

            let pagination_data = normalize(response.payload);
            if let Err(error) = validate_pagination(&pagination_data) {
                warn!(key = %document.key, error = %error, "Pagination result does not match schema");
            }

            self.cache
                .write_result(&document.key, ResultKind::Pagination, &pagination_data)
                .await?;

            outcome.results.push(PaginatedDocument {
                key: document.key.clone(),
                pagination_data,
            });
        }

        info!(
            model = %model_id,
            documents = outcome.results.len(),
            input_tokens = outcome.input_tokens,
            output_tokens = outcome.output_tokens,
            cost = %outcome.cost,
            "Pagination batch complete"
        );

        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::prompts::PAGINATION_PROMPT;
    use crate::security::StaticCredentials;
    use crate::stores::MemoryCache;
    use crate::testing::{test_gateway, MockBackend};
    use serde_json::json;

    fn paginator(backend: MockBackend, cache: Arc<MemoryCache>) -> Paginator {
        Paginator::new(
            test_gateway(backend),
            cache,
            Arc::new(StaticCredentials::new().with_key("GROQ_API_KEY", "gsk-test")),
        )
    }

    #[tokio::test]
    async fn test_prompt_carries_url_and_guidance() {
        let backend = MockBackend::new("groq").with_response(r#"{"page_urls": []}"#);
        let calls = backend.call_log();

        paginator(backend, Arc::new(MemoryCache::new()))
            .discover_pagination(
                &[SourceDocument::new("k", "https://shop.com/list?page=1", "1 2 4")],
                "stop at page 4",
                "groq/deepseek-r1-distill-llama-70b",
            )
            .await
            .unwrap();

        let calls = calls.read().unwrap();
        let system = &calls[0].messages[0].content;
        assert!(system.starts_with(PAGINATION_PROMPT));
        assert!(system.contains("The page being analyzed is: https://shop.com/list?page=1"));
        assert!(system.ends_with("User indications: stop at page 4\n\n"));
    }

    #[tokio::test]
    async fn test_fenced_text_normalized_and_persisted() {
        let backend = MockBackend::new("groq")
            .with_response("```json\n{\"page_urls\": [\"https://shop.com/list?page=2\"]}\n```");
        let cache = Arc::new(MemoryCache::new());

        let outcome = paginator(backend, cache.clone())
            .discover_pagination(
                &[SourceDocument::new("k", "https://shop.com/list", "text")],
                "",
                "groq/deepseek-r1-distill-llama-70b",
            )
            .await
            .unwrap();

        let expected = json!({"page_urls": ["https://shop.com/list?page=2"]});
        assert_eq!(outcome.results[0].pagination_data, expected);
        assert_eq!(
            cache.read_result("k", ResultKind::Pagination).await.unwrap(),
            Some(expected)
        );
    }

    #[tokio::test]
    async fn test_blank_batch_needs_no_credential() {
        let backend = MockBackend::new("openai");
        let calls = backend.call_log();
        let paginator = Paginator::new(
            test_gateway(backend),
            Arc::new(MemoryCache::new()),
            Arc::new(StaticCredentials::new()),
        );

        let outcome = paginator
            .discover_pagination(&[SourceDocument::new("a", "", "")], "", "gpt-4o-mini")
            .await
            .unwrap();

        assert_eq!((outcome.input_tokens, outcome.output_tokens), (0, 0));
        assert_eq!(outcome.cost, rust_decimal::Decimal::ZERO);
        assert!(outcome.results.is_empty());
        assert!(calls.read().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_malformed_output_kept_as_raw_text() {
        let backend = MockBackend::new("groq").with_response("Sorry, I can't find pages.");

        let outcome = paginator(backend, Arc::new(MemoryCache::new()))
            .discover_pagination(
                &[SourceDocument::new("k", "https://shop.com", "text")],
                "",
                "groq/deepseek-r1-distill-llama-70b",
            )
            .await
            .unwrap();

        assert_eq!(
            outcome.results[0].pagination_data,
            json!({"raw_text": "Sorry, I can't find pages."})
        );
        assert!(outcome.input_tokens > 0);
    }
}
