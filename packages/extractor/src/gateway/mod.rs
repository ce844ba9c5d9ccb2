//! Model gateway: one call surface over several LLM backends.
//!
//! The gateway resolves a model id through the catalog, assembles the
//! system and user messages, applies the output-token ceiling, picks the
//! response format the backend can honor, and prices the call.

pub mod backends;
pub mod tokens;

use llm_client::{ChatRequest, Message, ResponseFormat};
use reqwest::Client;
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, instrument};

use crate::error::{ExtractionError, Result};
use crate::pipeline::prompts::format_user_message;
use crate::security::SecretString;
use crate::traits::backend::CompletionBackend;
use crate::types::document::{ModelResponse, ResponsePayload, TokenCounts};
use crate::types::model::{ModelCatalog, ModelSpec};
use crate::types::schema::TargetSchema;

pub use backends::{GeminiBackend, GroqBackend, OpenAiBackend};
pub use tokens::{HeuristicTokenCounter, TokenCounter};

/// Tokens held back from a model's capacity.
pub const OUTPUT_MARGIN: u32 = 100;

/// Smallest limit ever sent; providers reject `max_tokens: 0`.
pub const MIN_OUTPUT_TOKENS: u32 = 1;

/// How many output tokens to allow.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputCeiling {
    /// Caller-chosen limit, clamped to the model's capacity
    Explicit(u32),
    /// The model's full capacity
    BackendMax,
    /// Send no limit at all
    #[default]
    Unbounded,
}

impl OutputCeiling {
    /// The `max_tokens` value to send, if any. Never below [`MIN_OUTPUT_TOKENS`].
    pub fn resolve(&self, capacity: u32) -> Option<u32> {
        let limit = match self {
            Self::Explicit(n) => (*n).min(capacity),
            Self::BackendMax => capacity,
            Self::Unbounded => return None,
        };
        Some(limit.saturating_sub(OUTPUT_MARGIN).max(MIN_OUTPUT_TOKENS))
    }
}

/// Inputs for one gateway call.
#[derive(Debug, Clone)]
pub struct GatewayRequest<'a> {
    pub content: &'a str,
    pub schema: &'a TargetSchema,
    pub model_id: &'a str,
    pub system_prompt: &'a str,
    pub user_guidance: &'a str,
    pub max_output_tokens: OutputCeiling,
}

/// Routes calls to registered backends and accounts for their usage.
pub struct ModelGateway {
    catalog: ModelCatalog,
    backends: HashMap<String, Arc<dyn CompletionBackend>>,
    counter: Arc<dyn TokenCounter>,
}

impl ModelGateway {
    /// A gateway with no backends registered.
    pub fn new(catalog: ModelCatalog) -> Self {
        Self {
            catalog,
            backends: HashMap::new(),
            counter: Arc::new(HeuristicTokenCounter),
        }
    }

    /// A gateway with the OpenAI, Gemini and Groq backends sharing one HTTP client.
    pub fn with_default_backends(catalog: ModelCatalog, http: Client) -> Self {
        Self::new(catalog)
            .with_backend(Arc::new(OpenAiBackend::new(http.clone())))
            .with_backend(Arc::new(GeminiBackend::new(http.clone())))
            .with_backend(Arc::new(GroqBackend::new(http)))
    }

    /// Register a backend under its id, replacing any previous one.
    pub fn with_backend(mut self, backend: Arc<dyn CompletionBackend>) -> Self {
        self.backends.insert(backend.id().to_string(), backend);
        self
    }

    /// Replace the token counter.
    pub fn with_token_counter(mut self, counter: Arc<dyn TokenCounter>) -> Self {
        self.counter = counter;
        self
    }

    pub fn catalog(&self) -> &ModelCatalog {
        &self.catalog
    }

    /// Resolve a model id.
    pub fn model(&self, model_id: &str) -> Result<&ModelSpec> {
        self.catalog.get(model_id)
    }

    /// Make one call. Backend failures are returned as-is and never retried.
    #[instrument(skip_all, fields(model = %request.model_id))]
    pub async fn call(
        &self,
        request: GatewayRequest<'_>,
        credential: &SecretString,
    ) -> Result<ModelResponse> {
        let spec = self.catalog.get(request.model_id)?;
        if credential.is_blank() {
            return Err(ExtractionError::CredentialMissing {
                model: spec.id.clone(),
                variable: spec.credential_var.clone(),
            });
        }

        let backend = self
            .backends
            .get(&spec.backend)
            .ok_or_else(|| ExtractionError::UnknownBackend {
                backend: spec.backend.clone(),
            })?;

        let messages = vec![
            Message::system(request.system_prompt),
            Message::user(format_user_message(request.user_guidance, request.content)),
        ];

        let format = if backend.supports_json_schema() {
            ResponseFormat::json_schema(
                request.schema.name.clone(),
                request.schema.json_schema.clone(),
            )
        } else {
            ResponseFormat::JsonObject
        };

        let mut chat = ChatRequest::new(spec.wire_name())
            .messages(messages)
            .response_format(format);
        if let Some(limit) = request.max_output_tokens.resolve(spec.max_output_tokens) {
            chat = chat.output_limit(limit);
        }

        let start = Instant::now();
        let response = backend.complete(&chat, credential).await?;

        let payload = if backend.supports_json_schema() {
            match serde_json::from_str(&response.content) {
                Ok(value) => ResponsePayload::Structured(value),
                Err(_) => ResponsePayload::Text(response.content),
            }
        } else {
            ResponsePayload::Text(response.content)
        };

        let counted = TokenCounts::new(
            self.counter.count_messages(&chat.messages),
            self.counter.count_text(&payload.as_text()),
        );
        let billed = response
            .usage
            .map(|u| TokenCounts::new(u.prompt_tokens.into(), u.completion_tokens.into()))
            .unwrap_or(counted);
        let cost: Decimal = spec.cost(billed.input, billed.output);

        debug!(
            backend = %spec.backend,
            input_tokens = counted.input,
            output_tokens = counted.output,
            %cost,
            duration_ms = start.elapsed().as_millis() as u64,
            "Model call complete"
        );

        Ok(ModelResponse {
            payload,
            tokens: counted,
            cost,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MockBackend;
    use crate::types::schema::{build_schema, pagination_schema};
    use serde_json::json;
    use std::str::FromStr;

    fn gateway_with(backend: MockBackend) -> (ModelGateway, Arc<MockBackend>) {
        let backend = Arc::new(backend);
        let gateway = ModelGateway::new(ModelCatalog::default()).with_backend(backend.clone());
        (gateway, backend)
    }

    fn request<'a>(schema: &'a TargetSchema, model_id: &'a str) -> GatewayRequest<'a> {
        GatewayRequest {
            content: "page text",
            schema,
            model_id,
            system_prompt: "system",
            user_guidance: "Fields: title",
            max_output_tokens: OutputCeiling::Unbounded,
        }
    }

    #[test]
    fn test_ceiling_arithmetic() {
        assert_eq!(OutputCeiling::Explicit(500).resolve(16384), Some(400));
        assert_eq!(OutputCeiling::Explicit(50_000).resolve(8192), Some(8092));
        assert_eq!(OutputCeiling::Explicit(101).resolve(4096), Some(1));
        assert_eq!(OutputCeiling::Explicit(100).resolve(4096), Some(1));
        assert_eq!(OutputCeiling::Explicit(50).resolve(4096), Some(1));
        assert_eq!(OutputCeiling::Explicit(0).resolve(4096), Some(1));
        assert_eq!(OutputCeiling::BackendMax.resolve(4096), Some(3996));
        assert_eq!(OutputCeiling::Unbounded.resolve(4096), None);
    }

    #[tokio::test]
    async fn test_json_schema_backend_gets_strict_format() {
        let (gateway, backend) =
            gateway_with(MockBackend::new("openai").with_response(r#"{"listings": []}"#));
        let schema = build_schema(["title"]).unwrap().listings();

        let response = gateway
            .call(request(&schema, "gpt-4o-mini"), &SecretString::new("sk"))
            .await
            .unwrap();

        assert_eq!(
            response.payload,
            ResponsePayload::Structured(json!({"listings": []}))
        );

        let calls = backend.calls();
        assert_eq!(calls.len(), 1);
        let sent = &calls[0];
        assert_eq!(sent.model, "gpt-4o-mini");
        assert!(matches!(
            sent.response_format,
            Some(ResponseFormat::JsonSchema { .. })
        ));
        assert_eq!(sent.max_tokens, None);
        assert_eq!(sent.messages[0], Message::system("system"));
        assert_eq!(
            sent.messages[1].content,
            format_user_message("Fields: title", "page text")
        );
    }

    #[tokio::test]
    async fn test_tiny_ceiling_still_sends_positive_limit() {
        let (gateway, backend) =
            gateway_with(MockBackend::new("openai").with_response(r#"{"listings": []}"#));
        let schema = build_schema(["title"]).unwrap().listings();
        let mut req = request(&schema, "gpt-4o-mini");
        req.max_output_tokens = OutputCeiling::Explicit(40);

        gateway.call(req, &SecretString::new("sk")).await.unwrap();

        assert_eq!(backend.calls()[0].max_tokens, Some(1));
    }

    #[tokio::test]
    async fn test_json_object_backend_returns_text() {
        let (gateway, backend) =
            gateway_with(MockBackend::new("groq").with_response("```json\n{\"page_urls\": []}\n```"));
        let schema = pagination_schema();
        let mut req = request(&schema, "groq/deepseek-r1-distill-llama-70b");
        req.max_output_tokens = OutputCeiling::BackendMax;

        let response = gateway.call(req, &SecretString::new("gsk")).await.unwrap();

        assert!(matches!(response.payload, ResponsePayload::Text(_)));
        let sent = &backend.calls()[0];
        assert_eq!(sent.model, "deepseek-r1-distill-llama-70b");
        assert_eq!(sent.response_format, Some(ResponseFormat::JsonObject));
        assert_eq!(sent.max_tokens, Some(3996));
    }

    #[tokio::test]
    async fn test_cost_uses_provider_usage_when_present() {
        let (gateway, _) = gateway_with(
            MockBackend::new("openai")
                .with_response("{}")
                .with_usage(1000, 500),
        );
        let schema = pagination_schema();

        let response = gateway
            .call(request(&schema, "gpt-4o-mini"), &SecretString::new("sk"))
            .await
            .unwrap();

        assert_eq!(response.cost, Decimal::from_str("0.00045").unwrap());
        assert_eq!(response.tokens.output, 1);
    }

    #[tokio::test]
    async fn test_cost_falls_back_to_counted_tokens() {
        let (gateway, _) = gateway_with(MockBackend::new("openai").with_response("{}"));
        let schema = pagination_schema();

        let response = gateway
            .call(request(&schema, "gpt-4o-mini"), &SecretString::new("sk"))
            .await
            .unwrap();

        let spec = gateway.model("gpt-4o-mini").unwrap();
        assert!(response.tokens.input > 0);
        assert_eq!(
            response.cost,
            spec.cost(response.tokens.input, response.tokens.output)
        );
    }

    #[tokio::test]
    async fn test_blank_credential_fails_before_backend() {
        let (gateway, backend) = gateway_with(MockBackend::new("openai").with_response("{}"));
        let schema = pagination_schema();

        let err = gateway
            .call(request(&schema, "gpt-4o-mini"), &SecretString::new("  "))
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            ExtractionError::CredentialMissing { ref variable, .. } if variable == "OPENAI_API_KEY"
        ));
        assert!(backend.calls().is_empty());
    }

    #[tokio::test]
    async fn test_unknown_model_and_backend() {
        let (gateway, _) = gateway_with(MockBackend::new("openai"));
        let schema = pagination_schema();

        let err = gateway
            .call(request(&schema, "nope"), &SecretString::new("sk"))
            .await
            .unwrap_err();
        assert!(matches!(err, ExtractionError::UnknownModel { .. }));

        let err = gateway
            .call(request(&schema, "gemini/gemini-1.5-flash"), &SecretString::new("k"))
            .await
            .unwrap_err();
        assert!(matches!(err, ExtractionError::UnknownBackend { backend } if backend == "gemini"));
    }

    #[tokio::test]
    async fn test_backend_error_surfaces_unmodified() {
        let (gateway, _) = gateway_with(
            MockBackend::new("openai")
                .with_error(llm_client::LlmClientError::RateLimited { retry_after: Some(7) }),
        );
        let schema = pagination_schema();

        let err = gateway
            .call(request(&schema, "gpt-4o-mini"), &SecretString::new("sk"))
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            ExtractionError::Backend(llm_client::LlmClientError::RateLimited {
                retry_after: Some(7)
            })
        ));
    }
}
