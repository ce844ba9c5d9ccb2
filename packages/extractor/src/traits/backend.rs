//! LLM backend trait.
//!
//! A backend turns a fully-built chat request into text. Model resolution,
//! prompt assembly, token counting and pricing all live in the gateway.

use async_trait::async_trait;
use llm_client::{ChatRequest, ChatResponse};

use crate::error::Result;
use crate::security::SecretString;

/// One LLM provider.
#[async_trait]
pub trait CompletionBackend: Send + Sync {
    /// Id the catalog refers to (e.g. `"openai"`).
    fn id(&self) -> &str;

    /// Whether the provider enforces a strict `json_schema` response format.
    ///
    /// Backends that return `false` are asked for `json_object` mode and their
    /// text is validated by the caller.
    fn supports_json_schema(&self) -> bool;

    /// Send one request. No retries.
    async fn complete(&self, request: &ChatRequest, credential: &SecretString)
        -> Result<ChatResponse>;
}
