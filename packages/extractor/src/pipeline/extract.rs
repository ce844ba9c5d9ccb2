//! Extraction orchestrator: documents in, structured records out.

use std::sync::Arc;
use tracing::{info, warn};

use crate::error::Result;
use crate::gateway::{GatewayRequest, ModelGateway, OutputCeiling};
use crate::pipeline::normalize::normalize;
use crate::pipeline::prompts::{format_field_guidance, SYSTEM_MESSAGE};
use crate::pipeline::BatchCredential;
use crate::security::CredentialSource;
use crate::traits::store::{ContentCache, ResultKind};
use crate::types::document::{BatchOutcome, ExtractedDocument, SourceDocument};
use crate::types::schema::build_schema;

/// Runs field extraction over a batch of documents.
pub struct Extractor {
    gateway: Arc<ModelGateway>,
    cache: Arc<dyn ContentCache>,
    credentials: Arc<dyn CredentialSource>,
    ceiling: OutputCeiling,
}

impl Extractor {
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

    /// Limit output tokens per call.
    pub fn with_output_ceiling(mut self, ceiling: OutputCeiling) -> Self {
        self.ceiling = ceiling;
        self
    }

    /// Extract `field_names` from every document, in order.
    ///
    /// Blank documents are skipped and contribute nothing. Schema mismatches
    /// are logged and the data kept. Credential, backend and storage failures
    /// abort the batch.
    pub async fn extract(
        &self,
        documents: &[SourceDocument],
        field_names: &[String],
        model_id: &str,
    ) -> Result<BatchOutcome<ExtractedDocument>> {
        let schema = build_schema(field_names)?;
        let mut credential = BatchCredential::new(&self.gateway, self.credentials.as_ref(), model_id);
        let target = schema.listings();
        let guidance = format_field_guidance(&schema.field_names());

        let mut outcome = BatchOutcome::default();

        for document in documents {
            if document.is_blank() {
                warn!(key = %document.key, "No raw text for document, skipping extraction");
                continue;
            }

            let response = self
                .gateway
                .call(
                    GatewayRequest {
                        content: &document.raw_text,
                        schema: &target,
                        model_id,
                        system_prompt: SYSTEM_MESSAGE,
                        user_guidance: &guidance,
                        max_output_tokens: self.ceiling,
                    },
                    credential.get()?,
                )
                .await?;
            outcome.record(&response);

            let parsed_data = normalize(response.payload);
            if let Err(error) = schema.validate(&parsed_data) {
                warn!(key = %document.key, error = %error, "Extraction result does not match schema");
            }

            self.cache
                .write_result(&document.key, ResultKind::Extraction, &parsed_data)
                .await?;

            outcome.results.push(ExtractedDocument {
                key: document.key.clone(),
                parsed_data,
            });
        }

        info!(
            model = %model_id,
            documents = outcome.results.len(),
            input_tokens = outcome.input_tokens,
            output_tokens = outcome.output_tokens,
            cost = %outcome.cost,
            "Extraction batch complete"
        );

        Ok(outcome)
    }
}
