//! Model catalog: which backend serves a model, its credential and pricing.

use indexmap::IndexMap;
use rust_decimal::Decimal;
use serde::Serialize;

use crate::error::{ExtractionError, Result};

/// Static description of one model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ModelSpec {
    /// Catalog id, optionally prefixed with `provider/`
    pub id: String,

    /// Backend id that serves this model
    pub backend: String,

    /// Environment variable holding the API key
    pub credential_var: String,

    /// Output token capacity
    pub max_output_tokens: u32,

    /// Price per input token
    pub input_price: Decimal,

    /// Price per output token
    pub output_price: Decimal,
}

impl ModelSpec {
    pub fn new(
        id: impl Into<String>,
        backend: impl Into<String>,
        credential_var: impl Into<String>,
        max_output_tokens: u32,
    ) -> Self {
        Self {
            id: id.into(),
            backend: backend.into(),
            credential_var: credential_var.into(),
            max_output_tokens,
            input_price: Decimal::ZERO,
            output_price: Decimal::ZERO,
        }
    }

    /// Set per-token prices.
    pub fn with_prices(mut self, input_price: Decimal, output_price: Decimal) -> Self {
        self.input_price = input_price;
        self.output_price = output_price;
        self
    }

    /// Name sent on the wire: the id without its `provider/` prefix.
    pub fn wire_name(&self) -> &str {
        self.id
            .split_once('/')
            .map(|(_, name)| name)
            .unwrap_or(&self.id)
    }

    /// Monetary cost of a call with the given token counts.
    pub fn cost(&self, input_tokens: u64, output_tokens: u64) -> Decimal {
        Decimal::from(input_tokens) * self.input_price
            + Decimal::from(output_tokens) * self.output_price
    }
}

/// Lookup table from model id to [`ModelSpec`].
#[derive(Debug, Clone)]
pub struct ModelCatalog {
    models: IndexMap<String, ModelSpec>,
}

impl Default for ModelCatalog {
    /// The three models the CLI offers out of the box.
    fn default() -> Self {
        Self::empty()
            .with_model(
                ModelSpec::new("gpt-4o-mini", "openai", "OPENAI_API_KEY", 16384)
                    .with_prices(Decimal::new(15, 8), Decimal::new(6, 7)),
            )
            .with_model(
                ModelSpec::new("gemini/gemini-1.5-flash", "gemini", "GEMINI_API_KEY", 8192)
                    .with_prices(Decimal::new(75, 9), Decimal::new(3, 7)),
            )
            .with_model(
                ModelSpec::new(
                    "groq/deepseek-r1-distill-llama-70b",
                    "groq",
                    "GROQ_API_KEY",
                    4096,
                )
                .with_prices(Decimal::new(75, 8), Decimal::new(99, 8)),
            )
    }
}

impl ModelCatalog {
    /// A catalog with no models.
    pub fn empty() -> Self {
        Self {
            models: IndexMap::new(),
        }
    }

    /// Add or replace a model.
    pub fn with_model(mut self, spec: ModelSpec) -> Self {
        self.models.insert(spec.id.clone(), spec);
        self
    }

    /// Resolve a model id.
    pub fn get(&self, model_id: &str) -> Result<&ModelSpec> {
        self.models
            .get(model_id)
            .ok_or_else(|| ExtractionError::UnknownModel {
                model: model_id.to_string(),
            })
    }

    /// Model ids in registration order.
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.models.keys().map(String::as_str)
    }
}
