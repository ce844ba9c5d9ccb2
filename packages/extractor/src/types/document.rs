//! Source documents, model responses and batch totals.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::ops::{Add, AddAssign};

/// A fetched page identified by its unique key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceDocument {
    /// Stable key derived from the origin URL and creation time
    pub key: String,

    /// Where the text came from
    pub url: String,

    /// Page text (markdown); may be empty
    pub raw_text: String,
}

impl SourceDocument {
    pub fn new(key: impl Into<String>, url: impl Into<String>, raw_text: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            url: url.into(),
            raw_text: raw_text.into(),
        }
    }

    /// Whether there is anything to send to a model.
    pub fn is_blank(&self) -> bool {
        self.raw_text.trim().is_empty()
    }
}

/// Input and output token counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenCounts {
    pub input: u64,
    pub output: u64,
}

impl TokenCounts {
    pub fn new(input: u64, output: u64) -> Self {
        Self { input, output }
    }
}

impl Add for TokenCounts {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self {
            input: self.input + rhs.input,
            output: self.output + rhs.output,
        }
    }
}

impl AddAssign for TokenCounts {
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

/// What a model returned.
#[derive(Debug, Clone, PartialEq)]
pub enum ResponsePayload {
    /// Parsed structured output
    Structured(Value),

    /// Unparsed text, left for the caller to normalize
    Text(String),
}

impl ResponsePayload {
    /// Textual form, used for output token counting.
    pub fn as_text(&self) -> String {
        match self {
            Self::Structured(value) => value.to_string(),
            Self::Text(text) => text.clone(),
        }
    }
}

/// One gateway call's result.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelResponse {
    pub payload: ResponsePayload,
    pub tokens: TokenCounts,
    pub cost: Decimal,
}

/// Extraction result for one document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractedDocument {
    pub key: String,
    pub parsed_data: Value,
}

/// Pagination result for one document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaginatedDocument {
    pub key: String,
    pub pagination_data: Value,
}

/// Totals and ordered per-document results of one batch.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatchOutcome<T> {
    pub input_tokens: u64,
    pub output_tokens: u64,
    pub cost: Decimal,
    pub results: Vec<T>,
}

impl<T> Default for BatchOutcome<T> {
    fn default() -> Self {
        Self {
            input_tokens: 0,
            output_tokens: 0,
            cost: Decimal::ZERO,
            results: Vec::new(),
        }
    }
}

impl<T> BatchOutcome<T> {
    /// Add one call's usage to the totals.
    pub fn record(&mut self, response: &ModelResponse) {
        self.input_tokens += response.tokens.input;
        self.output_tokens += response.tokens.output;
        self.cost += response.cost;
    }

    pub fn tokens(&self) -> TokenCounts {
        TokenCounts::new(self.input_tokens, self.output_tokens)
    }
}
