//! LLM extraction orchestration.
//!
//! Turns page text into structured records with an LLM, discovers pagination
//! URLs, and keeps token and cost totals across many documents and backends.
//!
//! # Usage
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use extractor::{EnvCredentials, Extractor, MemoryCache, ModelCatalog, ModelGateway};
//!
//! let gateway = Arc::new(ModelGateway::with_default_backends(
//!     ModelCatalog::default(),
//!     reqwest::Client::new(),
//! ));
//! let extractor = Extractor::new(gateway, Arc::new(MemoryCache::new()), Arc::new(EnvCredentials));
//!
//! let outcome = extractor
//!     .extract(&documents, &["title".into(), "price".into()], "gpt-4o-mini")
//!     .await?;
//! println!("{} records, cost ${}", outcome.results.len(), outcome.cost);
//! ```
//!
//! # Modules
//!
//! - [`types`] - Schemas, model catalog, documents and batch results
//! - [`gateway`] - One call surface over the OpenAI, Gemini and Groq backends
//! - [`pipeline`] - Fetching, orchestrators, run controller and export
//! - [`stores`] - Content cache implementations (memory, SQLite)
//! - [`fetchers`] - HTTP page fetcher
//! - [`security`] - Credential handling
//! - [`testing`] - Mock implementations for testing

pub mod error;
pub mod fetchers;
pub mod gateway;
pub mod pipeline;
pub mod security;
pub mod stores;
pub mod testing;
pub mod traits;
pub mod types;

pub use error::{ExtractionError, Result, SchemaValidationError};
pub use fetchers::HttpFetcher;
pub use gateway::{
    GatewayRequest, GeminiBackend, GroqBackend, HeuristicTokenCounter, ModelGateway,
    OpenAiBackend, OutputCeiling, TokenCounter,
};
pub use pipeline::{
    export, fetch_and_store, normalize, unique_key, Extractor, Paginator, RunController, RunMode,
    RunReport, RunRequest, RunState,
};
pub use security::{CredentialSource, EnvCredentials, SecretString, StaticCredentials};
pub use stores::MemoryCache;
#[cfg(feature = "sqlite")]
pub use stores::SqliteCache;
pub use traits::{
    backend::CompletionBackend,
    fetcher::PageFetcher,
    store::{ContentCache, ResultKind},
};
pub use types::{
    document::{
        BatchOutcome, ExtractedDocument, ModelResponse, PaginatedDocument, ResponsePayload,
        SourceDocument, TokenCounts,
    },
    model::{ModelCatalog, ModelSpec},
    schema::{build_schema, page_urls, pagination_schema, FieldType, Schema, TargetSchema},
};
