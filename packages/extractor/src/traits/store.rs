//! Storage trait for fetched page text and per-document results.

use async_trait::async_trait;
use serde_json::Value;

use crate::error::Result;

/// Which result column a value belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResultKind {
    Extraction,
    Pagination,
}

impl ResultKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Extraction => "extraction",
            Self::Pagination => "pagination",
        }
    }
}

/// Key-value cache keyed by a document's unique key.
///
/// Last writer wins and nothing expires. A read after a write to the same key
/// sees that write.
#[async_trait]
pub trait ContentCache: Send + Sync {
    /// Raw text stored under `key`. Absent and empty both mean "no data".
    async fn read_raw(&self, key: &str) -> Result<Option<String>>;

    /// Store raw text, replacing anything already under `key`.
    async fn write_raw(&self, key: &str, source_url: &str, text: &str) -> Result<()>;

    /// Store a normalized result for `key`.
    async fn write_result(&self, key: &str, kind: ResultKind, value: &Value) -> Result<()>;

    /// Read a stored result.
    async fn read_result(&self, key: &str, kind: ResultKind) -> Result<Option<Value>>;
}
