//! In-memory cache implementation for testing and development.

use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::RwLock;

use crate::error::{ExtractionError, Result};
use crate::traits::store::{ContentCache, ResultKind};

#[derive(Debug, Clone, Default)]
struct Entry {
    url: String,
    raw_text: String,
    extraction: Option<Value>,
    pagination: Option<Value>,
}

/// In-memory content cache.
///
/// Data is lost on restart.
#[derive(Debug, Default)]
pub struct MemoryCache {
    entries: RwLock<HashMap<String, Entry>>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of keys stored.
    pub fn len(&self) -> usize {
        self.entries.read().map(|e| e.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Origin URL recorded for a key.
    pub fn source_url(&self, key: &str) -> Option<String> {
        self.entries
            .read()
            .ok()
            .and_then(|e| e.get(key).map(|entry| entry.url.clone()))
    }
}

fn poisoned<T>(_: T) -> ExtractionError {
    ExtractionError::Storage("memory cache lock poisoned".into())
}

#[async_trait]
impl ContentCache for MemoryCache {
    async fn read_raw(&self, key: &str) -> Result<Option<String>> {
        let entries = self.entries.read().map_err(poisoned)?;
        Ok(entries
            .get(key)
            .map(|e| e.raw_text.clone())
            .filter(|text| !text.is_empty()))
    }

    async fn write_raw(&self, key: &str, source_url: &str, text: &str) -> Result<()> {
        let mut entries = self.entries.write().map_err(poisoned)?;
        let entry = entries.entry(key.to_string()).or_default();
        entry.url = source_url.to_string();
        entry.raw_text = text.to_string();
        Ok(())
    }

    async fn write_result(&self, key: &str, kind: ResultKind, value: &Value) -> Result<()> {
        let mut entries = self.entries.write().map_err(poisoned)?;
        let entry = entries.entry(key.to_string()).or_default();
        match kind {
            ResultKind::Extraction => entry.extraction = Some(value.clone()),
            ResultKind::Pagination => entry.pagination = Some(value.clone()),
        }
        Ok(())
    }

    async fn read_result(&self, key: &str, kind: ResultKind) -> Result<Option<Value>> {
        let entries = self.entries.read().map_err(poisoned)?;
        Ok(entries.get(key).and_then(|e| match kind {
            ResultKind::Extraction => e.extraction.clone(),
            ResultKind::Pagination => e.pagination.clone(),
        }))
    }
}
