//! Run controller: validate a request, fetch, extract and paginate.
//!
//! State machine:
//!
//! ```text
//! Idle ──start──▶ Running ──ok──▶ Completed(report)
//!   ▲                │                  │
//!   └─────error──────┘                  │
//!   ▲                                   │
//!   └──────────────reset────────────────┘
//! ```
//!
//! A failed run drops its partial totals. Per-document results already
//! written to the cache stay there.

use chrono::Utc;
use rust_decimal::Decimal;
use serde::Serialize;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::{error, info};
use url::Url;

use crate::error::{ExtractionError, Result};
use crate::gateway::{ModelGateway, OutputCeiling};
use crate::pipeline::extract::Extractor;
use crate::pipeline::fetch::fetch_and_store;
use crate::pipeline::paginate::Paginator;
use crate::security::CredentialSource;
use crate::traits::fetcher::PageFetcher;
use crate::traits::store::ContentCache;
use crate::types::document::{BatchOutcome, ExtractedDocument, PaginatedDocument, SourceDocument};

/// Which phases to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RunMode {
    pub extract: bool,
    pub paginate: bool,
}

impl Default for RunMode {
    fn default() -> Self {
        Self {
            extract: true,
            paginate: false,
        }
    }
}

/// Inputs for one run.
#[derive(Debug, Clone, Default)]
pub struct RunRequest {
    pub urls: Vec<String>,
    pub fields: Vec<String>,
    pub model_id: String,
    pub pagination_guidance: String,
    pub mode: RunMode,
}

impl RunRequest {
    fn validate(&self) -> Result<()> {
        if !self.mode.extract && !self.mode.paginate {
            return Err(ExtractionError::InvalidRun {
                reason: "extraction and pagination are both disabled".to_string(),
            });
        }
        if self.urls.iter().all(|u| u.trim().is_empty()) {
            return Err(ExtractionError::InvalidRun {
                reason: "at least one URL is required".to_string(),
            });
        }
        for raw in self.urls.iter().map(|u| u.trim()).filter(|u| !u.is_empty()) {
            match Url::parse(raw) {
                Ok(parsed) if matches!(parsed.scheme(), "http" | "https") => {}
                _ => {
                    return Err(ExtractionError::InvalidRun {
                        reason: format!("not an http(s) URL: {}", raw),
                    })
                }
            }
        }
        if self.mode.extract && self.fields.iter().all(|f| f.trim().is_empty()) {
            return Err(ExtractionError::InvalidRun {
                reason: "at least one field is required for extraction".to_string(),
            });
        }
        Ok(())
    }
}

/// Everything a completed run produced.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunReport {
    pub documents: Vec<SourceDocument>,
    pub extraction: Option<BatchOutcome<ExtractedDocument>>,
    pub pagination: Option<BatchOutcome<PaginatedDocument>>,
    pub input_tokens: u64,
    pub output_tokens: u64,
    pub cost: Decimal,
}

impl RunReport {
    fn new(
        documents: Vec<SourceDocument>,
        extraction: Option<BatchOutcome<ExtractedDocument>>,
        pagination: Option<BatchOutcome<PaginatedDocument>>,
    ) -> Self {
        let mut report = Self {
            documents,
            extraction: None,
            pagination: None,
            input_tokens: 0,
            output_tokens: 0,
            cost: Decimal::ZERO,
        };
        if let Some(batch) = &extraction {
            report.input_tokens += batch.input_tokens;
            report.output_tokens += batch.output_tokens;
            report.cost += batch.cost;
        }
        if let Some(batch) = &pagination {
            report.input_tokens += batch.input_tokens;
            report.output_tokens += batch.output_tokens;
            report.cost += batch.cost;
        }
        report.extraction = extraction;
        report.pagination = pagination;
        report
    }
}

/// Session state.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum RunState {
    #[default]
    Idle,
    Running,
    Completed(RunReport),
}

/// Sequences fetching, extraction and pagination for one request at a time.
pub struct RunController {
    fetcher: Arc<dyn PageFetcher>,
    cache: Arc<dyn ContentCache>,
    extractor: Extractor,
    paginator: Paginator,
    state: Mutex<RunState>,
}

impl RunController {
    pub fn new(
        gateway: Arc<ModelGateway>,
        cache: Arc<dyn ContentCache>,
        credentials: Arc<dyn CredentialSource>,
        fetcher: Arc<dyn PageFetcher>,
    ) -> Self {
        Self {
            extractor: Extractor::new(gateway.clone(), cache.clone(), credentials.clone()),
            paginator: Paginator::new(gateway, cache.clone(), credentials),
            fetcher,
            cache,
            state: Mutex::new(RunState::Idle),
        }
    }

    /// Apply an output ceiling to both phases.
    pub fn with_output_ceiling(mut self, ceiling: OutputCeiling) -> Self {
        self.extractor = self.extractor.with_output_ceiling(ceiling);
        self.paginator = self.paginator.with_output_ceiling(ceiling);
        self
    }

    fn lock(&self) -> MutexGuard<'_, RunState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Current state.
    pub fn state(&self) -> RunState {
        self.lock().clone()
    }

    /// Drop the last report and return to idle.
    pub fn reset(&self) -> Result<()> {
        let mut state = self.lock();
        if *state == RunState::Running {
            return Err(ExtractionError::RunInProgress);
        }
        *state = RunState::Idle;
        Ok(())
    }

    /// Run a request to completion.
    pub async fn start(&self, request: RunRequest) -> Result<RunReport> {
        request.validate()?;

        {
            let mut state = self.lock();
            if *state == RunState::Running {
                return Err(ExtractionError::RunInProgress);
            }
            *state = RunState::Running;
        }

        match self.run(&request).await {
            Ok(report) => {
                info!(
                    urls = request.urls.len(),
                    input_tokens = report.input_tokens,
                    output_tokens = report.output_tokens,
                    cost = %report.cost,
                    "Run complete"
                );
                *self.lock() = RunState::Completed(report.clone());
                Ok(report)
            }
            Err(e) => {
                error!(error = %e, "Run failed");
                *self.lock() = RunState::Idle;
                Err(e)
            }
        }
    }

    async fn run(&self, request: &RunRequest) -> Result<RunReport> {
        let urls: Vec<String> = request
            .urls
            .iter()
            .map(|u| u.trim().to_string())
            .filter(|u| !u.is_empty())
            .collect();

        let documents = fetch_and_store(&urls, Utc::now(), self.fetcher.as_ref(), self.cache.as_ref()).await?;

        let extraction = if request.mode.extract {
            Some(
                self.extractor
                    .extract(&documents, &request.fields, &request.model_id)
                    .await?,
            )
        } else {
            None
        };

        let pagination = if request.mode.paginate {
            Some(
                self.paginator
                    .discover_pagination(&documents, &request.pagination_guidance, &request.model_id)
                    .await?,
            )
        } else {
            None
        };

        Ok(RunReport::new(documents, extraction, pagination))
    }
}
