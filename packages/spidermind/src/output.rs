//! Writing run results to disk and summarizing usage.

use anyhow::{Context, Result};
use extractor::export::{extraction_rows, pagination_rows, to_csv, to_json};
use extractor::{BatchOutcome, RunReport};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

/// Where to write each output; `None` skips it.
#[derive(Debug, Clone, Default)]
pub struct OutputPaths {
    pub json: Option<PathBuf>,
    pub csv: Option<PathBuf>,
    pub pagination_json: Option<PathBuf>,
    pub pagination_csv: Option<PathBuf>,
}

fn write(path: &Path, contents: &str) -> Result<()> {
    fs::write(path, contents).with_context(|| format!("Failed to write {}", path.display()))?;
    info!(path = %path.display(), bytes = contents.len(), "Wrote output");
    Ok(())
}

/// Write the requested files.
///
/// JSON holds the extraction results, or the pagination results when only
/// pagination ran.
pub fn write_outputs(report: &RunReport, fields: &[String], paths: &OutputPaths) -> Result<()> {
    if let Some(path) = &paths.json {
        let json = match (&report.extraction, &report.pagination) {
            (Some(extraction), _) => to_json(&extraction.results)?,
            (None, Some(pagination)) => to_json(&pagination.results)?,
            (None, None) => "[]".to_string(),
        };
        write(path, &json)?;
    }

    if let (Some(path), Some(extraction)) = (&paths.csv, &report.extraction) {
        let preferred: Vec<&str> = fields.iter().map(|f| f.trim()).collect();
        write(path, &to_csv(&extraction_rows(&extraction.results), &preferred))?;
    }

    if let (Some(path), Some(pagination)) = (&paths.pagination_json, &report.pagination) {
        write(path, &to_json(&pagination.results)?)?;
    }

    if let (Some(path), Some(pagination)) = (&paths.pagination_csv, &report.pagination) {
        write(path, &to_csv(&pagination_rows(&pagination.results), &["page_url"]))?;
    }

    Ok(())
}

fn phase_line<T>(label: &str, batch: &BatchOutcome<T>) -> String {
    format!(
        "{:<11} documents: {:>3}  input tokens: {:>8}  output tokens: {:>8}  cost: ${}",
        label,
        batch.results.len(),
        batch.input_tokens,
        batch.output_tokens,
        batch.cost
    )
}

/// Per-phase and combined usage.
pub fn summary(report: &RunReport) -> String {
    let mut lines = Vec::new();
    if let Some(extraction) = &report.extraction {
        lines.push(phase_line("Extraction", extraction));
    }
    if let Some(pagination) = &report.pagination {
        lines.push(phase_line("Pagination", pagination));
    }
    lines.push(format!(
        "{:<11} input tokens: {}  output tokens: {}  total cost: ${}",
        "Total", report.input_tokens, report.output_tokens, report.cost
    ));
    lines.join("\n")
}
