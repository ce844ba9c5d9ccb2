//! SpiderMind command-line runner.
//!
//! Fetches pages, extracts the requested fields with an LLM, optionally
//! discovers pagination URLs, and writes JSON/CSV plus a usage summary.

mod config;
mod output;

use anyhow::{Context, Result};
use clap::Parser;
use extractor::{
    ContentCache, CredentialSource, EnvCredentials, HttpFetcher, MemoryCache, ModelCatalog,
    ModelGateway, OutputCeiling, RunController, RunMode, RunRequest, SqliteCache,
    StaticCredentials,
};
use llm_client::LlmClient;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use config::Config;
use output::OutputPaths;

#[derive(Debug, Parser)]
#[command(
    name = "spidermind",
    version,
    about = "Extract structured listings from web pages with an LLM"
)]
struct Cli {
    /// Page to process; repeat the flag or separate URLs with whitespace
    #[arg(long = "url", required = true)]
    urls: Vec<String>,

    /// Field to extract; repeat for each field
    #[arg(long = "field")]
    fields: Vec<String>,

    /// Model id (overrides SPIDERMIND_MODEL)
    #[arg(long)]
    model: Option<String>,

    /// Also discover pagination URLs
    #[arg(long)]
    paginate: bool,

    /// Free-text hints for pagination discovery
    #[arg(long, default_value = "")]
    guidance: String,

    /// Skip field extraction (pagination only)
    #[arg(long)]
    no_extract: bool,

    /// Cap on output tokens per model call
    #[arg(long)]
    max_output_tokens: Option<u32>,

    /// API key for the chosen model instead of its environment variable
    #[arg(long)]
    api_key: Option<String>,

    /// Write results as JSON
    #[arg(long)]
    json_out: Option<PathBuf>,

    /// Write extracted records as CSV
    #[arg(long)]
    csv_out: Option<PathBuf>,

    /// Write pagination results as JSON
    #[arg(long)]
    pagination_json_out: Option<PathBuf>,

    /// Write discovered page URLs as CSV
    #[arg(long)]
    pagination_csv_out: Option<PathBuf>,

    /// SQLite cache location (overrides SPIDERMIND_DATABASE_URL)
    #[arg(long)]
    database_url: Option<String>,
}

impl Cli {
    fn run_request(&self, model_id: &str) -> RunRequest {
        RunRequest {
            urls: self
                .urls
                .iter()
                .flat_map(|u| u.split_whitespace())
                .map(str::to_string)
                .collect(),
            fields: self.fields.clone(),
            model_id: model_id.to_string(),
            pagination_guidance: self.guidance.clone(),
            mode: RunMode {
                extract: !self.no_extract,
                paginate: self.paginate,
            },
        }
    }

    fn output_paths(&self) -> OutputPaths {
        OutputPaths {
            json: self.json_out.clone(),
            csv: self.csv_out.clone(),
            pagination_json: self.pagination_json_out.clone(),
            pagination_csv: self.pagination_csv_out.clone(),
        }
    }

    fn output_ceiling(&self) -> OutputCeiling {
        self.max_output_tokens
            .map(OutputCeiling::Explicit)
            .unwrap_or_default()
    }
}

/// Plain file paths become `sqlite://<path>?mode=rwc` so the file is created.
fn sqlite_url(database_url: &str) -> String {
    if database_url.starts_with("sqlite:") {
        database_url.to_string()
    } else {
        format!("sqlite://{}?mode=rwc", database_url)
    }
}

async fn open_cache(database_url: Option<&str>) -> Result<Arc<dyn ContentCache>> {
    match database_url {
        Some(url) => {
            let url = sqlite_url(url);
            tracing::info!(url = %url, "Using SQLite cache");
            let cache = SqliteCache::new(&url)
                .await
                .with_context(|| format!("Failed to open cache at {}", url))?;
            Ok(Arc::new(cache))
        }
        None => {
            tracing::info!("Using in-memory cache");
            Ok(Arc::new(MemoryCache::new()))
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,extractor=debug,llm_client=debug,sqlx=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env()?.with_overrides(cli.model.clone(), cli.database_url.clone());
    tracing::info!(model = %config.model, timeout = ?config.request_timeout, "Starting SpiderMind");

    let http = LlmClient::http_client_with_timeout(config.request_timeout)
        .context("Failed to build LLM HTTP client")?;
    let gateway = Arc::new(ModelGateway::with_default_backends(ModelCatalog::default(), http));
    let spec = gateway.model(&config.model)?;

    let credentials: Arc<dyn CredentialSource> = match &cli.api_key {
        Some(key) => Arc::new(StaticCredentials::new().with_key(spec.credential_var.clone(), key.as_str())),
        None => Arc::new(EnvCredentials),
    };

    let cache = open_cache(config.database_url.as_deref()).await?;
    let fetcher = Arc::new(HttpFetcher::new()?);

    let controller = RunController::new(gateway, cache, credentials, fetcher)
        .with_output_ceiling(cli.output_ceiling());

    let report = match controller.start(cli.run_request(&config.model)).await {
        Ok(report) => report,
        Err(e) => {
            eprintln!("{}", e.user_message());
            return Err(e.into());
        }
    };

    output::write_outputs(&report, &cli.fields, &cli.output_paths())?;

    let summary = output::summary(&report);
    tracing::info!(
        input_tokens = report.input_tokens,
        output_tokens = report.output_tokens,
        cost = %report.cost,
        "Run summary"
    );
    println!("{}", summary);

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_builds_run_request() {
        let cli = Cli::try_parse_from([
            "spidermind",
            "--url",
            "https://a.com/1 https://a.com/2",
            "--url",
            "https://b.com",
            "--field",
            "title",
            "--field",
            "price",
            "--paginate",
            "--guidance",
            "first 3 pages",
        ])
        .unwrap();

        let request = cli.run_request("gpt-4o-mini");
        assert_eq!(
            request.urls,
            vec!["https://a.com/1", "https://a.com/2", "https://b.com"]
        );
        assert_eq!(request.fields, vec!["title", "price"]);
        assert!(request.mode.extract);
        assert!(request.mode.paginate);
        assert_eq!(request.pagination_guidance, "first 3 pages");
        assert_eq!(cli.output_ceiling(), OutputCeiling::Unbounded);
    }

    #[test]
    fn test_cli_pagination_only() {
        let cli = Cli::try_parse_from([
            "spidermind",
            "--url",
            "https://a.com",
            "--paginate",
            "--no-extract",
            "--max-output-tokens",
            "2000",
            "--pagination-csv-out",
            "pages.csv",
            "--pagination-json-out",
            "pages.json",
        ])
        .unwrap();

        let request = cli.run_request("gpt-4o-mini");
        assert!(!request.mode.extract);
        assert_eq!(cli.output_ceiling(), OutputCeiling::Explicit(2000));
        assert_eq!(
            cli.output_paths().pagination_csv,
            Some(PathBuf::from("pages.csv"))
        );
        assert_eq!(
            cli.output_paths().pagination_json,
            Some(PathBuf::from("pages.json"))
        );
    }

    #[test]
    fn test_cli_requires_url() {
        assert!(Cli::try_parse_from(["spidermind", "--field", "title"]).is_err());
    }

    #[test]
    fn test_sqlite_url() {
        assert_eq!(sqlite_url("scrapes.db"), "sqlite://scrapes.db?mode=rwc");
        assert_eq!(sqlite_url("sqlite::memory:"), "sqlite::memory:");
    }
}
