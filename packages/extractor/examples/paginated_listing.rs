//! Paginated listing walkthrough.
//!
//! Discovers the page URLs of a listing, then extracts records from every
//! page it found. Uses the real HTTP fetcher and whichever API key the chosen
//! model needs (e.g. `OPENAI_API_KEY`).
//!
//! ```bash
//! cargo run --example paginated_listing -- https://books.toscrape.com/ title price
//! ```

use std::sync::Arc;

use extractor::export::{extraction_rows, to_csv};
use extractor::{
    page_urls, EnvCredentials, HttpFetcher, MemoryCache, ModelCatalog, ModelGateway, RunController,
    RunMode, RunRequest,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mut args = std::env::args().skip(1);
    let start_url = args.next().ok_or("usage: paginated_listing <url> <field>...")?;
    let fields: Vec<String> = args.collect();

    let gateway = Arc::new(ModelGateway::with_default_backends(
        ModelCatalog::default(),
        reqwest::Client::new(),
    ));
    let controller = RunController::new(
        gateway,
        Arc::new(MemoryCache::new()),
        Arc::new(EnvCredentials),
        Arc::new(HttpFetcher::new()?),
    );

    let discovery = controller
        .start(RunRequest {
            urls: vec![start_url.clone()],
            model_id: "gpt-4o-mini".to_string(),
            mode: RunMode {
                extract: false,
                paginate: true,
            },
            ..Default::default()
        })
        .await?;

    let mut pages: Vec<String> = discovery
        .pagination
        .iter()
        .flat_map(|batch| batch.results.iter())
        .flat_map(|r| page_urls(&r.pagination_data))
        .collect();
    if pages.is_empty() {
        pages.push(start_url);
    }
    println!("Found {} pages", pages.len());

    let report = controller
        .start(RunRequest {
            urls: pages,
            fields: fields.clone(),
            model_id: "gpt-4o-mini".to_string(),
            ..Default::default()
        })
        .await?;

    if let Some(extraction) = &report.extraction {
        let preferred: Vec<&str> = fields.iter().map(String::as_str).collect();
        print!("{}", to_csv(&extraction_rows(&extraction.results), &preferred));
    }
    println!(
        "Tokens in/out: {}/{}  cost: ${}",
        discovery.input_tokens + report.input_tokens,
        discovery.output_tokens + report.output_tokens,
        discovery.cost + report.cost
    );

    Ok(())
}
