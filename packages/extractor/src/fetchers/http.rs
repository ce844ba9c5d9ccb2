//! HTTP page fetcher: reqwest + scraper + htmd.
//!
//! Limitations:
//! - No JavaScript rendering (static HTML only)
//! - No robots.txt or politeness handling

use async_trait::async_trait;
use scraper::{Html, Selector};
use std::time::Duration;
use tracing::{debug, warn};

use crate::error::{ExtractionError, Result};
use crate::traits::fetcher::PageFetcher;

const USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Areas most likely to hold the listing itself.
const MAIN_SELECTORS: &[&str] = &[
    "main",
    "article",
    "[role='main']",
    "#content",
    "#main",
    ".content",
    ".main",
];

/// Elements that never carry listing text. Navigation and footers stay
/// because pagination links usually live there.
const UNWANTED_SELECTORS: &[&str] = &[
    "script", "style", "noscript", "iframe", "header", "aside", ".advertisement", ".ads",
];

/// Fetches pages over plain HTTP and converts them to markdown.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    /// Fetcher with a browser-like user agent and a 30s timeout.
    pub fn new() -> Result<Self> {
        let mut headers = reqwest::header::HeaderMap::new();
        headers.insert(
            reqwest::header::ACCEPT,
            reqwest::header::HeaderValue::from_static(
                "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8",
            ),
        );
        headers.insert(
            reqwest::header::ACCEPT_LANGUAGE,
            reqwest::header::HeaderValue::from_static("en-US,en;q=0.5"),
        );

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .user_agent(USER_AGENT)
            .default_headers(headers)
            .redirect(reqwest::redirect::Policy::limited(5))
            .build()
            .map_err(ExtractionError::HttpClient)?;

        Ok(Self { client })
    }

    /// Use an existing HTTP client.
    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }

    async fn fetch_html(&self, url: &str) -> std::result::Result<String, String> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| e.to_string())?;

        let status = response.status();
        if !status.is_success() {
            return Err(format!("HTTP {}", status));
        }

        response.text().await.map_err(|e| e.to_string())
    }

    /// Main content HTML, falling back to the body and then the whole document.
    fn extract_main_content(document: &Html) -> String {
        for selector_str in MAIN_SELECTORS {
            if let Ok(selector) = Selector::parse(selector_str) {
                if let Some(main) = document.select(&selector).next() {
                    return main.html();
                }
            }
        }

        if let Ok(body_selector) = Selector::parse("body") {
            if let Some(body) = document.select(&body_selector).next() {
                return body.html();
            }
        }

        document.html()
    }

    fn remove_boilerplate(html: &str) -> String {
        let fragment = Html::parse_fragment(html);
        let mut result = html.to_string();
        for selector_str in UNWANTED_SELECTORS {
            if let Ok(selector) = Selector::parse(selector_str) {
                for element in fragment.select(&selector) {
                    result = result.replace(&element.html(), "");
                }
            }
        }
        result
    }

    /// HTML document to markdown.
    pub fn html_to_markdown(html: &str) -> String {
        let document = Html::parse_document(html);
        let content = Self::remove_boilerplate(&Self::extract_main_content(&document));

        htmd::convert(&content).unwrap_or_else(|_| {
            let fallback = Html::parse_fragment(&content);
            fallback.root_element().text().collect::<String>()
        })
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    async fn fetch_text(&self, url: &str) -> String {
        match self.fetch_html(url).await {
            Ok(html) => {
                let markdown = Self::html_to_markdown(&html);
                debug!(url = %url, html_len = html.len(), markdown_len = markdown.len(), "Fetched page");
                markdown
            }
            Err(error) => {
                warn!(url = %url, error = %error, "Page fetch failed");
                String::new()
            }
        }
    }
}
