//! Page fetching trait.

use async_trait::async_trait;

/// Turns a URL into page text.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// Page text as markdown.
    ///
    /// Failures are logged by the implementation and yield an empty string.
    async fn fetch_text(&self, url: &str) -> String;
}
