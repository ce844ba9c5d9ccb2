//! Read-through page fetching into the content cache.

use chrono::{DateTime, Duration, Utc};
use regex::Regex;
use std::sync::OnceLock;
use tracing::{debug, info};

use crate::error::Result;
use crate::traits::fetcher::PageFetcher;
use crate::traits::store::ContentCache;
use crate::types::document::SourceDocument;

fn non_word() -> &'static Regex {
    static NON_WORD: OnceLock<Regex> = OnceLock::new();
    NON_WORD.get_or_init(|| Regex::new(r"\W+").expect("static regex is valid"))
}

/// Unique key for a URL fetched at `at`.
///
/// `<host>_<YYYY_MM_DD__HH_MM_SS_ffffff>` with runs of non-word characters in
/// the host replaced by `_`.
pub fn unique_key(url: &str, at: DateTime<Utc>) -> String {
    let after_scheme = url.rsplit("//").next().unwrap_or(url);
    let host = after_scheme.split('/').next().unwrap_or(after_scheme);
    let host = non_word().replace_all(host, "_");
    format!("{}_{}", host, at.format("%Y_%m_%d__%H_%M_%S_%6f"))
}

/// Key every URL, reuse cached text when present, otherwise fetch and store.
///
/// The URL at position `i` is keyed at `now + i` microseconds, so URLs sharing
/// a host still get distinct keys. Documents come back in input order. Text may be empty when a fetch failed;
/// orchestrators skip those.
pub async fn fetch_and_store(
    urls: &[String],
    now: DateTime<Utc>,
    fetcher: &dyn PageFetcher,
    cache: &dyn ContentCache,
) -> Result<Vec<SourceDocument>> {
    let mut documents = Vec::with_capacity(urls.len());

    for (index, url) in urls.iter().enumerate() {
        let key = unique_key(url, now + Duration::microseconds(index as i64));

        let raw_text = match cache.read_raw(&key).await? {
            Some(text) => {
                debug!(url = %url, key = %key, "Reusing cached page text");
                text
            }
            None => {
                let text = fetcher.fetch_text(url).await;
                cache.write_raw(&key, url, &text).await?;
                info!(url = %url, key = %key, chars = text.len(), "Stored page text");
                text
            }
        };

        documents.push(SourceDocument::new(key, url.clone(), raw_text));
    }

    Ok(documents)
}
