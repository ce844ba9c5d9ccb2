//! Run controller against the SQLite cache.

#![cfg(feature = "sqlite")]

use std::sync::Arc;

use extractor::testing::{test_gateway, MockBackend, MockFetcher};
use extractor::{
    ContentCache, ResultKind, RunController, RunMode, RunRequest, SqliteCache, StaticCredentials,
};
use serde_json::json;

#[tokio::test]
async fn test_run_persists_raw_text_and_results() {
    let cache = Arc::new(SqliteCache::in_memory().await.unwrap());
    let backend = MockBackend::new("openai")
        .with_response(r#"{"listings": [{"title": "Loft"}]}"#)
        .with_response(r#"{"page_urls": ["https://shop.example.com/?p=2"]}"#);

    let controller = RunController::new(
        test_gateway(backend),
        cache.clone(),
        Arc::new(StaticCredentials::new().with_key("OPENAI_API_KEY", "sk-test")),
        Arc::new(MockFetcher::new().with_page("https://shop.example.com/", "# Loft")),
    );

    let report = controller
        .start(RunRequest {
            urls: vec!["https://shop.example.com/".into()],
            fields: vec!["title".into()],
            model_id: "gpt-4o-mini".into(),
            pagination_guidance: String::new(),
            mode: RunMode {
                extract: true,
                paginate: true,
            },
        })
        .await
        .unwrap();

    let key = &report.documents[0].key;
    assert_eq!(cache.read_raw(key).await.unwrap(), Some("# Loft".to_string()));
    assert_eq!(
        cache.read_result(key, ResultKind::Extraction).await.unwrap(),
        Some(json!({"listings": [{"title": "Loft"}]}))
    );
    assert_eq!(
        cache.read_result(key, ResultKind::Pagination).await.unwrap(),
        Some(json!({"page_urls": ["https://shop.example.com/?p=2"]}))
    );
}
