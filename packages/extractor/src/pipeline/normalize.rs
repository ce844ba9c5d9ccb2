//! Turning model output into a JSON mapping.

use llm_client::strip_code_blocks;
use serde_json::{json, Value};
use tracing::debug;

use crate::types::document::ResponsePayload;

/// Key used when model text could not be parsed.
pub const RAW_TEXT_KEY: &str = "raw_text";

/// Normalize a payload into a JSON value.
///
/// Structured values pass through. Text has markdown fences stripped and is
/// parsed as JSON; anything unparseable becomes `{"raw_text": <text>}`.
pub fn normalize(payload: ResponsePayload) -> Value {
    match payload {
        ResponsePayload::Structured(value) => value,
        ResponsePayload::Text(text) => match serde_json::from_str(strip_code_blocks(&text)) {
            Ok(value) => value,
            Err(e) => {
                debug!(error = %e, text_len = text.len(), "Model text is not JSON, keeping raw text");
                json!({ RAW_TEXT_KEY: text })
            }
        },
    }
}
