//! JSON Repair & Decode — recovers a JSON value from loosely formatted model output.
//!
//! Models sometimes wrap valid JSON in prose or markdown fences. A strict
//! decode is tried first; failing that, the span from the first `{` to the
//! last `}` is decoded on its own.

use serde_json::Value;
use thiserror::Error;

/// The model output could not be decoded even after brace-span repair.
/// Keeps the raw text so operators can inspect it.
#[derive(Debug, Error)]
#[error("Malformed model response: {reason}")]
pub struct MalformedResponseError {
    pub reason: String,
    pub raw: String,
}

pub fn decode_loose_json(text: &str) -> Result<Value, MalformedResponseError> {
    let strict_err = match serde_json::from_str::<Value>(text) {
        Ok(value) => return Ok(value),
        Err(e) => e,
    };

    let malformed = |reason: String| MalformedResponseError {
        reason,
        raw: text.to_string(),
    };

    match brace_span(text) {
        Some(span) => serde_json::from_str(span).map_err(|e| malformed(e.to_string())),
        None => Err(malformed(strict_err.to_string())),
    }
}

/// Slice from the first `{` through the last `}`, if they are in order.
fn brace_span(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    (end > start).then(|| &text[start..=end])
}
