//! Normalization and parsing of raw model output.
//!
//! Gemini is told to return bare JSON but routinely wraps it in a markdown
//! fence anyway. This is the single place that rule is handled; every
//! operation goes through `parse_model_json`.

use serde_json::Value;

use crate::error::CoreError;

/// Parse model output as JSON, tolerating a surrounding code fence.
///
/// If the trimmed text starts with a fence marker, the first and last lines
/// are dropped and everything between them is kept verbatim. Anything that
/// still fails to parse is a [`CoreError::MalformedResponse`].
pub fn parse_model_json(text: &str) -> Result<Value, CoreError> {
    let trimmed = text.trim();

    let cleaned = if trimmed.starts_with("```") {
        let lines: Vec<&str> = trimmed.lines().collect();
        if lines.len() > 2 {
            lines[1..lines.len() - 1].join("\n")
        } else {
            String::new()
        }
    } else {
        trimmed.to_string()
    };

    serde_json::from_str(&cleaned).map_err(|e| CoreError::MalformedResponse(e.to_string()))
}
