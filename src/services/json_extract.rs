use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("No JSON structure found in response")]
    NoJsonFound,
    #[error("Invalid JSON in response: {0}")]
    Invalid(#[from] serde_json::Error),
}

/// Parses the span from the first `{` to the last `}`. Models occasionally wrap
/// their JSON in prose or markdown fences; anything outside the braces is dropped.
pub fn extract_json(text: &str) -> Result<Value, ExtractError> {
    let result = brace_span(text)
        .ok_or(ExtractError::NoJsonFound)
        .and_then(|span| serde_json::from_str(span).map_err(ExtractError::from));

    if let Err(e) = &result {
        log::error!("JSON extraction failed ({}). Raw output: {}", e, text);
    }
    result
}

fn brace_span(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    (end > start).then(|| &text[start..=end])
}
