//! Shared API error response parsing.
//!
//! Collaborator services wrap errors in slightly different JSON envelopes.
//! This module extracts a message and error code from the common shapes so
//! the HTTP clients can classify failures uniformly.

use serde_json::Value;

/// Longest slice of a raw body echoed back in fallback messages.
const RAW_BODY_LIMIT: usize = 160;

/// Parsed error information from an API error response.
#[derive(Debug, Clone)]
pub(crate) struct ApiErrorInfo {
    /// Human-readable error message.
    pub message: String,
    /// Service-specific error code, if present.
    pub code: Option<String>,
    /// Whether the error is retryable based on the status code.
    pub retryable: bool,
}

/// Parse an error response body, falling back to a snippet of the raw text
/// when no known envelope matches.
pub(crate) fn parse_api_error(body: &str, status: u16) -> ApiErrorInfo {
    let envelope = serde_json::from_str::<Value>(body)
        .ok()
        .as_ref()
        .and_then(extract_envelope);
    let (message, code) = match envelope {
        Some(parsed) => parsed,
        None => (format!("HTTP {status}: {}", snippet(body)), None),
    };
    ApiErrorInfo {
        message,
        code,
        retryable: status == 429 || status >= 500,
    }
}

/// Pull a message and code out of the envelope shapes the services use:
/// `{"error": {"message", "type"|"code"}}`, `{"detail", "code"}` and
/// `{"message", "code"}`.
fn extract_envelope(value: &Value) -> Option<(String, Option<String>)> {
    let fields = value.get("error").unwrap_or(value);
    let message = fields
        .get("message")
        .or_else(|| fields.get("detail"))
        .and_then(Value::as_str)?;
    let code = fields
        .get("type")
        .or_else(|| fields.get("code"))
        .and_then(Value::as_str)
        .map(str::to_owned);
    Some((message.to_owned(), code))
}

fn snippet(body: &str) -> String {
    if body.chars().count() <= RAW_BODY_LIMIT {
        return body.to_owned();
    }
    let cut: String = body.chars().take(RAW_BODY_LIMIT).collect();
    format!("{cut}...")
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
