//! HTTP helpers shared by the agents client.

use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};

use crate::error::DeskError;

/// Per-request timeout. Runs are polled, so no single call waits on the model.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

/// Build the client a session keeps for its lifetime.
pub fn build_client() -> Result<reqwest::Client, DeskError> {
    Ok(reqwest::Client::builder()
        .timeout(REQUEST_TIMEOUT)
        .pool_max_idle_per_host(4)
        .build()?)
}

/// Build default headers for a Bearer-token API.
///
/// A token that cannot be sent as a header value is an authentication error.
pub fn bearer_headers(token: &str) -> Result<HeaderMap, DeskError> {
    let auth = HeaderValue::from_str(&format!("Bearer {token}")).map_err(|_| {
        DeskError::Authentication("access token contains characters not allowed in a header".into())
    })?;
    let mut headers = HeaderMap::new();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    headers.insert(AUTHORIZATION, auth);
    Ok(headers)
}

/// Map a non-success status and body to an error.
pub fn status_to_error(status: u16, body: &str) -> DeskError {
    let message = extract_error_message(body).unwrap_or_else(|| body.to_string());
    match status {
        401 | 403 => DeskError::Authentication(message),
        429 => DeskError::RateLimited {
            retry_after_ms: extract_retry_after(body),
        },
        _ => DeskError::api(status, message),
    }
}

/// Service errors look like `{"error": {"code": "...", "message": "..."}}`.
fn extract_error_message(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    let error = value.get("error")?;
    let message = error.get("message").and_then(|m| m.as_str())?;
    match error.get("code").and_then(|c| c.as_str()) {
        Some(code) if !code.is_empty() => Some(format!("{code}: {message}")),
        _ => Some(message.to_string()),
    }
}

fn extract_retry_after(body: &str) -> Option<u64> {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| {
            v.get("error")
                .and_then(|e| e.get("retry_after"))
                .and_then(|r| r.as_f64())
                .map(|s| (s * 1000.0) as u64)
        })
}
