//! HTTP utilities for the external services
//!
//! Shared request/response handling for the intent and market clients.

use reqwest::{Client as HttpClient, RequestBuilder};
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;

/// Longest error body kept in an error message
const MAX_ERROR_BODY: usize = 500;

/// Failure talking to one of the external HTTP services
#[derive(Debug, Error)]
pub enum TransportError {
    /// The service answered with a non-success status
    #[error("API error: {0}")]
    ApiError(String),
    /// The request never completed (DNS, TLS, timeout, ...)
    #[error("Network error: {0}")]
    NetworkError(String),
    /// The response body was not the expected JSON
    #[error("JSON error: {0}")]
    JsonError(String),
}

/// Creates an HTTP client with the given request timeout.
///
/// Falls back to a default client if the builder fails.
#[must_use]
pub fn create_http_client(timeout_secs: u64) -> HttpClient {
    HttpClient::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .build()
        .unwrap_or_else(|_| HttpClient::new())
}

/// Sends a POST request with a JSON body and returns the parsed JSON response.
///
/// # Errors
///
/// Returns `TransportError::NetworkError` on connectivity issues,
/// `TransportError::ApiError` on non-success status codes,
/// or `TransportError::JsonError` if parsing fails.
pub async fn send_json_request(
    client: &HttpClient,
    url: &str,
    body: &Value,
    auth_header: Option<&str>,
) -> Result<Value, TransportError> {
    let mut request = client.post(url).json(body);
    if let Some(auth) = auth_header {
        request = request.header("Authorization", auth);
    }
    execute(request).await
}

/// Sends a GET request with query parameters and returns the parsed JSON response.
///
/// # Errors
///
/// Same as [`send_json_request`].
pub async fn get_json(
    client: &HttpClient,
    url: &str,
    query: &[(&str, String)],
    headers: &[(&str, &str)],
) -> Result<Value, TransportError> {
    let mut request = client
        .get(url)
        .query(query)
        .header("Accept", "application/json");
    for (key, value) in headers {
        request = request.header(*key, *value);
    }
    execute(request).await
}

async fn execute(request: RequestBuilder) -> Result<Value, TransportError> {
    let response = request
        .send()
        .await
        .map_err(|e| TransportError::NetworkError(e.to_string()))?;

    let status = response.status();
    if !status.is_success() {
        let error_text = response.text().await.unwrap_or_default();
        return Err(TransportError::ApiError(describe_failure(
            status.as_u16(),
            status.canonical_reason(),
            &error_text,
        )));
    }

    response
        .json()
        .await
        .map_err(|e| TransportError::JsonError(e.to_string()))
}

/// Builds a compact description of a failed response.
///
/// HTML error pages from proxies are not echoed; long bodies are truncated.
#[must_use]
pub fn describe_failure(status: u16, reason: Option<&str>, body: &str) -> String {
    let status = match reason {
        Some(reason) => format!("{status} {reason}"),
        None => status.to_string(),
    };

    let trimmed = body.trim_start();
    let is_html = trimmed.starts_with("<!DOCTYPE")
        || trimmed.starts_with("<html")
        || trimmed.starts_with("<HTML");

    if is_html {
        return format!("{status} (Server returned HTML error page)");
    }
    if body.trim().is_empty() {
        return status;
    }

    let detail = extract_error_message(body).unwrap_or_else(|| body.trim().to_string());
    format!("{status} - {}", truncate(&detail, MAX_ERROR_BODY))
}

/// Pulls the human readable message out of the JSON error shapes both
/// services use (`status.error_message` and `error.message`).
fn extract_error_message(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;
    value
        .pointer("/status/error_message")
        .or_else(|| value.pointer("/error/message"))
        .and_then(Value::as_str)
        .map(ToString::to_string)
}

fn truncate(text: &str, max_bytes: usize) -> String {
    if text.len() <= max_bytes {
        return text.to_string();
    }
    let mut end = max_bytes;
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}... (truncated)", &text[..end])
}
