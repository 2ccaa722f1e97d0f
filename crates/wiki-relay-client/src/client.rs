// crates/wiki-relay-client/src/client.rs
// ============================================================================
// Module: Wiki Client
// Description: Typed operations against the wiki REST API.
// Purpose: One HTTP exchange per operation with fail-closed classification.
// Dependencies: wiki-relay-core, reqwest, serde_json, url
// ============================================================================

//! ## Overview
//! [`WikiClient`] issues bounded requests against the wiki REST endpoints and
//! classifies every response into a typed outcome:
//! - `GET {base}/pages/list` lists page paths.
//! - `GET {base}/page?path=..` and `GET {base}/page?pageId=..` read a body.
//! - `POST {base}/page` creates or replaces a page (the backend has no
//!   separate update verb; the last write wins).
//!
//! Backend-reported failures (`ok: false`, missing page, missing body,
//! missing created id) become [`WikiApiError`] variants rather than panics or
//! silent successes. Non-2xx statuses always surface the numeric code.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::io::Read;
use std::time::Duration;

use reqwest::blocking::Client;
use reqwest::blocking::RequestBuilder;
use reqwest::blocking::Response;
use reqwest::header::AUTHORIZATION;
use reqwest::redirect::Policy;
use serde::Serialize;
use serde_json::Map;
use serde_json::Value;
use thiserror::Error;
use url::Url;
use wiki_relay_core::ApiToken;

use crate::config::WikiClientConfig;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Errors constructing the wiki client.
#[derive(Debug, Error)]
pub enum WikiClientError {
    /// Invalid client configuration.
    #[error("invalid client config: {0}")]
    Invalid(String),
    /// Underlying HTTP client could not be built.
    #[error("http client build failed")]
    Build,
}

/// Failure outcomes for a single wiki API exchange.
///
/// # Invariants
/// - `Status` and `WriteRejected` display text always contains the numeric
///   HTTP status code.
/// - `Backend` carries the backend's stated error text verbatim when present.
#[derive(Debug, Error)]
pub enum WikiApiError {
    /// Network or protocol failure before a status was received.
    #[error("request failed: {0}")]
    Transport(String),
    /// Non-2xx response on a read.
    #[error("http status {code}")]
    Status {
        /// Numeric HTTP status code.
        code: u16,
    },
    /// Non-2xx response on a write, with the raw response text.
    #[error("http status {code}: {body}")]
    WriteRejected {
        /// Numeric HTTP status code.
        code: u16,
        /// Raw response body text.
        body: String,
    },
    /// Failure reported by the backend in a 2xx response.
    #[error("{0}")]
    Backend(String),
    /// The requested page does not exist.
    #[error("page does not exist")]
    PageMissing,
    /// The page exists but its body could not be retrieved.
    #[error("page body could not be retrieved")]
    BodyMissing,
    /// Response shape did not match the wiki API contract.
    #[error("malformed response: {0}")]
    Malformed(String),
}

// ============================================================================
// SECTION: Client
// ============================================================================

/// HTTP client for the wiki REST API.
///
/// # Invariants
/// - Redirects are not followed; a redirect surfaces as a status error.
/// - Response bodies are read under `max_response_bytes`.
pub struct WikiClient {
    /// Client configuration, including limits and the grant level.
    config: WikiClientConfig,
    /// Parsed base URL for endpoint construction.
    base: Url,
    /// HTTP client used for outbound requests.
    client: Client,
}

impl WikiClient {
    /// Creates a new wiki client with the given configuration.
    ///
    /// # Errors
    ///
    /// Returns [`WikiClientError`] when the configuration is invalid or the
    /// HTTP client cannot be created.
    pub fn new(config: WikiClientConfig) -> Result<Self, WikiClientError> {
        let base = config.validate()?;
        let client = Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .user_agent(config.user_agent.clone())
            .redirect(Policy::none())
            .build()
            .map_err(|_| WikiClientError::Build)?;
        Ok(Self {
            config,
            base,
            client,
        })
    }

    /// Lists the path of every page known to the wiki.
    ///
    /// A record without a path maps to an empty string rather than an error;
    /// a response without a `pages` list is malformed.
    ///
    /// # Errors
    ///
    /// Returns [`WikiApiError`] when the exchange or classification fails.
    pub fn list_pages(&self, token: &ApiToken) -> Result<Vec<String>, WikiApiError> {
        let value = self.get_json(self.endpoint(&["pages", "list"]), &[], token)?;
        let Some(pages) = value.get("pages").and_then(Value::as_array) else {
            return Err(WikiApiError::Malformed("response lacks a pages list".to_string()));
        };
        Ok(pages
            .iter()
            .map(|record| {
                record.get("path").and_then(Value::as_str).unwrap_or_default().to_string()
            })
            .collect())
    }

    /// Fetches a page body by path.
    ///
    /// # Errors
    ///
    /// Returns [`WikiApiError`] when the exchange or classification fails.
    pub fn page_by_path(&self, path: &str, token: &ApiToken) -> Result<String, WikiApiError> {
        let value = self.get_json(self.endpoint(&["page"]), &[("path", path)], token)?;
        extract_page_body(&value)
    }

    /// Fetches a page body by backend identifier.
    ///
    /// # Errors
    ///
    /// Returns [`WikiApiError`] when the exchange or classification fails.
    pub fn page_by_id(&self, id: &str, token: &ApiToken) -> Result<String, WikiApiError> {
        let value = self.get_json(self.endpoint(&["page"]), &[("pageId", id)], token)?;
        extract_page_body(&value)
    }

    /// Creates or replaces the page at a path and returns the backend id.
    ///
    /// The configured grant level is passed through unmodified. An
    /// unparsable 2xx response body is treated as an empty object, so the
    /// missing-id classification still applies.
    ///
    /// # Errors
    ///
    /// Returns [`WikiApiError`] when the exchange or classification fails.
    pub fn write_page(
        &self,
        path: &str,
        body: &str,
        token: &ApiToken,
    ) -> Result<String, WikiApiError> {
        let payload = WritePageRequest {
            path,
            body,
            grant: self.config.default_grant,
        };
        let response = self
            .authorized(self.client.post(self.endpoint(&["page"])), token)
            .json(&payload)
            .send()
            .map_err(|err| WikiApiError::Transport(err.to_string()))?;
        let status = response.status();
        let raw = read_limited(response, self.config.max_response_bytes)?;
        let raw_text = String::from_utf8_lossy(&raw).into_owned();
        if !status.is_success() {
            return Err(WikiApiError::WriteRejected {
                code: status.as_u16(),
                body: raw_text,
            });
        }
        let value: Value =
            serde_json::from_str(&raw_text).unwrap_or_else(|_| Value::Object(Map::new()));
        if let Some(id) = value.pointer("/page/_id").and_then(Value::as_str) {
            return Ok(id.to_string());
        }
        Err(WikiApiError::Backend(backend_error_text(&value).unwrap_or_else(|| {
            format!("unknown error: {raw_text}")
        })))
    }

    /// Builds an endpoint URL from the base plus path segments.
    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty();
            for segment in segments {
                path.push(segment);
            }
        }
        url
    }

    /// Attaches the bearer credential to a request.
    fn authorized(&self, request: RequestBuilder, token: &ApiToken) -> RequestBuilder {
        request.header(AUTHORIZATION, token.authorization_value())
    }

    /// Issues a GET and decodes the 2xx response body as JSON.
    fn get_json(
        &self,
        url: Url,
        query: &[(&str, &str)],
        token: &ApiToken,
    ) -> Result<Value, WikiApiError> {
        let response = self
            .authorized(self.client.get(url), token)
            .query(query)
            .send()
            .map_err(|err| WikiApiError::Transport(err.to_string()))?;
        let status = response.status();
        if !status.is_success() {
            return Err(WikiApiError::Status {
                code: status.as_u16(),
            });
        }
        let body = read_limited(response, self.config.max_response_bytes)?;
        serde_json::from_slice(&body)
            .map_err(|_| WikiApiError::Malformed("response is not valid json".to_string()))
    }
}

// ============================================================================
// SECTION: Wire Payloads
// ============================================================================

/// JSON payload for page writes.
#[derive(Debug, Serialize)]
struct WritePageRequest<'a> {
    /// Page path.
    path: &'a str,
    /// Page body.
    body: &'a str,
    /// Visibility level passed through unmodified.
    grant: u8,
}

// ============================================================================
// SECTION: Classification Helpers
// ============================================================================

/// Extracts a page body from a read response, classifying failures.
fn extract_page_body(value: &Value) -> Result<String, WikiApiError> {
    if value.get("ok").and_then(Value::as_bool) == Some(false) {
        return Err(WikiApiError::Backend(
            backend_error_text(value).unwrap_or_else(|| "wiki api reported failure".to_string()),
        ));
    }
    let Some(page) = value.get("page").filter(|page| !page.is_null()) else {
        return Err(WikiApiError::PageMissing);
    };
    page.pointer("/revision/body")
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or(WikiApiError::BodyMissing)
}

/// Returns the backend's stated error text when present.
fn backend_error_text(value: &Value) -> Option<String> {
    match value.get("error") {
        Some(Value::String(text)) => Some(text.clone()),
        Some(Value::Null) | None => None,
        Some(other) => Some(other.to_string()),
    }
}

/// Reads the response body while enforcing a byte limit.
fn read_limited(response: Response, max_bytes: usize) -> Result<Vec<u8>, WikiApiError> {
    let limit = u64::try_from(max_bytes).unwrap_or(u64::MAX).saturating_add(1);
    let mut buf = Vec::new();
    response
        .take(limit)
        .read_to_end(&mut buf)
        .map_err(|err| WikiApiError::Transport(err.to_string()))?;
    if buf.len() > max_bytes {
        return Err(WikiApiError::Malformed("response exceeds size limit".to_string()));
    }
    Ok(buf)
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
mod tests {
    #![allow(
        clippy::panic,
        clippy::unwrap_used,
        clippy::expect_used,
        reason = "Test-only panic-based assertions."
    )]

    use serde_json::json;

    use super::WikiApiError;
    use super::backend_error_text;
    use super::extract_page_body;

    #[test]
    fn extract_rejects_ok_false_with_verbatim_error() {
        let value = json!({"ok": false, "error": "forbidden page"});
        let err = extract_page_body(&value).unwrap_err();
        assert_eq!(err.to_string(), "forbidden page");
    }

    #[test]
    fn extract_rejects_ok_false_without_error_text() {
        let value = json!({"ok": false});
        let err = extract_page_body(&value).unwrap_err();
        assert_eq!(err.to_string(), "wiki api reported failure");
    }

    #[test]
    fn extract_treats_null_page_as_missing() {
        let value = json!({"page": null});
        assert!(matches!(extract_page_body(&value).unwrap_err(), WikiApiError::PageMissing));
    }

    #[test]
    fn extract_requires_string_body() {
        let value = json!({"page": {"revision": {"body": 42}}});
        assert!(matches!(extract_page_body(&value).unwrap_err(), WikiApiError::BodyMissing));
        let value = json!({"page": {"revision": {}}});
        assert!(matches!(extract_page_body(&value).unwrap_err(), WikiApiError::BodyMissing));
    }

    #[test]
    fn extract_returns_body_text() {
        let value = json!({"ok": true, "page": {"revision": {"body": "hello"}}});
        assert_eq!(extract_page_body(&value).unwrap(), "hello");
    }

    #[test]
    fn backend_error_text_stringifies_non_string_errors() {
        assert_eq!(backend_error_text(&json!({"error": {"code": 7}})), Some("{\"code\":7}".to_string()));
        assert_eq!(backend_error_text(&json!({"error": null})), None);
        assert_eq!(backend_error_text(&json!({})), None);
    }
}
