//! Server-side rendering client.
//!
//! # Responsibilities
//! - POST the page object JSON to the SSR server's `/render` endpoint
//! - Decode `{ head: [..], body: ".." }` into HTML fragments
//! - Bound every call with a timeout
//!
//! # Design Decisions
//! - Every failure is an `SsrError`; the caller logs it and falls back to
//!   client-side rendering

use std::time::Duration;

use axum::http::header;
use serde::Deserialize;
use tokio::time;

use crate::error::SsrError;

/// Fragments returned by the SSR server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SsrFragments {
    /// `<head>` tags joined with newlines.
    pub head: String,
    /// Pre-rendered application markup.
    pub body: String,
}

#[derive(Debug, Deserialize)]
struct SsrResponse {
    #[serde(default)]
    head: Vec<String>,
    #[serde(default)]
    body: String,
}

#[derive(Debug, Clone)]
pub struct SsrClient {
    endpoint: String,
    client: reqwest::Client,
    timeout: Duration,
}

impl SsrClient {
    pub fn new(url: &str, client: reqwest::Client, timeout: Duration) -> Self {
        Self {
            endpoint: render_endpoint(url),
            client,
            timeout,
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub async fn render(&self, page_json: &[u8]) -> Result<SsrFragments, SsrError> {
        let request = self
            .client
            .post(&self.endpoint)
            .header(header::CONTENT_TYPE, "application/json")
            .body(page_json.to_vec())
            .send();

        let response = time::timeout(self.timeout, request)
            .await
            .map_err(|_| SsrError::Timeout(self.timeout.as_millis()))??;

        let status = response.status();
        if !status.is_success() {
            return Err(SsrError::Status(status));
        }

        let decoded: SsrResponse = time::timeout(self.timeout, response.json())
            .await
            .map_err(|_| SsrError::Timeout(self.timeout.as_millis()))??;

        Ok(SsrFragments {
            head: decoded.head.join("\n"),
            body: decoded.body,
        })
    }
}

/// Normalize a configured SSR URL so it always ends in a single `/render`.
pub fn render_endpoint(url: &str) -> String {
    let base = url.replace("/render", "");
    format!("{}/render", base.trim_end_matches('/'))
}
