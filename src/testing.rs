//! Assertion helpers for applications testing their Inertia handlers.
//!
//! ```ignore
//! let response = app.oneshot(request).await?;
//! assert_inertia_response(&response);
//! AssertablePage::from_response(response)
//!     .await?
//!     .assert_component("Home")
//!     .assert_prop("text", json!("world"));
//! ```

use std::collections::BTreeMap;
use std::sync::OnceLock;

use axum::http::{header, StatusCode};
use axum::response::Response;
use regex::{Captures, Regex};
use serde_json::{Map, Value};
use thiserror::Error;

use crate::page::Page;
use crate::protocol::headers;

#[derive(Debug, Error)]
pub enum PageParseError {
    #[error("read response body: {0}")]
    Body(#[from] axum::Error),

    #[error("no data-page attribute found in html body")]
    MissingDataPage,

    #[error("decode page object: {0}")]
    Json(#[from] serde_json::Error),
}

fn data_page_pattern() -> Option<&'static Regex> {
    static PATTERN: OnceLock<Option<Regex>> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r#"data-page="([^"]*)""#).ok()).as_ref()
}

fn entity_pattern() -> Option<&'static Regex> {
    static PATTERN: OnceLock<Option<Regex>> = OnceLock::new();
    PATTERN
        .get_or_init(|| Regex::new(r"&(#[0-9]+|#[xX][0-9a-fA-F]+|amp|lt|gt|quot|apos);").ok())
        .as_ref()
}

/// Reverse HTML escaping of attribute values.
pub fn unescape_html(text: &str) -> String {
    let Some(pattern) = entity_pattern() else {
        return text.to_string();
    };
    pattern
        .replace_all(text, |caps: &Captures<'_>| {
            let entity = &caps[1];
            let decoded = match entity {
                "amp" => Some('&'),
                "lt" => Some('<'),
                "gt" => Some('>'),
                "quot" => Some('"'),
                "apos" => Some('\''),
                _ => entity
                    .strip_prefix("#x")
                    .or_else(|| entity.strip_prefix("#X"))
                    .map(|hex| u32::from_str_radix(hex, 16))
                    .unwrap_or_else(|| entity[1..].parse())
                    .ok()
                    .and_then(char::from_u32),
            };
            decoded.map_or_else(|| caps[0].to_string(), String::from)
        })
        .into_owned()
}

/// A decoded page object with chainable assertions.
#[derive(Debug, Clone)]
pub struct AssertablePage {
    page: Page,
}

impl AssertablePage {
    /// Decode a JSON page body, or the `data-page` attribute of an HTML body.
    pub fn from_body(body: &[u8]) -> Result<Self, PageParseError> {
        if let Ok(page) = serde_json::from_slice::<Page>(body) {
            return Ok(Self { page });
        }

        let html = String::from_utf8_lossy(body);
        let raw = data_page_pattern()
            .and_then(|pattern| pattern.captures(&html))
            .and_then(|caps| caps.get(1))
            .ok_or(PageParseError::MissingDataPage)?;
        let page = serde_json::from_str(&unescape_html(raw.as_str()))?;
        Ok(Self { page })
    }

    pub async fn from_response(response: Response) -> Result<Self, PageParseError> {
        let body = axum::body::to_bytes(response.into_body(), usize::MAX).await?;
        Self::from_body(&body)
    }

    pub fn page(&self) -> &Page {
        &self.page
    }

    pub fn props(&self) -> &Map<String, Value> {
        &self.page.props
    }

    #[track_caller]
    pub fn assert_component(&self, component: &str) -> &Self {
        assert_eq!(self.page.component, component, "unexpected component");
        self
    }

    /// Assert the full prop mapping, `errors` included.
    #[track_caller]
    pub fn assert_props(&self, props: &Value) -> &Self {
        assert_eq!(&Value::Object(self.page.props.clone()), props, "unexpected props");
        self
    }

    #[track_caller]
    pub fn assert_prop(&self, key: &str, value: Value) -> &Self {
        assert_eq!(self.page.props.get(key), Some(&value), "unexpected value for prop {key:?}");
        self
    }

    #[track_caller]
    pub fn assert_missing_prop(&self, key: &str) -> &Self {
        assert!(!self.page.props.contains_key(key), "prop {key:?} should be absent");
        self
    }

    #[track_caller]
    pub fn assert_url(&self, url: &str) -> &Self {
        assert_eq!(self.page.url, url, "unexpected url");
        self
    }

    #[track_caller]
    pub fn assert_version(&self, version: &str) -> &Self {
        assert_eq!(self.page.version, version, "unexpected version");
        self
    }

    #[track_caller]
    pub fn assert_encrypt_history(&self, expected: bool) -> &Self {
        assert_eq!(self.page.encrypt_history, expected, "unexpected encryptHistory");
        self
    }

    #[track_caller]
    pub fn assert_clear_history(&self, expected: bool) -> &Self {
        assert_eq!(self.page.clear_history, expected, "unexpected clearHistory");
        self
    }

    /// Groups compare as written; key order inside a group is ignored.
    #[track_caller]
    pub fn assert_deferred_props(&self, expected: &[(&str, &[&str])]) -> &Self {
        let normalize = |groups: BTreeMap<String, Vec<String>>| {
            groups
                .into_iter()
                .map(|(group, mut keys)| {
                    keys.sort();
                    (group, keys)
                })
                .collect::<BTreeMap<_, _>>()
        };
        let expected: BTreeMap<String, Vec<String>> = expected
            .iter()
            .map(|(group, keys)| (group.to_string(), keys.iter().map(|k| k.to_string()).collect()))
            .collect();

        assert_eq!(
            normalize(self.page.deferred_props.clone()),
            normalize(expected),
            "unexpected deferredProps"
        );
        self
    }

    #[track_caller]
    pub fn assert_merge_props(&self, expected: &[&str]) -> &Self {
        let mut actual: Vec<&str> = self.page.merge_props.iter().map(String::as_str).collect();
        let mut expected = expected.to_vec();
        actual.sort_unstable();
        expected.sort_unstable();
        assert_eq!(actual, expected, "unexpected mergeProps");
        self
    }
}

/// Assert a protocol JSON response.
#[track_caller]
pub fn assert_inertia_response(response: &Response) {
    assert_eq!(response.status(), StatusCode::OK, "unexpected status");
    assert!(
        headers::is_inertia_request(response.headers()),
        "missing X-Inertia response header"
    );
    let content_type = response.headers().get(header::CONTENT_TYPE).and_then(|v| v.to_str().ok());
    assert_eq!(content_type, Some("application/json"), "unexpected content type");
}

/// Assert a 409 location change to `url`.
#[track_caller]
pub fn assert_inertia_location(response: &Response, url: &str) {
    assert_eq!(response.status(), StatusCode::CONFLICT, "unexpected status");
    let location = response
        .headers()
        .get(headers::X_INERTIA_LOCATION)
        .and_then(|v| v.to_str().ok());
    assert_eq!(location, Some(url), "unexpected X-Inertia-Location");
}
