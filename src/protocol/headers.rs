//! Protocol header codec.
//!
//! # Responsibilities
//! - Detect protocol requests (`X-Inertia`)
//! - Read partial reload and reset key lists
//! - Mark responses as protocol JSON, HTML, or hard location changes
//!
//! # Design Decisions
//! - Key lists are comma separated; blanks and surrounding spaces are dropped
//! - Absent headers read as empty, never as errors

use std::collections::HashSet;

use axum::http::header::{self, HeaderMap, HeaderName, HeaderValue};
use axum::http::StatusCode;

pub const X_INERTIA: HeaderName = HeaderName::from_static("x-inertia");
pub const X_INERTIA_LOCATION: HeaderName = HeaderName::from_static("x-inertia-location");
pub const X_INERTIA_VERSION: HeaderName = HeaderName::from_static("x-inertia-version");
pub const X_INERTIA_PARTIAL_DATA: HeaderName = HeaderName::from_static("x-inertia-partial-data");
pub const X_INERTIA_PARTIAL_EXCEPT: HeaderName =
    HeaderName::from_static("x-inertia-partial-except");
pub const X_INERTIA_PARTIAL_COMPONENT: HeaderName =
    HeaderName::from_static("x-inertia-partial-component");
pub const X_INERTIA_RESET: HeaderName = HeaderName::from_static("x-inertia-reset");

const VARY_VALUE: &str = "X-Inertia";

fn header_str<'a>(headers: &'a HeaderMap, name: &HeaderName) -> Option<&'a str> {
    headers.get(name).and_then(|v| v.to_str().ok())
}

fn key_set(headers: &HeaderMap, name: &HeaderName) -> HashSet<String> {
    header_str(headers, name)
        .map(|raw| {
            raw.split(',')
                .map(str::trim)
                .filter(|key| !key.is_empty())
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

/// Returns true if the request was made by the Inertia client.
pub fn is_inertia_request(headers: &HeaderMap) -> bool {
    headers.get(&X_INERTIA).is_some_and(|v| !v.is_empty())
}

/// Asset version the client currently holds. Empty when absent.
pub fn version(headers: &HeaderMap) -> &str {
    header_str(headers, &X_INERTIA_VERSION).unwrap_or_default()
}

/// Component the partial reload targets, if any.
pub fn partial_component(headers: &HeaderMap) -> Option<&str> {
    header_str(headers, &X_INERTIA_PARTIAL_COMPONENT)
}

/// Keys requested through `X-Inertia-Partial-Data`.
pub fn partial_only(headers: &HeaderMap) -> HashSet<String> {
    key_set(headers, &X_INERTIA_PARTIAL_DATA)
}

/// Keys excluded through `X-Inertia-Partial-Except`.
pub fn partial_except(headers: &HeaderMap) -> HashSet<String> {
    key_set(headers, &X_INERTIA_PARTIAL_EXCEPT)
}

/// Keys the client asked not to merge for this request.
pub fn reset_keys(headers: &HeaderMap) -> HashSet<String> {
    key_set(headers, &X_INERTIA_RESET)
}

pub fn referer(headers: &HeaderMap) -> Option<&str> {
    header_str(headers, &header::REFERER).filter(|r| !r.is_empty())
}

/// Marks a response as a protocol JSON response.
pub fn set_inertia(headers: &mut HeaderMap) {
    headers.insert(X_INERTIA, HeaderValue::from_static("true"));
}

/// Adds `X-Inertia` to `Vary`, keeping any value another layer already set.
pub fn set_vary(headers: &mut HeaderMap) {
    let already = headers
        .get_all(header::VARY)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(','))
        .any(|v| v.trim().eq_ignore_ascii_case(VARY_VALUE));

    if !already {
        headers.append(header::VARY, HeaderValue::from_static(VARY_VALUE));
    }
}

/// Returns true for a hard location change (409 + `X-Inertia-Location`).
pub fn is_location_change(status: StatusCode, headers: &HeaderMap) -> bool {
    status == StatusCode::CONFLICT && headers.contains_key(&X_INERTIA_LOCATION)
}

pub fn set_json_content_type(headers: &mut HeaderMap) {
    headers.insert(header::CONTENT_TYPE, HeaderValue::from_static("application/json"));
}

pub fn set_html_content_type(headers: &mut HeaderMap) {
    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("text/html; charset=utf-8"),
    );
}
