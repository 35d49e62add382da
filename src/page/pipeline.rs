//! Prop resolution and partial reloads.
//!
//! # Data Flow
//! ```text
//! errors (always) → shared props → context props → handler props
//!     → deferred manifest (full loads, pre-filter)
//!     → partial filter (only / except) or first-load filter
//!     → merge manifest (minus reset keys)
//!     → resolve every surviving prop
//! ```
//!
//! # Design Decisions
//! - On a partial reload `Always` props survive the `only` list but never the
//!   `except` list
//! - A reload is partial only when the partial-component header names the
//!   component being rendered
//! - Props are walked in key order so both manifests are deterministic
//! - A single failing prop aborts the whole page

use std::collections::{BTreeMap, HashSet};

use axum::http::HeaderMap;
use serde_json::{Map, Value};

use crate::context::InertiaContext;
use crate::error::{Error, Result};
use crate::page::Page;
use crate::props::{Prop, Props, ValidationErrors};
use crate::protocol::headers;

/// Reserved key carrying validation errors.
pub const ERRORS_KEY: &str = "errors";

/// Everything the pipeline needs to assemble one page.
pub struct PageInput<'a> {
    pub component: &'a str,
    pub url: String,
    pub version: &'a str,
    pub headers: &'a HeaderMap,
    pub shared: &'a Props,
    pub context: Option<&'a InertiaContext>,
    pub props: Props,
    /// Validation errors recovered from flash storage. Context errors win.
    pub flashed_errors: ValidationErrors,
    /// Clear-history flag recovered from flash storage.
    pub flashed_clear_history: bool,
    /// Adapter-wide history encryption default.
    pub encrypt_history: bool,
}

/// Partial reload parameters read from the request.
#[derive(Debug, Default)]
struct Partial {
    only: HashSet<String>,
    except: HashSet<String>,
}

impl Partial {
    fn from_request(headers: &HeaderMap, component: &str) -> Option<Self> {
        if headers::partial_component(headers) != Some(component) {
            return None;
        }
        Some(Self {
            only: headers::partial_only(headers),
            except: headers::partial_except(headers),
        })
    }

    fn keeps(&self, key: &str, prop: &Prop) -> bool {
        if self.except.contains(key) {
            return false;
        }
        self.only.is_empty() || self.only.contains(key) || prop.is_always()
    }
}

pub fn build_page(input: PageInput<'_>) -> Result<Page> {
    let PageInput {
        component,
        url,
        version,
        headers: request_headers,
        shared,
        context,
        props,
        flashed_errors,
        flashed_clear_history,
        encrypt_history,
    } = input;

    let mut errors = flashed_errors;
    if let Some(ctx) = context {
        errors.extend(ctx.validation_errors().clone());
    }

    let mut bag = Props::new().with(ERRORS_KEY, Prop::value(Value::Object(errors)).always());
    bag.extend(shared.clone());
    if let Some(ctx) = context {
        bag.extend(ctx.props().clone());
    }
    bag.extend(props);

    let ordered: BTreeMap<String, Prop> = bag.into_iter().collect();
    let partial = Partial::from_request(request_headers, component);

    let mut deferred_props: BTreeMap<String, Vec<String>> = BTreeMap::new();
    if partial.is_none() {
        for (key, prop) in &ordered {
            if let Some(group) = prop.deferred_group() {
                deferred_props
                    .entry(group.to_string())
                    .or_default()
                    .push(key.clone());
            }
        }
    }

    let surviving: Vec<(String, Prop)> = ordered
        .into_iter()
        .filter(|(key, prop)| match &partial {
            Some(partial) => partial.keeps(key, prop),
            None => !prop.ignore_on_first_load(),
        })
        .collect();

    let reset = headers::reset_keys(request_headers);
    let merge_props: Vec<String> = surviving
        .iter()
        .filter(|(key, prop)| prop.should_merge() && !reset.contains(key))
        .map(|(key, _)| key.clone())
        .collect();

    let mut resolved = Map::new();
    for (key, prop) in surviving {
        let value = prop
            .resolve()
            .map_err(|source| Error::PropResolution {
                key: key.clone(),
                source,
            })?;
        resolved.insert(key, value);
    }

    let encrypt_history = context
        .and_then(InertiaContext::encrypt_history)
        .unwrap_or(encrypt_history);
    let clear_history = context.is_some_and(InertiaContext::clear_history) || flashed_clear_history;

    Ok(Page {
        component: component.to_string(),
        props: resolved,
        url,
        version: version.to_string(),
        encrypt_history,
        clear_history,
        deferred_props,
        merge_props,
    })
}
