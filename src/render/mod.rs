//! Response rendering.
//!
//! # Data Flow
//! ```text
//! Page
//!     → protocol request: JSON body, X-Inertia: true
//!     → plain request:   ssr.rs (optional) or container markup
//!                        → template data (inertia, inertiaHead, shared, context)
//!                        → root template → HTML body
//! ```

pub mod response;
pub mod ssr;
pub mod template;

use template::{escape_html, TemplateData, TemplateValue};

/// Template key holding the page container (or SSR body).
pub const INERTIA_KEY: &str = "inertia";
/// Template key holding SSR head tags.
pub const INERTIA_HEAD_KEY: &str = "inertiaHead";

/// Client-side mount point carrying the page object.
pub fn container_markup(container_id: &str, page_json: &str) -> String {
    format!(
        "<div id=\"{}\" data-page=\"{}\"></div>",
        escape_html(container_id),
        escape_html(page_json)
    )
}

/// Assemble root template data. Shared data overrides the defaults and
/// request data overrides both.
pub(crate) fn template_data(
    inertia: String,
    inertia_head: String,
    shared: &TemplateData,
    request: Option<&TemplateData>,
) -> TemplateData {
    let mut data = TemplateData::new();
    data.insert(INERTIA_KEY.to_string(), TemplateValue::Html(inertia));
    data.insert(INERTIA_HEAD_KEY.to_string(), TemplateValue::Html(inertia_head));
    data.extend(shared.iter().map(|(k, v)| (k.clone(), v.clone())));
    if let Some(request) = request {
        data.extend(request.iter().map(|(k, v)| (k.clone(), v.clone())));
    }
    data
}
