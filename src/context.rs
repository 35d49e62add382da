//! Request-scoped Inertia state.
//!
//! Middleware and handlers stash props, template data, validation errors and
//! history flags on the request's extensions; the page pipeline reads them
//! back. A request without any stashed state reads as empty.

use axum::http::{request::Parts, Extensions, Request};
use serde_json::Value;

use crate::props::{Prop, Props, ValidationErrors};
use crate::render::template::{TemplateData, TemplateValue};

/// Per-request state read by the page pipeline.
#[derive(Debug, Clone, Default)]
pub struct InertiaContext {
    props: Props,
    template_data: TemplateData,
    validation_errors: ValidationErrors,
    encrypt_history: Option<bool>,
    clear_history: bool,
    flash_resolved: bool,
}

impl InertiaContext {
    pub fn props(&self) -> &Props {
        &self.props
    }

    pub fn template_data(&self) -> &TemplateData {
        &self.template_data
    }

    pub fn validation_errors(&self) -> &ValidationErrors {
        &self.validation_errors
    }

    /// Per-request override of the adapter's history encryption default.
    pub fn encrypt_history(&self) -> Option<bool> {
        self.encrypt_history
    }

    pub fn clear_history(&self) -> bool {
        self.clear_history
    }

    /// True once the middleware pulled pending flash data into this context.
    pub(crate) fn flash_resolved(&self) -> bool {
        self.flash_resolved
    }

    pub(crate) fn mark_flash_resolved(&mut self) {
        self.flash_resolved = true;
    }
}

/// Accessors for the Inertia context carried in request extensions.
pub trait InertiaContextExt {
    fn inertia_context(&self) -> Option<&InertiaContext>;

    fn inertia_context_mut(&mut self) -> &mut InertiaContext;

    fn set_prop(&mut self, key: impl Into<String>, prop: impl Into<Prop>) {
        self.inertia_context_mut().props.insert(key, prop);
    }

    fn set_props(&mut self, props: Props) {
        self.inertia_context_mut().props.extend(props);
    }

    fn set_template_data(&mut self, key: impl Into<String>, value: impl Into<TemplateValue>) {
        self.inertia_context_mut()
            .template_data
            .insert(key.into(), value.into());
    }

    /// Merge validation errors into the context; later keys win.
    fn set_validation_errors(&mut self, errors: ValidationErrors) {
        self.inertia_context_mut().validation_errors.extend(errors);
    }

    fn add_validation_error(&mut self, key: impl Into<String>, message: impl Into<Value>) {
        self.inertia_context_mut()
            .validation_errors
            .insert(key.into(), message.into());
    }

    fn set_encrypt_history(&mut self, encrypt: bool) {
        self.inertia_context_mut().encrypt_history = Some(encrypt);
    }

    /// Ask the client to clear its history state on the next page.
    fn clear_history(&mut self) {
        self.inertia_context_mut().clear_history = true;
    }
}

impl InertiaContextExt for Extensions {
    fn inertia_context(&self) -> Option<&InertiaContext> {
        self.get::<InertiaContext>()
    }

    fn inertia_context_mut(&mut self) -> &mut InertiaContext {
        self.get_or_insert_default::<InertiaContext>()
    }
}

impl InertiaContextExt for Parts {
    fn inertia_context(&self) -> Option<&InertiaContext> {
        self.extensions.inertia_context()
    }

    fn inertia_context_mut(&mut self) -> &mut InertiaContext {
        self.extensions.inertia_context_mut()
    }
}

impl<B> InertiaContextExt for Request<B> {
    fn inertia_context(&self) -> Option<&InertiaContext> {
        self.extensions().inertia_context()
    }

    fn inertia_context_mut(&mut self) -> &mut InertiaContext {
        self.extensions_mut().inertia_context_mut()
    }
}

/// Copy of a request head, extensions included.
pub(crate) fn clone_head(parts: &Parts) -> Parts {
    let (mut head, ()) = Request::new(()).into_parts();
    head.method = parts.method.clone();
    head.uri = parts.uri.clone();
    head.version = parts.version;
    head.headers = parts.headers.clone();
    head.extensions = parts.extensions.clone();
    head
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use serde_json::json;

    #[test]
    fn test_absent_context_reads_empty() {
        let req = Request::builder().body(Body::empty()).unwrap();
        assert!(req.inertia_context().is_none());
    }

    #[test]
    fn test_context_accumulates() {
        let mut req = Request::builder().body(Body::empty()).unwrap();
        req.set_prop("a", 1);
        req.set_props(Props::from([("b", 2), ("a", 10)]));
        req.add_validation_error("email", "required");
        req.set_validation_errors(ValidationErrors::from_iter([(
            "name".to_string(),
            json!("too short"),
        )]));
        req.set_template_data("title", "Home");
        req.set_encrypt_history(true);
        req.clear_history();

        let ctx = req.inertia_context().unwrap();
        assert_eq!(ctx.props().len(), 2);
        assert_eq!(ctx.props().get("a").unwrap().resolve().unwrap(), json!(10));
        assert_eq!(ctx.validation_errors().len(), 2);
        assert_eq!(ctx.validation_errors()["email"], json!("required"));
        assert!(ctx.template_data().contains_key("title"));
        assert_eq!(ctx.encrypt_history(), Some(true));
        assert!(ctx.clear_history());
        assert!(!ctx.flash_resolved());
    }
}
