//! Render and redirect entry points on [`Inertia`].
//!
//! # Responsibilities
//! - Build the page object for a request and emit it as JSON or HTML
//! - Fall back to the client-side container whenever SSR fails
//! - Protocol-aware redirects that carry validation errors through flash

use axum::body::Body;
use axum::extract::OriginalUri;
use axum::http::{header, request::Parts, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use tracing::{debug, error, warn};

use super::template::TemplateData;
use super::{container_markup, template_data};
use crate::context::InertiaContextExt;
use crate::error::{Error, RenderError, Result, TemplateError};
use crate::flash;
use crate::inertia::{Inertia, RootRenderer};
use crate::page::{build_page, Page, PageInput};
use crate::props::{Props, ValidationErrors};
use crate::protocol::headers;
use crate::render::template::TemplateFuncs;

/// The request URI as the client sees it: path plus query.
///
/// Nested routers strip their prefix from `Parts::uri`, so the router's
/// `OriginalUri` wins when present.
pub(crate) fn request_url(req: &Parts) -> &str {
    let uri = req
        .extensions
        .get::<OriginalUri>()
        .map(|original| &original.0)
        .unwrap_or(&req.uri);
    uri.path_and_query().map(|pq| pq.as_str()).unwrap_or("/")
}

impl Inertia {
    /// Run the prop pipeline for `component` without rendering.
    pub async fn page(&self, req: &Parts, component: &str, props: Props) -> Result<Page> {
        let shared = self.shared_snapshot();
        let context = req.inertia_context();

        let already_resolved = context.is_some_and(|ctx| ctx.flash_resolved());
        let (flashed_errors, flashed_clear_history) = match self.flash() {
            Some(provider) if !already_resolved => flash::take_pending(provider, req).await,
            _ => (ValidationErrors::new(), false),
        };

        build_page(PageInput {
            component,
            url: request_url(req).to_string(),
            version: self.version(),
            headers: &req.headers,
            shared: &shared.props,
            context,
            props,
            flashed_errors,
            flashed_clear_history,
            encrypt_history: self.encrypt_history(),
        })
    }

    /// Render `component` as a JSON page for protocol requests or as the
    /// root HTML document otherwise.
    pub async fn render(&self, req: &Parts, component: &str, props: Props) -> Result<Response> {
        let page = self.page(req, component, props).await?;

        if headers::is_inertia_request(&req.headers) {
            return render_json(&page);
        }
        self.render_html(req, &page).await
    }

    async fn render_html(&self, req: &Parts, page: &Page) -> Result<Response> {
        let page_json = page.to_json().map_err(RenderError::from)?;

        let (inertia, inertia_head) = match &self.inner.ssr {
            Some(ssr) => match ssr.render(page_json.as_bytes()).await {
                Ok(fragments) => (fragments.body, fragments.head),
                Err(err) => {
                    warn!(
                        error = %err,
                        endpoint = %ssr.endpoint(),
                        component = %page.component,
                        "SSR failed, falling back to client-side rendering"
                    );
                    (container_markup(self.container_id(), &page_json), String::new())
                }
            },
            None => (container_markup(self.container_id(), &page_json), String::new()),
        };

        let shared = self.shared_snapshot();
        let data = template_data(
            inertia,
            inertia_head,
            &shared.template_data,
            req.inertia_context().map(|ctx| ctx.template_data()),
        );
        let html = self.render_root(&data, &shared.template_funcs)?;

        let mut response = Response::new(Body::from(html));
        headers::set_html_content_type(response.headers_mut());
        Ok(response)
    }

    fn render_root(&self, data: &TemplateData, funcs: &TemplateFuncs) -> Result<String> {
        match &self.inner.root {
            RootRenderer::Custom(renderer) => renderer
                .render(data, funcs)
                .map_err(|e| Error::Template(TemplateError::Renderer(e))),
            RootRenderer::Builtin { .. } => match self.root_template()? {
                Some(template) => Ok(template.render(data, funcs)?),
                None => Err(Error::Configuration("root template unavailable".to_string())),
            },
        }
    }

    /// Redirect to `url`. Protocol requests receive a 409 location change so
    /// the client performs a full visit.
    pub async fn location(&self, req: &Parts, url: &str) -> Response {
        self.location_with_status(req, url, StatusCode::FOUND).await
    }

    /// [`Inertia::location`] with an explicit status for plain requests.
    pub async fn location_with_status(
        &self,
        req: &Parts,
        url: &str,
        status: StatusCode,
    ) -> Response {
        self.flash_pending(req).await;

        if headers::is_inertia_request(&req.headers) {
            return location_change(url);
        }
        redirect_response(url, status)
    }

    /// Location change back to the referring page, or `/` without a referer.
    pub async fn back(&self, req: &Parts) -> Response {
        self.back_with_status(req, StatusCode::FOUND).await
    }

    pub async fn back_with_status(&self, req: &Parts, status: StatusCode) -> Response {
        let target = headers::referer(&req.headers).unwrap_or("/").to_string();
        self.location_with_status(req, &target, status).await
    }

    /// Plain HTTP redirect, never the 409 location form.
    pub async fn redirect(&self, req: &Parts, url: &str) -> Response {
        self.redirect_with_status(req, url, StatusCode::FOUND).await
    }

    pub async fn redirect_with_status(
        &self,
        req: &Parts,
        url: &str,
        status: StatusCode,
    ) -> Response {
        self.flash_pending(req).await;
        redirect_response(url, status)
    }

    async fn flash_pending(&self, req: &Parts) {
        let Some(provider) = self.flash() else {
            return;
        };
        let (errors, clear_history) = match req.inertia_context() {
            Some(ctx) => (ctx.validation_errors().clone(), ctx.clear_history()),
            None => return,
        };
        flash::persist_pending(provider, req, errors, clear_history).await;
    }
}

fn render_json(page: &Page) -> Result<Response> {
    let body = page.to_json().map_err(RenderError::from)?;
    let mut response = Response::new(Body::from(body));
    headers::set_inertia(response.headers_mut());
    headers::set_json_content_type(response.headers_mut());
    Ok(response)
}

/// 409 with `X-Inertia-Location`. Carries neither `X-Inertia` nor `Vary`.
pub(crate) fn location_change(url: &str) -> Response {
    match HeaderValue::try_from(url) {
        Ok(value) => {
            debug!(location = %url, "Inertia location change");
            (StatusCode::CONFLICT, [(headers::X_INERTIA_LOCATION, value)]).into_response()
        }
        Err(err) => invalid_target(url, err),
    }
}

pub(crate) fn redirect_response(url: &str, status: StatusCode) -> Response {
    match HeaderValue::try_from(url) {
        Ok(value) => (status, [(header::LOCATION, value)]).into_response(),
        Err(err) => invalid_target(url, err),
    }
}

fn invalid_target(url: &str, err: axum::http::header::InvalidHeaderValue) -> Response {
    error!(location = %url, error = %err, "Redirect target is not a valid header value");
    StatusCode::INTERNAL_SERVER_ERROR.into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;

    fn parts(uri: &str) -> Parts {
        Request::get(uri).body(()).unwrap().into_parts().0
    }

    #[test]
    fn test_request_url_keeps_query() {
        assert_eq!(request_url(&parts("/users?page=2")), "/users?page=2");
        assert_eq!(request_url(&parts("/")), "/");
    }

    #[test]
    fn test_request_url_prefers_original_uri() {
        let mut nested = parts("/users?x=1");
        nested
            .extensions
            .insert(OriginalUri("/admin/users?x=1".parse().unwrap()));
        assert_eq!(request_url(&nested), "/admin/users?x=1");
    }

    #[test]
    fn test_location_change_headers() {
        let response = location_change("/login");
        assert_eq!(response.status(), StatusCode::CONFLICT);
        assert_eq!(response.headers()[headers::X_INERTIA_LOCATION], "/login");
        assert!(response.headers().get(headers::X_INERTIA).is_none());
        assert!(response.headers().get(header::VARY).is_none());
    }

    #[test]
    fn test_redirect_response() {
        let response = redirect_response("/home", StatusCode::SEE_OTHER);
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(response.headers()[header::LOCATION], "/home");

        let response = redirect_response("/bad\nurl", StatusCode::FOUND);
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
