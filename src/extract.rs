//! Handler-side extractor.

use std::convert::Infallible;

use axum::extract::{FromRef, FromRequestParts};
use axum::http::request::Parts;
use axum::response::Response;

use crate::context::{clone_head, InertiaContext, InertiaContextExt};
use crate::error::Result;
use crate::inertia::Inertia;
use crate::page::Page;
use crate::props::Props;
use crate::protocol::headers;

/// The adapter plus the current request head.
///
/// ```ignore
/// async fn home(inertia: InertiaRequest) -> Result<Response, inertia_axum::Error> {
///     inertia.render("Home", Props::from([("text", "world")])).await
/// }
/// ```
///
/// Context writes made through this extractor are visible to its own
/// `render` call.
pub struct InertiaRequest {
    inertia: Inertia,
    parts: Parts,
}

impl<S> FromRequestParts<S> for InertiaRequest
where
    Inertia: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &S,
    ) -> std::result::Result<Self, Self::Rejection> {
        Ok(Self {
            inertia: Inertia::from_ref(state),
            parts: clone_head(parts),
        })
    }
}

impl InertiaRequest {
    pub fn new(inertia: Inertia, parts: Parts) -> Self {
        Self { inertia, parts }
    }

    pub fn inertia(&self) -> &Inertia {
        &self.inertia
    }

    pub fn parts(&self) -> &Parts {
        &self.parts
    }

    pub fn is_inertia(&self) -> bool {
        headers::is_inertia_request(&self.parts.headers)
    }

    pub async fn page(&self, component: &str, props: Props) -> Result<Page> {
        self.inertia.page(&self.parts, component, props).await
    }

    pub async fn render(&self, component: &str, props: Props) -> Result<Response> {
        self.inertia.render(&self.parts, component, props).await
    }

    pub async fn location(&self, url: &str) -> Response {
        self.inertia.location(&self.parts, url).await
    }

    pub async fn back(&self) -> Response {
        self.inertia.back(&self.parts).await
    }

    pub async fn redirect(&self, url: &str) -> Response {
        self.inertia.redirect(&self.parts, url).await
    }
}

impl InertiaContextExt for InertiaRequest {
    fn inertia_context(&self) -> Option<&InertiaContext> {
        self.parts.inertia_context()
    }

    fn inertia_context_mut(&mut self) -> &mut InertiaContext {
        self.parts.inertia_context_mut()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inertia::InertiaBuilder;
    use axum::http::{Request, StatusCode};
    use serde_json::json;

    #[derive(Clone)]
    struct AppState {
        inertia: Inertia,
    }

    impl FromRef<AppState> for Inertia {
        fn from_ref(state: &AppState) -> Self {
            state.inertia.clone()
        }
    }

    #[tokio::test]
    async fn test_extracts_from_app_state() {
        let state = AppState {
            inertia: InertiaBuilder::new("<html>{{ inertia }}</html>")
                .version("v1")
                .build()
                .unwrap(),
        };
        let (mut parts, ()) = Request::get("/home")
            .header(headers::X_INERTIA, "true")
            .body(())
            .unwrap()
            .into_parts();

        let mut req = InertiaRequest::from_request_parts(&mut parts, &state).await.unwrap();
        assert!(req.is_inertia());

        req.set_prop("user", "ada");
        let page = req.page("Home", Props::new()).await.unwrap();
        assert_eq!(page.props["user"], json!("ada"));
        assert_eq!(page.version, "v1");

        let response = req.location("/login").await;
        assert_eq!(response.status(), StatusCode::CONFLICT);
    }
}
