//! Inertia middleware.
//!
//! # Responsibilities
//! - Pull pending flash data (validation errors, clear-history) into the
//!   request context
//! - Buffer protocol responses and apply the protocol rules before they
//!   leave the server
//! - Mark every response with `Vary: X-Inertia`
//!
//! # Data Flow
//! ```text
//! request ─► flash → context ─► not X-Inertia? ─► handler ─► Vary ─► client
//!                                   │
//!                                   └─► handler ─► BufferedResponse
//!                                         → version mismatch?  409 to own URL
//!                                         → 200 + empty body?  409 to Referer
//!                                         → 302 + PUT/PATCH/DELETE?  303
//!                                         → flush once ─► Vary ─► client
//! ```
//!
//! Wire it up with `axum::middleware::from_fn_with_state(inertia, middleware)`.

use axum::{
    body::{Body, Bytes},
    extract::State,
    http::{request::Parts, response, HeaderMap, Method, Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use tracing::{debug, error};

use crate::context::{clone_head, InertiaContextExt};
use crate::flash;
use crate::inertia::Inertia;
use crate::protocol::headers;
use crate::render::response::request_url;

/// A handler response held in memory until the protocol rules have run.
#[derive(Debug)]
pub struct BufferedResponse {
    head: response::Parts,
    body: Bytes,
}

impl BufferedResponse {
    /// Drain `response` into memory.
    pub async fn capture(response: Response) -> Result<Self, axum::Error> {
        let (head, body) = response.into_parts();
        let body = axum::body::to_bytes(body, usize::MAX).await?;
        Ok(Self { head, body })
    }

    pub fn status(&self) -> StatusCode {
        self.head.status
    }

    pub fn set_status(&mut self, status: StatusCode) {
        self.head.status = status;
    }

    pub fn is_empty(&self) -> bool {
        self.body.is_empty()
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.head.headers
    }

    pub fn body(&self) -> &Bytes {
        &self.body
    }
}

impl IntoResponse for BufferedResponse {
    fn into_response(self) -> Response {
        Response::from_parts(self.head, Body::from(self.body))
    }
}

pub async fn middleware(
    State(inertia): State<Inertia>,
    req: Request<Body>,
    next: Next,
) -> Response {
    let (mut parts, body) = req.into_parts();
    resolve_flash(&inertia, &mut parts).await;

    if !headers::is_inertia_request(&parts.headers) {
        let response = next.run(Request::from_parts(parts, body)).await;
        return with_vary(response);
    }

    let head = clone_head(&parts);
    let response = next.run(Request::from_parts(parts, body)).await;

    let mut buffered = match BufferedResponse::capture(response).await {
        Ok(buffered) => buffered,
        Err(err) => {
            error!(error = %err, uri = %head.uri, "Failed to buffer Inertia response");
            return with_vary(StatusCode::INTERNAL_SERVER_ERROR.into_response());
        }
    };

    let client_version = headers::version(&head.headers);
    if head.method == Method::GET && client_version != inertia.version() {
        debug!(
            client_version = %client_version,
            server_version = %inertia.version(),
            uri = %head.uri,
            "Asset version changed, forcing a full visit"
        );
        return with_vary(inertia.location(&head, request_url(&head)).await);
    }

    if buffered.status() == StatusCode::OK && buffered.is_empty() {
        if let Some(referer) = headers::referer(&head.headers) {
            debug!(referer = %referer, uri = %head.uri, "Empty Inertia response, redirecting back");
            let mut response = inertia.back(&head).await;
            carry_headers(&mut response, buffered.headers());
            return with_vary(response);
        }
    }

    if buffered.status() == StatusCode::FOUND
        && inertia.see_other_methods().contains(&head.method)
    {
        debug!(method = %head.method, uri = %head.uri, "Rewriting 302 to 303");
        buffered.set_status(StatusCode::SEE_OTHER);
    }

    with_vary(buffered.into_response())
}

async fn resolve_flash(inertia: &Inertia, parts: &mut Parts) {
    let Some(provider) = inertia.flash() else {
        return;
    };

    let (errors, clear_history) = flash::take_pending(provider, parts).await;
    if !errors.is_empty() {
        parts.set_validation_errors(errors);
    }
    if clear_history {
        parts.clear_history();
    }
    parts.inertia_context_mut().mark_flash_resolved();
}

/// Copy handler headers onto a replacement response. Headers the
/// replacement already sets take precedence.
fn carry_headers(response: &mut Response, handler: &HeaderMap) {
    for name in handler.keys() {
        if response.headers().contains_key(name) {
            continue;
        }
        for value in handler.get_all(name) {
            response.headers_mut().append(name.clone(), value.clone());
        }
    }
}

/// Location changes are hard client-side visits and stay free of `Vary`.
fn with_vary(mut response: Response) -> Response {
    if !headers::is_location_change(response.status(), response.headers()) {
        headers::set_vary(response.headers_mut());
    }
    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::header;

    #[tokio::test]
    async fn test_buffered_response_flushes_head_and_body() {
        let response = (StatusCode::FOUND, [(header::LOCATION, "/next")], "moved").into_response();
        let mut buffered = BufferedResponse::capture(response).await.unwrap();
        assert_eq!(buffered.status(), StatusCode::FOUND);
        assert!(!buffered.is_empty());

        buffered.set_status(StatusCode::SEE_OTHER);
        let response = buffered.into_response();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(response.headers()[header::LOCATION], "/next");

        let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&body[..], b"moved");
    }

    #[test]
    fn test_vary_skips_location_changes() {
        let response = with_vary(StatusCode::OK.into_response());
        assert_eq!(response.headers()[header::VARY], "X-Inertia");

        let response = with_vary(crate::render::response::location_change("/"));
        assert!(response.headers().get(header::VARY).is_none());
    }

    #[test]
    fn test_carry_headers_keeps_replacement_values() {
        let mut response = crate::render::response::location_change("/form");
        let mut handler = HeaderMap::new();
        handler.append(header::SET_COOKIE, "a=1".parse().unwrap());
        handler.append(header::SET_COOKIE, "b=2".parse().unwrap());
        handler.insert(headers::X_INERTIA_LOCATION, "/elsewhere".parse().unwrap());

        carry_headers(&mut response, &handler);
        assert_eq!(response.status(), StatusCode::CONFLICT);
        assert_eq!(response.headers()[headers::X_INERTIA_LOCATION], "/form");
        assert_eq!(response.headers().get_all(header::SET_COOKIE).iter().count(), 2);
    }

    #[test]
    fn test_clone_head_keeps_context() {
        let mut req = Request::put("/users/1?x=1")
            .header(headers::X_INERTIA, "true")
            .body(())
            .unwrap();
        req.add_validation_error("name", "required");
        let (parts, ()) = req.into_parts();

        let head = clone_head(&parts);
        assert_eq!(head.method, Method::PUT);
        assert_eq!(head.uri, "/users/1?x=1");
        assert!(headers::is_inertia_request(&head.headers));
        assert_eq!(head.inertia_context().unwrap().validation_errors().len(), 1);
    }
}
