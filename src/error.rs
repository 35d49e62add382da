//! Error taxonomy for the adapter.
//!
//! Fatal errors (`Error`) abort the current render and bubble up to the
//! handler. Non-fatal errors (`SsrError`, `FlashError`) are logged where they
//! occur and never reach the caller.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

/// Boxed error returned by user-supplied prop closures and collaborators.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors surfaced by `Inertia` construction and rendering.
#[derive(Debug, Error)]
pub enum Error {
    /// Invalid setup detected at construction time.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// A prop closure or provider returned an error.
    #[error("resolve prop {key:?}: {source}")]
    PropResolution {
        key: String,
        #[source]
        source: BoxError,
    },

    /// Serializing or assembling the response failed.
    #[error("render: {0}")]
    Render(#[from] RenderError),

    /// The root template could not be parsed or executed.
    #[error("root template: {0}")]
    Template(#[from] TemplateError),
}

/// Result type for adapter operations.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Failures while turning a page object into a response.
#[derive(Debug, Error)]
pub enum RenderError {
    /// Page object could not be encoded as JSON.
    #[error("encode page as json: {0}")]
    Json(#[from] serde_json::Error),
}

/// Root template parse and execution failures.
#[derive(Debug, Error)]
pub enum TemplateError {
    /// A `{{` was never closed.
    #[error("unterminated tag starting at byte {0}")]
    Unterminated(usize),

    /// A tag with no name, e.g. `{{ }}`.
    #[error("empty tag at byte {0}")]
    EmptyTag(usize),

    /// A tag argument was not a quoted string.
    #[error("invalid argument {arg:?} for {name:?}")]
    InvalidArgument { name: String, arg: String },

    /// A tag with arguments referenced an unregistered function.
    #[error("unknown template function {0:?}")]
    UnknownFunction(String),

    /// A registered template function failed.
    #[error("template function {name:?}: {source}")]
    Function {
        name: String,
        #[source]
        source: BoxError,
    },

    /// A custom renderer failed.
    #[error("custom renderer: {0}")]
    Renderer(#[source] BoxError),
}

/// Server-side rendering failures. Never fatal: rendering falls back to the
/// client-side container.
#[derive(Debug, Error)]
pub enum SsrError {
    /// Network or protocol failure talking to the SSR server.
    #[error("ssr request: {0}")]
    Request(#[from] reqwest::Error),

    /// The SSR server did not answer in time.
    #[error("ssr timeout after {0} ms")]
    Timeout(u128),

    /// The SSR server answered with a non-success status.
    #[error("ssr server returned status {0}")]
    Status(StatusCode),
}

/// Flash provider failure. Logged and treated as "nothing flashed".
#[derive(Debug, Error)]
#[error("flash provider: {0}")]
pub struct FlashError(#[source] pub BoxError);

impl FlashError {
    pub fn new(err: impl Into<BoxError>) -> Self {
        Self(err.into())
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        tracing::error!(error = %self, "Inertia render failed");
        (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error").into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::PropResolution {
            key: "user".to_string(),
            source: "db down".into(),
        };
        assert_eq!(err.to_string(), "resolve prop \"user\": db down");

        let err = Error::Configuration("blank root template".to_string());
        assert_eq!(err.to_string(), "configuration error: blank root template");

        let err = SsrError::Status(StatusCode::BAD_GATEWAY);
        assert!(err.to_string().contains("502"));
    }

    #[test]
    fn test_error_into_response_is_500() {
        let response = Error::Configuration("x".into()).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
