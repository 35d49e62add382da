//! Flash storage collaborator.
//!
//! Carries validation errors and the clear-history flag across a redirect.
//! The adapter never stores anything itself; applications plug in their
//! session layer through [`FlashProvider`].

use async_trait::async_trait;
use axum::http::request::Parts;

use crate::error::FlashError;
use crate::props::ValidationErrors;

#[async_trait]
pub trait FlashProvider: Send + Sync {
    /// Store validation errors for the next request.
    async fn flash_errors(&self, req: &Parts, errors: ValidationErrors) -> Result<(), FlashError>;

    /// Take the validation errors flashed by the previous request.
    async fn get_errors(&self, req: &Parts) -> Result<ValidationErrors, FlashError>;

    /// Ask the next page to clear the client's history.
    async fn flash_clear_history(&self, req: &Parts) -> Result<(), FlashError>;

    /// Take the clear-history flag flashed by the previous request.
    async fn should_clear_history(&self, req: &Parts) -> Result<bool, FlashError>;
}

/// Pending flash state pulled for one request. Provider failures read as empty.
pub(crate) async fn take_pending(
    provider: &dyn FlashProvider,
    req: &Parts,
) -> (ValidationErrors, bool) {
    let errors = provider.get_errors(req).await.unwrap_or_else(|err| {
        tracing::warn!(error = %err, "Failed to read flashed validation errors");
        ValidationErrors::new()
    });
    let clear_history = provider.should_clear_history(req).await.unwrap_or_else(|err| {
        tracing::warn!(error = %err, "Failed to read flashed clear-history flag");
        false
    });
    (errors, clear_history)
}

/// Persist the request's pending errors and clear-history flag before a redirect.
pub(crate) async fn persist_pending(
    provider: &dyn FlashProvider,
    req: &Parts,
    errors: ValidationErrors,
    clear_history: bool,
) {
    if !errors.is_empty() {
        if let Err(err) = provider.flash_errors(req, errors).await {
            tracing::error!(error = %err, "Failed to flash validation errors");
        }
    }
    if clear_history {
        if let Err(err) = provider.flash_clear_history(req).await {
            tracing::error!(error = %err, "Failed to flash clear-history flag");
        }
    }
}
