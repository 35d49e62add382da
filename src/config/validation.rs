//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (timeouts > 0, non-blank ids)
//! - Detect conflicting version sources
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: InertiaConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use thiserror::Error;

use crate::config::schema::InertiaConfig;
use crate::protocol::SeeOtherMethods;

/// A single semantic problem with a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("container_id must not be blank")]
    BlankContainerId,

    #[error("ssr.timeout_ms must be greater than zero")]
    ZeroSsrTimeout,

    #[error("ssr.url {url:?} is not a valid URL: {reason}")]
    InvalidSsrUrl { url: String, reason: String },

    #[error("see_other_methods contains unknown method {0:?}")]
    UnknownMethod(String),

    #[error("only one of version, asset_url and manifest_path may be set")]
    ConflictingVersionSources,
}

pub fn validate_config(config: &InertiaConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.container_id.trim().is_empty() {
        errors.push(ValidationError::BlankContainerId);
    }

    if config.ssr.enabled {
        if config.ssr.timeout_ms == 0 {
            errors.push(ValidationError::ZeroSsrTimeout);
        }
        if let Err(e) = url::Url::parse(&config.ssr.url) {
            errors.push(ValidationError::InvalidSsrUrl {
                url: config.ssr.url.clone(),
                reason: e.to_string(),
            });
        }
    }

    if let Err(method) = SeeOtherMethods::parse(config.see_other_methods.as_slice()) {
        errors.push(ValidationError::UnknownMethod(method));
    }

    let version_sources = [
        config.version.is_some(),
        config.asset_url.is_some(),
        config.manifest_path.is_some(),
    ];
    if version_sources.iter().filter(|set| **set).count() > 1 {
        errors.push(ValidationError::ConflictingVersionSources);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_default_config_is_valid() {
        assert!(validate_config(&InertiaConfig::default()).is_ok());
    }

    #[test]
    fn test_reports_every_error() {
        let mut config = InertiaConfig::default();
        config.container_id = " ".to_string();
        config.ssr.enabled = true;
        config.ssr.timeout_ms = 0;
        config.ssr.url = "not a url".to_string();
        config.see_other_methods = vec!["PUT".to_string(), "YEET ".to_string()];
        config.version = Some("v1".to_string());
        config.manifest_path = Some(PathBuf::from("manifest.json"));

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 5);
        assert!(errors.contains(&ValidationError::BlankContainerId));
        assert!(errors.contains(&ValidationError::ZeroSsrTimeout));
        assert!(errors.contains(&ValidationError::ConflictingVersionSources));
        assert!(errors
            .iter()
            .any(|e| matches!(e, ValidationError::InvalidSsrUrl { .. })));
    }

    #[test]
    fn test_ssr_settings_ignored_when_disabled() {
        let mut config = InertiaConfig::default();
        config.ssr.timeout_ms = 0;
        config.ssr.url = String::new();
        assert!(validate_config(&config).is_ok());
    }
}
