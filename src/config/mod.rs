//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → InertiaConfig (validated, immutable)
//!     → InertiaBuilder::from_config (reads template & manifest once)
//!     → Inertia
//! ```
//!
//! # Design Decisions
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks
//! - File contents (root template, manifest) are read at configuration time,
//!   never per request

pub mod loader;
pub mod schema;
pub mod validation;

use std::time::Duration;

pub use loader::{load_config, ConfigError};
pub use schema::{InertiaConfig, SsrConfig};
pub use validation::{validate_config, ValidationError};

use crate::error::{Error, Result};
use crate::inertia::{Inertia, InertiaBuilder};
use crate::protocol::SeeOtherMethods;

impl InertiaBuilder {
    /// Seed a builder from configuration. Collaborators (flash provider,
    /// custom renderer, SSR client) can still be added before `build`.
    pub fn from_config(config: &InertiaConfig) -> Result<Self> {
        validate_config(config)
            .map_err(|errors| Error::Configuration(loader::join_errors(&errors)))?;

        let mut builder = match &config.root_template_path {
            Some(path) => InertiaBuilder::from_file(path)?,
            None => InertiaBuilder::new(""),
        };

        if let Some(version) = &config.version {
            builder = builder.version(version.as_str());
        }
        if let Some(url) = &config.asset_url {
            builder = builder.asset_url(url);
        }
        if let Some(path) = &config.manifest_path {
            builder = builder.manifest_file(path)?;
        }
        if config.ssr.enabled {
            builder = builder
                .ssr_url(config.ssr.url.as_str())
                .ssr_timeout(Duration::from_millis(config.ssr.timeout_ms));
        }

        let methods = SeeOtherMethods::parse(config.see_other_methods.as_slice())
            .map_err(|method| Error::Configuration(format!("unknown method {method:?}")))?;

        Ok(builder
            .container_id(config.container_id.as_str())
            .encrypt_history(config.encrypt_history)
            .see_other_methods(methods))
    }
}

impl Inertia {
    pub fn from_config(config: &InertiaConfig) -> Result<Self> {
        InertiaBuilder::from_config(config)?.build()
    }
}
