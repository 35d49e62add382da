//! Configuration schema definitions.
//!
//! All types derive Serde traits for deserialization from TOML files.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::inertia::{DEFAULT_CONTAINER_ID, DEFAULT_SSR_URL};

/// Root adapter configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct InertiaConfig {
    /// File holding the root HTML template.
    pub root_template_path: Option<PathBuf>,

    /// Explicit asset version.
    pub version: Option<String>,

    /// Derive the version from this asset URL.
    pub asset_url: Option<String>,

    /// Derive the version from the contents of this build manifest.
    pub manifest_path: Option<PathBuf>,

    /// `id` of the client-side mount element.
    pub container_id: String,

    /// Default for the page object's `encryptHistory`.
    pub encrypt_history: bool,

    /// Server-side rendering settings.
    pub ssr: SsrConfig,

    /// Methods whose 302 responses are rewritten to 303.
    pub see_other_methods: Vec<String>,
}

impl Default for InertiaConfig {
    fn default() -> Self {
        Self {
            root_template_path: None,
            version: None,
            asset_url: None,
            manifest_path: None,
            container_id: DEFAULT_CONTAINER_ID.to_string(),
            encrypt_history: false,
            ssr: SsrConfig::default(),
            see_other_methods: vec!["PUT".to_string(), "PATCH".to_string(), "DELETE".to_string()],
        }
    }
}

/// Server-side rendering configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SsrConfig {
    pub enabled: bool,

    /// SSR server base URL; `/render` is appended.
    pub url: String,

    /// Per-call timeout in milliseconds.
    pub timeout_ms: u64,
}

impl Default for SsrConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            url: DEFAULT_SSR_URL.to_string(),
            timeout_ms: 5000,
        }
    }
}
