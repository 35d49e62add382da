//! The adapter handle and its builder.
//!
//! # Responsibilities
//! - Hold immutable settings (version, container id, SSR, flash, redirects)
//! - Own the shared state and the lazily parsed root template
//! - Validate setup once, at construction time
//!
//! # Design Decisions
//! - `Inertia` is an `Arc` handle: cloning is cheap and every clone sees the
//!   same shared state, so it can live in axum router state
//! - The root template is parsed on first use behind a `OnceLock`

use std::fmt;
use std::path::Path;
use std::sync::{Arc, OnceLock};
use std::time::Duration;

use crate::error::{BoxError, Error, Result, TemplateError};
use crate::flash::FlashProvider;
use crate::props::{Prop, Props};
use crate::protocol::SeeOtherMethods;
use crate::render::ssr::SsrClient;
use crate::render::template::{RootTemplate, TemplateFn, TemplateRenderer, TemplateValue};
use crate::shared::{Shared, SharedState};
use crate::version;

pub const DEFAULT_CONTAINER_ID: &str = "app";
pub const DEFAULT_SSR_URL: &str = "http://127.0.0.1:13714";
pub const DEFAULT_SSR_TIMEOUT: Duration = Duration::from_secs(5);

pub(crate) enum RootRenderer {
    Builtin {
        source: String,
        parsed: OnceLock<std::result::Result<RootTemplate, TemplateError>>,
    },
    Custom(Arc<dyn TemplateRenderer>),
}

pub(crate) struct Inner {
    pub(crate) root: RootRenderer,
    pub(crate) version: String,
    pub(crate) container_id: String,
    pub(crate) encrypt_history: bool,
    pub(crate) ssr: Option<SsrClient>,
    pub(crate) flash: Option<Arc<dyn FlashProvider>>,
    pub(crate) see_other: SeeOtherMethods,
    pub(crate) shared: Shared,
}

/// Cheap-to-clone adapter handle.
#[derive(Clone)]
pub struct Inertia {
    pub(crate) inner: Arc<Inner>,
}

impl Inertia {
    pub fn builder(root_html: impl Into<String>) -> InertiaBuilder {
        InertiaBuilder::new(root_html)
    }

    pub fn version(&self) -> &str {
        &self.inner.version
    }

    pub fn container_id(&self) -> &str {
        &self.inner.container_id
    }

    pub fn encrypt_history(&self) -> bool {
        self.inner.encrypt_history
    }

    pub fn ssr_enabled(&self) -> bool {
        self.inner.ssr.is_some()
    }

    pub fn see_other_methods(&self) -> &SeeOtherMethods {
        &self.inner.see_other
    }

    pub(crate) fn flash(&self) -> Option<&dyn FlashProvider> {
        self.inner.flash.as_deref()
    }

    pub(crate) fn shared_snapshot(&self) -> Arc<SharedState> {
        self.inner.shared.snapshot()
    }

    /// Parse the built-in root template on first use.
    pub(crate) fn root_template(&self) -> Result<Option<&RootTemplate>> {
        match &self.inner.root {
            RootRenderer::Custom(_) => Ok(None),
            RootRenderer::Builtin { source, parsed } => {
                match parsed.get_or_init(|| RootTemplate::parse(source)) {
                    Ok(template) => Ok(Some(template)),
                    Err(err) => Err(Error::Configuration(format!("parse root template: {err}"))),
                }
            }
        }
    }

    /// Share a prop with every page rendered by this adapter.
    pub fn share_prop(&self, key: impl Into<String>, prop: impl Into<Prop>) {
        self.inner.shared.share_prop(key.into(), prop.into());
    }

    pub fn shared_props(&self) -> Props {
        self.shared_snapshot().props.clone()
    }

    pub fn shared_prop(&self, key: &str) -> Option<Prop> {
        self.shared_snapshot().props.get(key).cloned()
    }

    pub fn flush_shared_props(&self) {
        self.inner.shared.flush_props();
    }

    /// Share a value with every root template render.
    pub fn share_template_data(&self, key: impl Into<String>, value: impl Into<TemplateValue>) {
        self.inner.shared.share_template_data(key.into(), value.into());
    }

    pub fn flush_shared_template_data(&self) {
        self.inner.shared.flush_template_data();
    }

    /// Register a root template function. It receives the tag's string
    /// arguments and returns raw HTML.
    pub fn share_template_func<F, E>(&self, name: impl Into<String>, func: F)
    where
        F: Fn(&[String]) -> std::result::Result<String, E> + Send + Sync + 'static,
        E: Into<BoxError>,
    {
        let func: TemplateFn =
            Arc::new(move |args: &[String]| func(args).map_err(Into::<BoxError>::into));
        self.inner.shared.share_template_func(name.into(), func);
    }

    pub fn flush_shared_template_funcs(&self) {
        self.inner.shared.flush_template_funcs();
    }
}

impl fmt::Debug for Inertia {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Inertia")
            .field("version", &self.inner.version)
            .field("container_id", &self.inner.container_id)
            .field("encrypt_history", &self.inner.encrypt_history)
            .field("ssr", &self.inner.ssr.as_ref().map(SsrClient::endpoint))
            .field("flash", &self.inner.flash.is_some())
            .finish_non_exhaustive()
    }
}

/// Programmatic adapter setup.
pub struct InertiaBuilder {
    root_html: String,
    version: String,
    container_id: String,
    encrypt_history: bool,
    ssr_url: Option<String>,
    ssr_timeout: Duration,
    ssr_client: Option<reqwest::Client>,
    flash: Option<Arc<dyn FlashProvider>>,
    renderer: Option<Arc<dyn TemplateRenderer>>,
    see_other: SeeOtherMethods,
}

impl InertiaBuilder {
    pub fn new(root_html: impl Into<String>) -> Self {
        Self {
            root_html: root_html.into(),
            version: String::new(),
            container_id: DEFAULT_CONTAINER_ID.to_string(),
            encrypt_history: false,
            ssr_url: None,
            ssr_timeout: DEFAULT_SSR_TIMEOUT,
            ssr_client: None,
            flash: None,
            renderer: None,
            see_other: SeeOtherMethods::default(),
        }
    }

    /// Read the root template from a file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let html = std::fs::read_to_string(path).map_err(|e| {
            Error::Configuration(format!("read root template {}: {e}", path.display()))
        })?;
        Ok(Self::new(html))
    }

    pub fn version(mut self, version: impl Into<String>) -> Self {
        self.version = version.into();
        self
    }

    /// Derive the version from an asset URL.
    pub fn asset_url(mut self, url: &str) -> Self {
        self.version = version::version_from_url(url);
        self
    }

    /// Derive the version from the contents of a build manifest.
    pub fn manifest_file(mut self, path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        self.version = version::version_from_file(path)
            .map_err(|e| Error::Configuration(format!("read manifest {}: {e}", path.display())))?;
        Ok(self)
    }

    pub fn container_id(mut self, id: impl Into<String>) -> Self {
        self.container_id = id.into();
        self
    }

    pub fn encrypt_history(mut self, encrypt: bool) -> Self {
        self.encrypt_history = encrypt;
        self
    }

    /// Enable server-side rendering against this URL.
    pub fn ssr_url(mut self, url: impl Into<String>) -> Self {
        self.ssr_url = Some(url.into());
        self
    }

    pub fn ssr_timeout(mut self, timeout: Duration) -> Self {
        self.ssr_timeout = timeout;
        self
    }

    pub fn ssr_client(mut self, client: reqwest::Client) -> Self {
        self.ssr_client = Some(client);
        self
    }

    pub fn flash_provider(mut self, provider: impl FlashProvider + 'static) -> Self {
        self.flash = Some(Arc::new(provider));
        self
    }

    /// Replace the built-in root template engine.
    pub fn renderer(mut self, renderer: impl TemplateRenderer + 'static) -> Self {
        self.renderer = Some(Arc::new(renderer));
        self
    }

    pub fn see_other_methods(mut self, methods: SeeOtherMethods) -> Self {
        self.see_other = methods;
        self
    }

    pub fn build(self) -> Result<Inertia> {
        let root = match self.renderer {
            Some(renderer) => RootRenderer::Custom(renderer),
            None if self.root_html.trim().is_empty() => {
                return Err(Error::Configuration("blank root template".to_string()));
            }
            None => RootRenderer::Builtin {
                source: self.root_html,
                parsed: OnceLock::new(),
            },
        };

        if self.container_id.trim().is_empty() {
            return Err(Error::Configuration("blank container id".to_string()));
        }

        let ssr = match self.ssr_url {
            Some(raw) => {
                if self.ssr_timeout.is_zero() {
                    return Err(Error::Configuration("ssr timeout must be non-zero".to_string()));
                }
                url::Url::parse(&raw).map_err(|e| {
                    Error::Configuration(format!("invalid ssr url {raw:?}: {e}"))
                })?;
                let client = match self.ssr_client {
                    Some(client) => client,
                    None => reqwest::Client::builder()
                        .build()
                        .map_err(|e| Error::Configuration(format!("build ssr client: {e}")))?,
                };
                Some(SsrClient::new(&raw, client, self.ssr_timeout))
            }
            None => None,
        };

        Ok(Inertia {
            inner: Arc::new(Inner {
                root,
                version: self.version,
                container_id: self.container_id,
                encrypt_history: self.encrypt_history,
                ssr,
                flash: self.flash,
                see_other: self.see_other,
                shared: Shared::new(),
            }),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::template::{TemplateData, TemplateFuncs};
    use serde_json::json;

    struct Static;

    impl TemplateRenderer for Static {
        fn render(
            &self,
            _: &TemplateData,
            _: &TemplateFuncs,
        ) -> std::result::Result<String, BoxError> {
            Ok("<html></html>".to_string())
        }
    }

    #[test]
    fn test_blank_root_template_is_rejected() {
        let err = InertiaBuilder::new("  \n").build().unwrap_err();
        assert!(matches!(err, Error::Configuration(_)));

        assert!(InertiaBuilder::new("").renderer(Static).build().is_ok());
    }

    #[test]
    fn test_builder_validation() {
        assert!(InertiaBuilder::new("x").container_id("").build().is_err());
        assert!(InertiaBuilder::new("x").ssr_url("not a url").build().is_err());
        assert!(InertiaBuilder::new("x")
            .ssr_url("http://127.0.0.1:13714")
            .ssr_timeout(Duration::ZERO)
            .build()
            .is_err());
    }

    #[test]
    fn test_builder_settings() {
        let inertia = InertiaBuilder::new("<html>{{ inertia }}</html>")
            .asset_url("https://cdn.example.com")
            .container_id("root")
            .encrypt_history(true)
            .ssr_url("http://127.0.0.1:13714/render")
            .build()
            .unwrap();

        assert_eq!(inertia.version(), version::version_from_url("https://cdn.example.com"));
        assert_eq!(inertia.container_id(), "root");
        assert!(inertia.encrypt_history());
        assert!(inertia.ssr_enabled());
        assert!(inertia.root_template().unwrap().is_some());
    }

    #[test]
    fn test_invalid_root_template_fails_on_use() {
        let inertia = InertiaBuilder::new("<html>{{ inertia</html>").build().unwrap();
        assert!(matches!(inertia.root_template(), Err(Error::Configuration(_))));
        assert!(matches!(inertia.root_template(), Err(Error::Configuration(_))));
    }

    #[test]
    fn test_shared_accessors() {
        let inertia = InertiaBuilder::new("x").build().unwrap();
        let clone = inertia.clone();

        inertia.share_prop("app", "demo");
        assert_eq!(clone.shared_prop("app").unwrap().resolve().unwrap(), json!("demo"));
        assert_eq!(clone.shared_props().len(), 1);

        clone.flush_shared_props();
        assert!(inertia.shared_prop("app").is_none());

        inertia.share_template_data("title", "Demo");
        inertia.share_template_func("asset", |args: &[String]| {
            Ok::<_, std::fmt::Error>(args.join("/"))
        });
        let snapshot = inertia.shared_snapshot();
        assert!(snapshot.template_data.contains_key("title"));
        assert!(snapshot.template_funcs.contains_key("asset"));

        inertia.flush_shared_template_data();
        inertia.flush_shared_template_funcs();
        let snapshot = inertia.shared_snapshot();
        assert!(snapshot.template_data.is_empty());
        assert!(snapshot.template_funcs.is_empty());
    }
}
