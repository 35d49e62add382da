//! Server-side Inertia.js protocol adapter for axum.
//!
//! First visits receive the root HTML document with the page object embedded
//! in the container's `data-page` attribute; later client-driven visits
//! (`X-Inertia: true`) receive the page object as JSON.
//!
//! ```ignore
//! let inertia = Inertia::builder(include_str!("app.html")).version("v1").build()?;
//!
//! let app = Router::new()
//!     .route("/", get(home))
//!     .layer(axum::middleware::from_fn_with_state(inertia.clone(), inertia_axum::middleware))
//!     .with_state(inertia);
//!
//! async fn home(inertia: InertiaRequest) -> Result<Response, inertia_axum::Error> {
//!     inertia.render("Home", Props::from([("text", "world")])).await
//! }
//! ```

pub mod config;
pub mod context;
pub mod error;
pub mod extract;
pub mod flash;
pub mod inertia;
pub mod page;
pub mod props;
pub mod protocol;
pub mod render;
pub mod testing;
pub mod version;

mod middleware;
mod shared;

pub use config::{load_config, InertiaConfig};
pub use context::{InertiaContext, InertiaContextExt};
pub use error::{BoxError, Error, FlashError, RenderError, Result, SsrError, TemplateError};
pub use extract::InertiaRequest;
pub use flash::FlashProvider;
pub use inertia::{Inertia, InertiaBuilder};
pub use middleware::{middleware, BufferedResponse};
pub use page::Page;
pub use props::{Prop, PropKind, Props, ProvideProp, ValidationErrors};
pub use protocol::SeeOtherMethods;
pub use render::template::{TemplateRenderer, TemplateValue};
