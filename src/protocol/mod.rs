//! Inertia wire protocol.
//!
//! # Data Flow
//! ```text
//! Request headers
//!     → headers.rs (X-Inertia, version, partial reload keys, reset, Referer)
//!     → page pipeline / middleware decisions
//!
//! Response
//!     ← headers.rs (X-Inertia, X-Inertia-Location, Vary, Content-Type)
//!     ← redirect.rs (302 → 303 downgrade policy)
//! ```

pub mod headers;
pub mod redirect;

pub use headers::{
    X_INERTIA, X_INERTIA_LOCATION, X_INERTIA_PARTIAL_COMPONENT, X_INERTIA_PARTIAL_DATA,
    X_INERTIA_PARTIAL_EXCEPT, X_INERTIA_RESET, X_INERTIA_VERSION,
};
pub use redirect::SeeOtherMethods;
