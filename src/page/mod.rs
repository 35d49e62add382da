//! Page object assembly.
//!
//! `pipeline` decides which props a request receives and resolves them;
//! `object` is the resulting wire contract.

pub mod object;
pub mod pipeline;

pub use object::Page;
pub use pipeline::{build_page, PageInput, ERRORS_KEY};
