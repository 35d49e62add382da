//! Redirect status policy.
//!
//! The client follows redirects with the original method unless it receives
//! a 303, so mutating methods answered with 302 are downgraded to 303. Which
//! methods qualify changed across protocol revisions (POST was dropped in the
//! later ones), so the set is configuration.

use axum::http::Method;

/// Methods whose 302 responses are rewritten to 303 See Other.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeeOtherMethods(Vec<Method>);

impl SeeOtherMethods {
    pub fn new(methods: impl IntoIterator<Item = Method>) -> Self {
        Self(methods.into_iter().collect())
    }

    /// Parse standard method names as written in configuration files.
    /// Returns the first unknown name on failure.
    pub fn parse<S: AsRef<str>>(names: &[S]) -> Result<Self, String> {
        names
            .iter()
            .map(|name| {
                let name = name.as_ref().trim().to_ascii_uppercase();
                standard_method(&name).ok_or(name)
            })
            .collect::<Result<Vec<_>, _>>()
            .map(Self)
    }

    pub fn contains(&self, method: &Method) -> bool {
        self.0.contains(method)
    }

    pub fn methods(&self) -> &[Method] {
        &self.0
    }
}

fn standard_method(name: &str) -> Option<Method> {
    let method = match name {
        "GET" => Method::GET,
        "HEAD" => Method::HEAD,
        "POST" => Method::POST,
        "PUT" => Method::PUT,
        "PATCH" => Method::PATCH,
        "DELETE" => Method::DELETE,
        "OPTIONS" => Method::OPTIONS,
        "CONNECT" => Method::CONNECT,
        "TRACE" => Method::TRACE,
        _ => return None,
    };
    Some(method)
}

impl Default for SeeOtherMethods {
    fn default() -> Self {
        Self::new([Method::PUT, Method::PATCH, Method::DELETE])
    }
}
