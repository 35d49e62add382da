//! Prop values and their resolution.
//!
//! A prop is a source (a concrete value, a closure, or a provider object)
//! tagged with a kind that tells the page pipeline when to include it, plus
//! a merge flag.

use std::fmt;
use std::sync::Arc;

use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::BoxError;

/// Group used for deferred props created without an explicit group.
pub const DEFAULT_DEFER_GROUP: &str = "default";

/// Fallible zero-argument prop closure.
pub type PropFn = Arc<dyn Fn() -> Result<Value, BoxError> + Send + Sync>;

/// Custom types that produce their own prop value.
///
/// Implement `try_prop` for a fallible value; it takes precedence over `prop`.
pub trait ProvideProp: Send + Sync {
    fn prop(&self) -> Value;

    fn try_prop(&self) -> Result<Value, BoxError> {
        Ok(self.prop())
    }
}

/// When a prop is sent to the client.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum PropKind {
    /// Sent unless filtered out by a partial reload.
    #[default]
    Plain,
    /// Only sent when a partial reload asks for it.
    Optional,
    /// Sent even when a partial reload's `only` list omits it.
    Always,
    /// Skipped on full loads and announced in `deferredProps` under a group.
    Deferred { group: String },
}

#[derive(Clone)]
enum Source {
    Value(Value),
    Func(PropFn),
    Provider(Arc<dyn ProvideProp>),
}

/// A single prop value.
#[derive(Clone)]
pub struct Prop {
    source: Source,
    kind: PropKind,
    merge: bool,
}

impl Prop {
    fn from_source(source: Source) -> Self {
        Self {
            source,
            kind: PropKind::Plain,
            merge: false,
        }
    }

    /// A concrete value.
    pub fn value(value: impl Into<Value>) -> Self {
        Self::from_source(Source::Value(value.into()))
    }

    /// Serialize any value into a prop.
    pub fn json<T: Serialize + ?Sized>(value: &T) -> Result<Self, serde_json::Error> {
        serde_json::to_value(value).map(Self::value)
    }

    /// A closure evaluated at resolution time.
    pub fn func<F>(f: F) -> Self
    where
        F: Fn() -> Value + Send + Sync + 'static,
    {
        Self::from_source(Source::Func(Arc::new(
            move || -> Result<Value, BoxError> { Ok(f()) },
        )))
    }

    /// A fallible closure evaluated at resolution time.
    pub fn try_func<F, E>(f: F) -> Self
    where
        F: Fn() -> Result<Value, E> + Send + Sync + 'static,
        E: Into<BoxError>,
    {
        Self::from_source(Source::Func(Arc::new(
            move || -> Result<Value, BoxError> { f().map_err(Into::into) },
        )))
    }

    pub fn provider(provider: impl ProvideProp + 'static) -> Self {
        Self::from_source(Source::Provider(Arc::new(provider)))
    }

    /// Only include this prop when a partial reload requests it.
    pub fn optional(mut self) -> Self {
        self.kind = PropKind::Optional;
        self
    }

    /// Include this prop even when a partial reload's `only` list omits it.
    pub fn always(mut self) -> Self {
        self.kind = PropKind::Always;
        self
    }

    /// Defer this prop into the default group.
    pub fn deferred(self) -> Self {
        self.deferred_in(DEFAULT_DEFER_GROUP)
    }

    /// Defer this prop into a named group. A blank group means the default one.
    pub fn deferred_in(mut self, group: impl Into<String>) -> Self {
        let group = group.into();
        let group = if group.is_empty() {
            DEFAULT_DEFER_GROUP.to_string()
        } else {
            group
        };
        self.kind = PropKind::Deferred { group };
        self
    }

    /// Ask the client to merge this prop into its existing state.
    pub fn merge(mut self) -> Self {
        self.merge = true;
        self
    }

    pub fn kind(&self) -> &PropKind {
        &self.kind
    }

    pub fn is_always(&self) -> bool {
        self.kind == PropKind::Always
    }

    /// Optional and deferred props are never part of a full page load.
    pub fn ignore_on_first_load(&self) -> bool {
        matches!(self.kind, PropKind::Optional | PropKind::Deferred { .. })
    }

    pub fn deferred_group(&self) -> Option<&str> {
        match &self.kind {
            PropKind::Deferred { group } => Some(group),
            _ => None,
        }
    }

    pub fn should_merge(&self) -> bool {
        self.merge
    }

    /// Produce the concrete value, invoking closures and providers.
    pub fn resolve(&self) -> Result<Value, BoxError> {
        match &self.source {
            Source::Value(value) => Ok(value.clone()),
            Source::Func(f) => f(),
            Source::Provider(provider) => provider.try_prop(),
        }
    }
}

impl fmt::Debug for Prop {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let source = match &self.source {
            Source::Value(value) => format!("Value({value})"),
            Source::Func(_) => "Func(..)".to_string(),
            Source::Provider(_) => "Provider(..)".to_string(),
        };
        f.debug_struct("Prop")
            .field("source", &source)
            .field("kind", &self.kind)
            .field("merge", &self.merge)
            .finish()
    }
}

macro_rules! impl_prop_from {
    ($($ty:ty),* $(,)?) => {
        $(
            impl From<$ty> for Prop {
                fn from(value: $ty) -> Self {
                    Prop::value(value)
                }
            }
        )*
    };
}

impl_prop_from!(
    Value,
    String,
    &str,
    bool,
    i32,
    i64,
    u32,
    u64,
    f64,
    Vec<Value>,
    Map<String, Value>,
);

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct Counter;

    impl ProvideProp for Counter {
        fn prop(&self) -> Value {
            json!(1)
        }
    }

    struct Both;

    impl ProvideProp for Both {
        fn prop(&self) -> Value {
            json!("infallible")
        }

        fn try_prop(&self) -> Result<Value, BoxError> {
            Ok(json!("fallible"))
        }
    }

    struct Broken;

    impl ProvideProp for Broken {
        fn prop(&self) -> Value {
            Value::Null
        }

        fn try_prop(&self) -> Result<Value, BoxError> {
            Err("broken provider".into())
        }
    }

    #[test]
    fn test_concrete_value_resolves_unchanged() {
        let value = json!({"a": [1, 2, {"b": null}]});
        let prop = Prop::from(value.clone());
        assert_eq!(prop.resolve().unwrap(), value);
        assert_eq!(Prop::from("text").resolve().unwrap(), json!("text"));
    }

    #[test]
    fn test_closures_are_invoked_on_each_resolution() {
        let calls = Arc::new(AtomicUsize::new(0));
        let c = calls.clone();
        let prop = Prop::func(move || json!(c.fetch_add(1, Ordering::SeqCst)));

        assert_eq!(calls.load(Ordering::SeqCst), 0);
        assert_eq!(prop.resolve().unwrap(), json!(0));
        assert_eq!(prop.resolve().unwrap(), json!(1));
    }

    #[test]
    fn test_fallible_closure_surfaces_error() {
        let prop = Prop::try_func(|| Err::<Value, _>("boom"));
        assert_eq!(prop.resolve().unwrap_err().to_string(), "boom");

        let prop = Prop::try_func(|| Ok::<_, BoxError>(json!(true)));
        assert_eq!(prop.resolve().unwrap(), json!(true));
    }

    #[test]
    fn test_provider_prefers_fallible_form() {
        assert_eq!(Prop::provider(Counter).resolve().unwrap(), json!(1));
        assert_eq!(Prop::provider(Both).resolve().unwrap(), json!("fallible"));
        assert!(Prop::provider(Broken).resolve().is_err());
    }

    #[test]
    fn test_kind_builders() {
        let prop = Prop::from(1).deferred();
        assert_eq!(prop.deferred_group(), Some(DEFAULT_DEFER_GROUP));
        assert!(prop.ignore_on_first_load());

        let prop = Prop::from(1).deferred_in("");
        assert_eq!(prop.deferred_group(), Some(DEFAULT_DEFER_GROUP));

        let prop = Prop::from(1).optional();
        assert!(prop.ignore_on_first_load());
        assert_eq!(prop.deferred_group(), None);

        let prop = Prop::from(1).always().merge();
        assert!(prop.is_always());
        assert!(prop.should_merge());
        assert!(!prop.ignore_on_first_load());
    }

    #[test]
    fn test_json_constructor() {
        #[derive(Serialize)]
        struct User {
            name: &'static str,
        }

        let prop = Prop::json(&User { name: "Ada" }).unwrap();
        assert_eq!(prop.resolve().unwrap(), json!({"name": "Ada"}));
    }
}
