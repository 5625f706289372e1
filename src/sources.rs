//! Built-in sources
//!
//! Flat-text sources ([`EnvSource`], [`CliSource`]) hand out text that is parsed
//! on demand. Structured sources ([`JsonSource`], [`TomlSource`], [`MapSource`])
//! expose a `serde_json::Value` tree navigated with chained `key` calls.
//! [`default_value`] builds binders for default values.

pub mod cli;
pub mod env;
pub mod json;
pub mod map;
pub mod toml;

pub use cli::CliSource;
pub use env::EnvSource;
pub use json::JsonSource;
pub use map::MapSource;
pub use toml::TomlSource;

use crate::binder::lookup::Lookup;
use crate::binder::{Binder, RawValue};
use crate::binding::DEFAULT_BOUND_NAME;
use crate::source::SourceRef;
use serde_json::Value;
use std::sync::Arc;

/// A source whose values form a tree rooted at an object.
pub(crate) trait TreeDocument: Send + Sync {
    /// `None` until the source is initialized.
    fn root(&self) -> Option<&Value>;
}

/// Binder for a top-level key of a structured source.
pub(crate) fn document_binder<S>(source: &Arc<S>, key: &str) -> Binder
where
    S: TreeDocument + crate::source::Source,
{
    let as_source: SourceRef = source.clone();
    let document: Arc<dyn TreeDocument> = source.clone();
    Binder::new(
        Some(as_source),
        key,
        Lookup::Document {
            document,
            key: key.to_string(),
        },
    )
}

/// Binder that always yields `value` and marks its bindings as defaults.
///
/// ```
/// use bindconf::sources::default_value;
/// let vus = default_value(1);
/// let tags = default_value(vec!["smoke", "nightly"]);
/// # let _ = (vus, tags);
/// ```
pub fn default_value(value: impl Into<Value>) -> Binder {
    Binder::new(
        None,
        DEFAULT_BOUND_NAME,
        Lookup::Constant(RawValue::Structured(value.into())),
    )
}
