//! Bindings: single, type-specialized resolution attempts
//!
//! A [`Binding`] is produced by a binder for one destination. Applying it looks
//! the value up in its source, converts it and writes the destination on
//! success. Each application re-reads the source; nothing is cached.

use crate::error::BindError;
use crate::source::{SourceId, SourceRef};
use std::fmt;

/// Bound name reported for default-value bindings.
pub const DEFAULT_BOUND_NAME: &str = "default";

type ApplyFn = Box<dyn FnMut() -> Result<(), BindError> + Send>;

/// Where a binding's value comes from.
#[derive(Clone)]
pub enum Origin {
    /// A real source, with the name the binding looks up in it.
    Source { source: SourceRef, bound_name: String },
    /// A default value; does not count as "set" for required fields.
    Default,
}

impl Origin {
    pub fn source(&self) -> Option<&SourceRef> {
        match self {
            Origin::Source { source, .. } => Some(source),
            Origin::Default => None,
        }
    }

    pub fn bound_name(&self) -> &str {
        match self {
            Origin::Source { bound_name, .. } => bound_name,
            Origin::Default => DEFAULT_BOUND_NAME,
        }
    }
}

impl fmt::Debug for Origin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Origin::Source { source, bound_name } => f
                .debug_struct("Source")
                .field("source", &source.name())
                .field("bound_name", bound_name)
                .finish(),
            Origin::Default => f.write_str("Default"),
        }
    }
}

/// One applyable resolution attempt.
pub struct Binding {
    origin: Origin,
    apply: ApplyFn,
}

impl Binding {
    pub fn new(
        origin: Origin,
        apply: impl FnMut() -> Result<(), BindError> + Send + 'static,
    ) -> Self {
        Self {
            origin,
            apply: Box::new(apply),
        }
    }

    /// Binding backed by a real source.
    pub fn from_source(
        source: SourceRef,
        bound_name: impl Into<String>,
        apply: impl FnMut() -> Result<(), BindError> + Send + 'static,
    ) -> Self {
        Self::new(
            Origin::Source {
                source,
                bound_name: bound_name.into(),
            },
            apply,
        )
    }

    /// Binding that supplies a default value.
    pub fn default_value(apply: impl FnMut() -> Result<(), BindError> + Send + 'static) -> Self {
        Self::new(Origin::Default, apply)
    }

    pub fn apply(&mut self) -> Result<(), BindError> {
        (self.apply)()
    }

    pub fn origin(&self) -> &Origin {
        &self.origin
    }

    /// `None` for default-value bindings.
    pub fn source(&self) -> Option<&SourceRef> {
        self.origin.source()
    }

    pub fn bound_name(&self) -> &str {
        self.origin.bound_name()
    }

    /// Run `after` once this binding applied successfully, keeping its origin.
    ///
    /// Used by typed field constructors to narrow or post-process a value the
    /// binder wrote into a scratch slot.
    pub fn and_then(
        mut self,
        mut after: impl FnMut() -> Result<(), BindError> + Send + 'static,
    ) -> Binding {
        let origin = self.origin.clone();
        Binding::new(origin, move || {
            self.apply()?;
            after()
        })
    }
}

impl fmt::Debug for Binding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Binding")
            .field("origin", &self.origin)
            .finish_non_exhaustive()
    }
}

/// Which binding, if any, supplied a field's final value.
#[derive(Clone, Default)]
pub enum Provenance {
    /// No binding succeeded.
    #[default]
    Unset,
    /// Only default-value bindings succeeded.
    FromDefault,
    FromSource { source: SourceRef, bound_name: String },
}

impl Provenance {
    pub fn is_from_source(&self) -> bool {
        matches!(self, Provenance::FromSource { .. })
    }

    pub fn source(&self) -> Option<&SourceRef> {
        match self {
            Provenance::FromSource { source, .. } => Some(source),
            _ => None,
        }
    }

    pub fn source_id(&self) -> Option<SourceId> {
        self.source().map(SourceId::of)
    }

    pub fn source_name(&self) -> Option<&str> {
        self.source().map(|s| s.name())
    }

    pub fn bound_name(&self) -> Option<&str> {
        match self {
            Provenance::FromSource { bound_name, .. } => Some(bound_name),
            Provenance::FromDefault => Some(DEFAULT_BOUND_NAME),
            Provenance::Unset => None,
        }
    }

    /// Fold one successful application into the provenance record.
    ///
    /// A later source always takes over; a default never replaces a source.
    pub(crate) fn record(&mut self, origin: &Origin) {
        match origin {
            Origin::Source { source, bound_name } => {
                *self = Provenance::FromSource {
                    source: source.clone(),
                    bound_name: bound_name.clone(),
                };
            }
            Origin::Default => {
                if !self.is_from_source() {
                    *self = Provenance::FromDefault;
                }
            }
        }
    }
}

impl fmt::Debug for Provenance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Provenance::Unset => f.write_str("Unset"),
            Provenance::FromDefault => f.write_str("FromDefault"),
            Provenance::FromSource { source, bound_name } => f
                .debug_struct("FromSource")
                .field("source", &source.name())
                .field("bound_name", bound_name)
                .finish(),
        }
    }
}

impl fmt::Display for Provenance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Provenance::Unset => f.write_str("unset"),
            Provenance::FromDefault => f.write_str(DEFAULT_BOUND_NAME),
            Provenance::FromSource { source, bound_name } => {
                write!(f, "{} ({})", source.name(), bound_name)
            }
        }
    }
}
