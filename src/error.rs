//! Error types for configuration value resolution.
//!
//! Errors are grouped by the pipeline stage that produces them: binding errors
//! come out of a single [`Binding`](crate::binding::Binding) application,
//! source errors out of [`Source::initialize`](crate::source::Source::initialize),
//! validation errors out of the final per-field checks. [`ConfigError`] is the
//! aggregated report returned by the [`Manager`](crate::manager::Manager).

use std::fmt;
use thiserror::Error;

/// Boxed error used where callers supply their own failure types.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Failure of a single binding application.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum BindError {
    /// The source has no value for the bound name. Consolidation falls through.
    #[error("field is missing in config source")]
    Missing,

    /// Like [`BindError::Missing`], with the source and bound name attached.
    #[error("field {field} is missing in config source {source_name}")]
    FieldMissing { source_name: String, field: String },

    #[error(transparent)]
    Value(#[from] BindValueError),

    #[error("tried to access invalid element {name}, array only has {len} elements")]
    ElementOutOfRange { name: String, index: usize, len: usize },

    #[error("key={name} must be an object to look up {key}")]
    NotAnObject { name: String, key: String },

    #[error("config source {source_name} was read before it was initialized")]
    Uninitialized { source_name: String },

    #[error("{0}")]
    Custom(String),
}

impl BindError {
    pub fn field_missing(source_name: impl Into<String>, field: impl Into<String>) -> Self {
        BindError::FieldMissing {
            source_name: source_name.into(),
            field: field.into(),
        }
    }

    /// True for both flavours of "the source does not define this value".
    pub fn is_missing(&self) -> bool {
        matches!(self, BindError::Missing | BindError::FieldMissing { .. })
    }
}

/// A value was present but could not be converted into the destination type.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{func}: parsing {input:?}: {cause}")]
pub struct BindValueError {
    /// The failing conversion, e.g. `bind_int`.
    pub func: String,
    /// The raw input as the source holds it.
    pub input: String,
    pub cause: ConvertError,
}

impl BindValueError {
    pub fn new(func: impl Into<String>, input: impl Into<String>, cause: ConvertError) -> Self {
        Self {
            func: func.into(),
            input: input.into(),
            cause,
        }
    }

    pub fn with_func(mut self, func: impl Into<String>) -> Self {
        self.func = func.into();
        self
    }
}

/// Why a raw value failed conversion.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConvertError {
    #[error("invalid syntax")]
    InvalidSyntax,

    #[error("value out of range")]
    Overflow,

    #[error("invalid value {value}, it must be between {min} and {max}")]
    OutOfRange { value: i128, min: i128, max: i128 },

    #[error("expected {expected}, found {found}")]
    TypeMismatch {
        expected: &'static str,
        found: &'static str,
    },

    #[error("{0}")]
    Decode(String),
}

/// A source's backing data is present but cannot be used.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("{source_name}: malformed data: {cause}")]
    Malformed {
        source_name: String,
        /// The offending raw data.
        data: String,
        #[source]
        cause: BoxError,
    },
}

impl SourceError {
    pub fn malformed(
        source_name: impl Into<String>,
        data: impl Into<String>,
        cause: impl Into<BoxError>,
    ) -> Self {
        SourceError::Malformed {
            source_name: source_name.into(),
            data: data.into(),
            cause: cause.into(),
        }
    }

    pub fn source_name(&self) -> &str {
        match self {
            SourceError::Malformed { source_name, .. } => source_name,
        }
    }
}

/// Binding error attributed to the field it was consolidated for.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{}", render_field(.field, .error))]
pub struct FieldError {
    /// Field name, empty when the field was registered without one.
    pub field: String,
    #[source]
    pub error: BindError,
}

fn render_field(field: &str, error: &BindError) -> String {
    if field.is_empty() {
        error.to_string()
    } else {
        format!("{}: {}", field, error)
    }
}

/// Final checks on a consolidated field.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("field {field} is required, but no value was set")]
    Required { field: String },

    #[error("field {field} is invalid: {cause}")]
    Rejected {
        field: String,
        #[source]
        cause: BoxError,
    },
}

/// Pipeline phase that produced a [`ConfigError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Sources,
    Values,
    Validation,
}

impl Phase {
    pub fn title(self) -> &'static str {
        match self {
            Phase::Sources => "Config errors:",
            Phase::Values => "Config value errors:",
            Phase::Validation => "Validation errors:",
        }
    }
}

/// Aggregated report of every error found in the first failing phase.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{}", render(Phase::Sources, .0))]
    Sources(Vec<SourceError>),

    #[error("{}", render(Phase::Values, .0))]
    Values(Vec<FieldError>),

    #[error("{}", render(Phase::Validation, .0))]
    Validation(Vec<ValidationError>),
}

impl ConfigError {
    pub fn phase(&self) -> Phase {
        match self {
            ConfigError::Sources(_) => Phase::Sources,
            ConfigError::Values(_) => Phase::Values,
            ConfigError::Validation(_) => Phase::Validation,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            ConfigError::Sources(errors) => errors.len(),
            ConfigError::Values(errors) => errors.len(),
            ConfigError::Validation(errors) => errors.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// One rendered line per individual error, in report order.
    pub fn messages(&self) -> Vec<String> {
        match self {
            ConfigError::Sources(errors) => errors.iter().map(ToString::to_string).collect(),
            ConfigError::Values(errors) => errors.iter().map(ToString::to_string).collect(),
            ConfigError::Validation(errors) => errors.iter().map(ToString::to_string).collect(),
        }
    }
}

fn render<E: fmt::Display>(phase: Phase, errors: &[E]) -> String {
    let mut parts = vec![phase.title().to_string()];
    parts.extend(errors.iter().map(|e| format!("\t- {}", e)));
    parts.join("\n")
}
