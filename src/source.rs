//! Source contract
//!
//! A source provides raw values keyed by name. It is constructed with its
//! backing data, then initialized exactly once by the
//! [`Manager`](crate::manager::Manager) before any binding reads from it.

use crate::error::SourceError;
use std::fmt;
use std::sync::Arc;

/// Provider of raw configuration values.
pub trait Source: Send + Sync + 'static {
    /// Parse or ready the backing data.
    ///
    /// Empty or absent backing data means "no values", not an error. Calling
    /// this again after a successful initialization is a no-op.
    fn initialize(&self) -> Result<(), SourceError>;

    /// Stable, human-readable name used in errors and reports.
    fn name(&self) -> &str;
}

/// Shared handle to a source; bindings and the manager hold clones of it.
pub type SourceRef = Arc<dyn Source>;

/// Identity of a source instance. Two handles are the same source only if they
/// point at the same allocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SourceId(usize);

impl SourceId {
    pub fn of(source: &SourceRef) -> Self {
        SourceId(Arc::as_ptr(source) as *const () as usize)
    }
}

impl fmt::Debug for dyn Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Source").field("name", &self.name()).finish()
    }
}
