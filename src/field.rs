//! Fields and the consolidation algorithm
//!
//! A [`Field`] is one destination plus the bindings that may fill it, in
//! precedence order (lowest first). Consolidation applies them left to right:
//! a success overwrites the destination and the provenance, a missing value
//! falls through silently, and every other error is collected without stopping
//! the remaining bindings.

pub mod typed;

use crate::binding::{Binding, Provenance};
use crate::dest::{Dest, DestId};
use crate::error::BindError;
use crate::source::SourceRef;
use std::any::Any;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, trace};

pub use typed::*;

/// One destination and its ordered bindings.
pub struct Field {
    destination: DestId,
    type_name: &'static str,
    /// Type-erased clone of the destination, for validators.
    value: Arc<dyn Any + Send + Sync>,
    bindings: Vec<Binding>,
    provenance: Provenance,
    outcome: Option<Vec<BindError>>,
}

impl Field {
    pub fn new<T: Send + 'static>(dest: &Dest<T>, bindings: Vec<Binding>) -> Self {
        Self {
            destination: dest.id(),
            type_name: std::any::type_name::<T>(),
            value: Arc::new(dest.clone()),
            bindings,
            provenance: Provenance::Unset,
            outcome: None,
        }
    }

    /// Resolve the field and return every non-missing error, in binding order.
    ///
    /// Bindings are applied on the first call only. Later calls return the
    /// recorded errors and leave the destination untouched.
    pub fn consolidate(&mut self) -> Vec<BindError> {
        if let Some(errors) = &self.outcome {
            trace!(field = self.type_name, "field already consolidated");
            return errors.clone();
        }

        let mut errors = Vec::new();
        for binding in &mut self.bindings {
            match binding.apply() {
                Ok(()) => {
                    trace!(origin = ?binding.origin(), "binding applied");
                    self.provenance.record(binding.origin());
                }
                Err(e) if e.is_missing() => {
                    trace!(origin = ?binding.origin(), "value missing, falling through");
                }
                Err(e) => {
                    debug!(origin = ?binding.origin(), error = %e, "binding failed");
                    errors.push(e);
                }
            }
        }

        self.outcome = Some(errors.clone());
        errors
    }

    pub fn is_consolidated(&self) -> bool {
        self.outcome.is_some()
    }

    /// Which binding supplied the final value. `Unset` before consolidation.
    pub fn provenance(&self) -> &Provenance {
        &self.provenance
    }

    pub fn destination(&self) -> DestId {
        self.destination
    }

    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    pub fn bindings(&self) -> &[Binding] {
        &self.bindings
    }

    /// Real sources referenced by the bindings, in declaration order.
    pub fn sources(&self) -> impl Iterator<Item = &SourceRef> {
        self.bindings.iter().filter_map(Binding::source)
    }

    pub(crate) fn value(&self) -> &(dyn Any + Send + Sync) {
        self.value.as_ref()
    }
}

impl fmt::Debug for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Field")
            .field("destination", &self.destination)
            .field("type_name", &self.type_name)
            .field("bindings", &self.bindings)
            .field("provenance", &self.provenance)
            .field("consolidated", &self.is_consolidated())
            .finish()
    }
}
