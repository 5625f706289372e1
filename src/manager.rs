//! Three-phase resolution pipeline
//!
//! 1. Initialize every distinct source referenced by a registered field, in
//!    first-registration order. A source that initialized successfully is
//!    never initialized again by later runs.
//! 2. Consolidate every field, in registration order.
//! 3. Validate every field.
//!
//! Each phase collects all of its errors; the first phase with any error ends
//! the run and is returned as a [`ConfigError`].

use crate::dest::{Dest, DestId};
use crate::error::{ConfigError, FieldError, Phase};
use crate::field::Field;
use crate::managed::{FieldOptions, ManagedField};
use crate::report::FieldReport;
use crate::source::{SourceId, SourceRef};
use std::collections::{HashMap, HashSet};
use tracing::{debug, warn};

/// Owns the registered fields and the sources they reference.
#[derive(Debug, Default)]
pub struct Manager {
    fields: Vec<ManagedField>,
    sources: Vec<SourceRef>,
    seen_sources: HashSet<SourceId>,
    initialized: HashSet<SourceId>,
    by_dest: HashMap<DestId, usize>,
}

impl Manager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a field. Registering a second field for the same destination
    /// replaces the lookup entry, but both fields are still resolved.
    pub fn add_field(&mut self, field: Field, options: FieldOptions) -> &ManagedField {
        for source in field.sources() {
            if self.seen_sources.insert(SourceId::of(source)) {
                self.sources.push(source.clone());
            }
        }

        let index = self.fields.len();
        if self.by_dest.insert(field.destination(), index).is_some() {
            warn!(index, "destination registered twice");
        }
        self.fields.push(ManagedField::new(field, options, index));
        &self.fields[index]
    }

    /// Field registered for `dest`, if any.
    pub fn field<T>(&self, dest: &Dest<T>) -> Option<&ManagedField> {
        self.by_dest.get(&dest.id()).map(|&index| &self.fields[index])
    }

    pub fn fields(&self) -> &[ManagedField] {
        &self.fields
    }

    /// Distinct sources in first-seen order.
    pub fn sources(&self) -> &[SourceRef] {
        &self.sources
    }

    pub fn consolidate(&mut self) -> Result<(), ConfigError> {
        let pending: Vec<SourceRef> = self
            .sources
            .iter()
            .filter(|source| !self.initialized.contains(&SourceId::of(source)))
            .cloned()
            .collect();
        debug!(sources = pending.len(), "initializing sources");
        let mut source_errors = Vec::new();
        for source in &pending {
            match source.initialize() {
                Ok(()) => {
                    self.initialized.insert(SourceId::of(source));
                }
                Err(e) => source_errors.push(e),
            }
        }
        if !source_errors.is_empty() {
            warn!(errors = source_errors.len(), "{}", Phase::Sources.title());
            return Err(ConfigError::Sources(source_errors));
        }

        debug!(fields = self.fields.len(), "consolidating fields");
        let mut value_errors = Vec::new();
        for managed in &mut self.fields {
            let name = managed.name().to_string();
            value_errors.extend(managed.field_mut().consolidate().into_iter().map(|error| {
                FieldError {
                    field: name.clone(),
                    error,
                }
            }));
        }
        if !value_errors.is_empty() {
            warn!(errors = value_errors.len(), "{}", Phase::Values.title());
            return Err(ConfigError::Values(value_errors));
        }

        debug!(fields = self.fields.len(), "validating fields");
        let validation_errors: Vec<_> = self
            .fields
            .iter()
            .filter_map(|managed| managed.validate().err())
            .collect();
        if !validation_errors.is_empty() {
            warn!(errors = validation_errors.len(), "{}", Phase::Validation.title());
            return Err(ConfigError::Validation(validation_errors));
        }

        debug!("configuration resolved");
        Ok(())
    }

    /// One entry per registered field, in registration order.
    pub fn report(&self) -> Vec<FieldReport> {
        self.fields.iter().map(FieldReport::from_managed).collect()
    }
}
