//! Field metadata and validation

use crate::dest::Dest;
use crate::error::{BoxError, ValidationError};
use crate::field::Field;
use std::any::Any;
use std::fmt;

type Validator = Box<dyn Fn(&dyn Any) -> Option<Result<(), BoxError>> + Send>;

/// Options attached to a field when it is registered with a manager.
#[derive(Default)]
pub struct FieldOptions {
    name: Option<String>,
    description: String,
    required: bool,
    validator: Option<Validator>,
}

impl FieldOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// The field must be set from a real source; a default does not count.
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Check the final value after consolidation.
    ///
    /// `T` must be the field's destination type. The check gets a copy of the
    /// value, so it may read the destination itself.
    pub fn validator<T, E>(mut self, check: impl Fn(&T) -> Result<(), E> + Send + 'static) -> Self
    where
        T: Clone + Send + 'static,
        E: Into<BoxError>,
    {
        self.validator = Some(Box::new(move |value: &dyn Any| {
            let current = value.downcast_ref::<Dest<T>>()?.get();
            Some(check(&current).map_err(Into::into))
        }));
        self
    }
}

impl fmt::Debug for FieldOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldOptions")
            .field("name", &self.name)
            .field("description", &self.description)
            .field("required", &self.required)
            .field("validator", &self.validator.is_some())
            .finish()
    }
}

/// A field plus the metadata the manager needs to validate and report it.
pub struct ManagedField {
    field: Field,
    name: String,
    description: String,
    required: bool,
    validator: Option<Validator>,
}

impl ManagedField {
    /// Without an explicit name, the bound name of the first source binding is
    /// used, then `field #<index>`.
    pub fn new(field: Field, options: FieldOptions, index: usize) -> Self {
        let name = options.name.unwrap_or_else(|| {
            field
                .bindings()
                .iter()
                .find(|b| b.source().is_some())
                .map(|b| b.bound_name().to_string())
                .unwrap_or_else(|| format!("field #{}", index))
        });
        Self {
            field,
            name,
            description: options.description,
            required: options.required,
            validator: options.validator,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn is_required(&self) -> bool {
        self.required
    }

    pub fn field(&self) -> &Field {
        &self.field
    }

    pub(crate) fn field_mut(&mut self) -> &mut Field {
        &mut self.field
    }

    /// Required check first, then the validator.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.required && !self.field.provenance().is_from_source() {
            return Err(ValidationError::Required {
                field: self.name.clone(),
            });
        }

        let Some(validator) = &self.validator else {
            return Ok(());
        };
        match validator(self.field.value()) {
            Some(Ok(())) => Ok(()),
            Some(Err(cause)) => Err(ValidationError::Rejected {
                field: self.name.clone(),
                cause,
            }),
            None => Err(ValidationError::Rejected {
                field: self.name.clone(),
                cause: format!("validator does not accept values of type {}", self.field.type_name())
                    .into(),
            }),
        }
    }
}

impl fmt::Debug for ManagedField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ManagedField")
            .field("name", &self.name)
            .field("description", &self.description)
            .field("required", &self.required)
            .field("field", &self.field)
            .finish()
    }
}
