//! Lookup strategies
//!
//! Each built-in binder carries one [`Lookup`] describing how to find its raw
//! value. Conversion code matches on the fetched [`RawValue`], never on the
//! source kind.

use crate::binder::convert::{self, split_list};
use crate::binder::RawValue;
use crate::error::{BindError, BindValueError, ConvertError};
use crate::sources::cli::CliSource;
use crate::sources::env::EnvSource;
use crate::sources::TreeDocument;
use serde_json::Value;
use std::sync::Arc;

#[derive(Clone)]
pub(crate) enum Lookup {
    EnvVar {
        source: Arc<EnvSource>,
        key: String,
    },
    CliOption {
        source: Arc<CliSource>,
        long: String,
        short: Option<String>,
    },
    CliPositional {
        source: Arc<CliSource>,
        index: usize,
    },
    /// Top-level key of a structured document.
    Document {
        document: Arc<dyn TreeDocument>,
        key: String,
    },
    /// Key inside whatever the parent lookup yields.
    Nested {
        parent: Box<Lookup>,
        parent_name: String,
        key: String,
    },
    /// One element of an already resolved list.
    Element {
        items: Arc<Vec<RawValue>>,
        index: usize,
    },
    Constant(RawValue),
}

impl Lookup {
    /// Fetch the raw value. `name` and `source_name` only feed error messages.
    pub(crate) fn fetch(&self, name: &str, source_name: &str) -> Result<RawValue, BindError> {
        match self {
            Lookup::EnvVar { source, key } => source
                .get(key)
                .map(|v| RawValue::Text(v.to_string()))
                .ok_or_else(|| BindError::field_missing(source_name, name)),
            Lookup::CliOption {
                source,
                long,
                short,
            } => source
                .flags()?
                .last(long, short.as_deref())
                .map(|v| RawValue::Text(v.to_string()))
                .ok_or_else(|| BindError::field_missing(source_name, name)),
            Lookup::CliPositional { source, index } => source
                .flags()?
                .positional(*index)
                .map(|v| RawValue::Text(v.to_string()))
                .ok_or_else(|| BindError::field_missing(source_name, name)),
            Lookup::Document { document, key } => {
                let root = document.root().ok_or_else(|| BindError::Uninitialized {
                    source_name: source_name.to_string(),
                })?;
                root.get(key)
                    .map(|v| RawValue::Structured(v.clone()))
                    .ok_or_else(|| BindError::field_missing(source_name, name))
            }
            Lookup::Nested {
                parent,
                parent_name,
                key,
            } => match parent.fetch(parent_name, source_name)? {
                RawValue::Structured(Value::Object(map)) => map
                    .get(key)
                    .map(|v| RawValue::Structured(v.clone()))
                    .ok_or_else(|| BindError::field_missing(source_name, name)),
                _ => Err(BindError::NotAnObject {
                    name: parent_name.clone(),
                    key: key.clone(),
                }),
            },
            Lookup::Element { items, index } => {
                items
                    .get(*index)
                    .cloned()
                    .ok_or_else(|| BindError::ElementOutOfRange {
                        name: name.to_string(),
                        index: *index,
                        len: items.len(),
                    })
            }
            Lookup::Constant(raw) => Ok(raw.clone()),
        }
    }

    /// Fetch the raw collection behind an array binding.
    ///
    /// Flat text is split on the list delimiter; repeated CLI options
    /// contribute every occurrence in order.
    pub(crate) fn fetch_list(
        &self,
        name: &str,
        source_name: &str,
    ) -> Result<Vec<RawValue>, BindError> {
        if let Lookup::CliOption {
            source,
            long,
            short,
        } = self
        {
            let occurrences = source.flags()?.all(long, short.as_deref());
            if occurrences.is_empty() {
                return Err(BindError::field_missing(source_name, name));
            }
            return Ok(occurrences
                .into_iter()
                .flat_map(split_list)
                .map(RawValue::Text)
                .collect());
        }

        match self.fetch(name, source_name)? {
            RawValue::Text(text) => Ok(split_list(&text).into_iter().map(RawValue::Text).collect()),
            RawValue::Structured(Value::Array(items)) => {
                Ok(items.into_iter().map(RawValue::Structured).collect())
            }
            RawValue::Structured(other) => Err(BindValueError::new(
                "bind_array",
                other.to_string(),
                ConvertError::TypeMismatch {
                    expected: "array",
                    found: convert::value_kind(&other),
                },
            )
            .into()),
        }
    }
}
