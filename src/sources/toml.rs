//! TOML document source
//!
//! The document is converted into the same `serde_json::Value` tree the JSON
//! source uses, so both share binder semantics. Datetimes become strings.

use super::{document_binder, TreeDocument};
use crate::binder::Binder;
use crate::error::SourceError;
use crate::source::Source;
use serde_json::{Map, Number, Value};
use std::sync::{Arc, OnceLock};
use tracing::debug;

const NAME: &str = "toml";

#[derive(Debug, Default)]
pub struct TomlSource {
    text: String,
    root: OnceLock<Value>,
}

impl TomlSource {
    pub fn new(text: impl Into<String>) -> Arc<Self> {
        Arc::new(Self {
            text: text.into(),
            root: OnceLock::new(),
        })
    }

    pub fn key(self: &Arc<Self>, name: &str) -> Binder {
        document_binder(self, name)
    }
}

/// Fails on `nan` and `inf`, which have no JSON number form.
fn to_json(key: &str, value: toml::Value) -> Result<Value, String> {
    Ok(match value {
        toml::Value::String(s) => Value::String(s),
        toml::Value::Integer(i) => Value::Number(i.into()),
        toml::Value::Float(f) => Number::from_f64(f)
            .map(Value::Number)
            .ok_or_else(|| format!("non-finite float {} at {}", f, key))?,
        toml::Value::Boolean(b) => Value::Bool(b),
        toml::Value::Datetime(dt) => Value::String(dt.to_string()),
        toml::Value::Array(items) => Value::Array(
            items
                .into_iter()
                .enumerate()
                .map(|(i, item)| to_json(&format!("{}[{}]", key, i), item))
                .collect::<Result<_, _>>()?,
        ),
        toml::Value::Table(table) => Value::Object(table_to_json(Some(key), table)?),
    })
}

fn table_to_json(prefix: Option<&str>, table: toml::Table) -> Result<Map<String, Value>, String> {
    table
        .into_iter()
        .map(|(k, v)| {
            let path = match prefix {
                Some(prefix) => format!("{}.{}", prefix, k),
                None => k.clone(),
            };
            to_json(&path, v).map(|v| (k, v))
        })
        .collect()
}

impl TreeDocument for TomlSource {
    fn root(&self) -> Option<&Value> {
        self.root.get()
    }
}

impl Source for TomlSource {
    fn initialize(&self) -> Result<(), SourceError> {
        if self.root.get().is_some() {
            return Ok(());
        }
        let table: toml::Table = self
            .text
            .parse()
            .map_err(|e| SourceError::malformed(NAME, self.text.clone(), e))?;
        debug!(keys = table.len(), "TOML source parsed");
        let root = table_to_json(None, table)
            .map_err(|e| SourceError::malformed(NAME, self.text.clone(), e))?;
        let _ = self.root.set(Value::Object(root));
        Ok(())
    }

    fn name(&self) -> &str {
        NAME
    }
}
