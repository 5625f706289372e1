//! JSON document source

use super::{document_binder, TreeDocument};
use crate::binder::Binder;
use crate::error::SourceError;
use crate::source::Source;
use serde_json::{Map, Value};
use std::sync::{Arc, OnceLock};
use tracing::debug;

const NAME: &str = "json";

/// JSON bytes parsed on initialization. The top level must be an object.
#[derive(Debug, Default)]
pub struct JsonSource {
    data: Vec<u8>,
    root: OnceLock<Value>,
}

impl JsonSource {
    pub fn new(data: impl Into<Vec<u8>>) -> Arc<Self> {
        Arc::new(Self {
            data: data.into(),
            root: OnceLock::new(),
        })
    }

    /// Top-level key; chain [`Binder::key`] for nested ones.
    pub fn key(self: &Arc<Self>, name: &str) -> Binder {
        document_binder(self, name)
    }

    fn parse(&self) -> Result<Value, SourceError> {
        if self.data.iter().all(u8::is_ascii_whitespace) {
            return Ok(Value::Object(Map::new()));
        }
        let raw = || String::from_utf8_lossy(&self.data).into_owned();
        let value: Value =
            serde_json::from_slice(&self.data).map_err(|e| SourceError::malformed(NAME, raw(), e))?;
        if !value.is_object() {
            return Err(SourceError::malformed(
                NAME,
                raw(),
                "top-level JSON value must be an object",
            ));
        }
        Ok(value)
    }
}

impl TreeDocument for JsonSource {
    fn root(&self) -> Option<&Value> {
        self.root.get()
    }
}

impl Source for JsonSource {
    fn initialize(&self) -> Result<(), SourceError> {
        if self.root.get().is_some() {
            return Ok(());
        }
        let value = self.parse()?;
        debug!(bytes = self.data.len(), "JSON source parsed");
        let _ = self.root.set(value);
        Ok(())
    }

    fn name(&self) -> &str {
        NAME
    }
}
