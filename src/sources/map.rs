//! Programmatic key-value source

use super::{document_binder, TreeDocument};
use crate::binder::Binder;
use crate::error::SourceError;
use crate::source::Source;
use serde_json::{Map, Value};
use std::sync::Arc;

/// Values supplied directly by the application.
#[derive(Debug)]
pub struct MapSource {
    root: Value,
}

impl MapSource {
    pub fn new(fields: Map<String, Value>) -> Arc<Self> {
        Arc::new(Self {
            root: Value::Object(fields),
        })
    }

    pub fn from_pairs<I, K, V>(pairs: I) -> Arc<Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        Self::new(
            pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }

    pub fn key(self: &Arc<Self>, name: &str) -> Binder {
        document_binder(self, name)
    }
}

impl TreeDocument for MapSource {
    fn root(&self) -> Option<&Value> {
        Some(&self.root)
    }
}

impl Source for MapSource {
    fn initialize(&self) -> Result<(), SourceError> {
        Ok(())
    }

    fn name(&self) -> &str {
        "map"
    }
}
