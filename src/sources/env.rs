//! Environment variable source

use crate::binder::lookup::Lookup;
use crate::binder::Binder;
use crate::error::SourceError;
use crate::source::{Source, SourceRef};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

/// Snapshot of an environment table.
#[derive(Debug, Default)]
pub struct EnvSource {
    vars: HashMap<String, String>,
}

impl EnvSource {
    /// Build from `KEY=VALUE` entries. An entry without `=` defines `KEY` as empty.
    pub fn new<I, S>(environ: I) -> Arc<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let vars = environ
            .into_iter()
            .map(|entry| parse_entry(entry.as_ref()))
            .collect();
        Arc::new(Self { vars })
    }

    pub fn from_pairs<I, K, V>(pairs: I) -> Arc<Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let vars = pairs
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        Arc::new(Self { vars })
    }

    /// Snapshot of the current process environment.
    pub fn from_process() -> Arc<Self> {
        Self::from_pairs(std::env::vars())
    }

    pub fn var(self: &Arc<Self>, key: &str) -> Binder {
        let source: SourceRef = self.clone();
        Binder::new(
            Some(source),
            key,
            Lookup::EnvVar {
                source: Arc::clone(self),
                key: key.to_string(),
            },
        )
    }

    pub(crate) fn get(&self, key: &str) -> Option<&str> {
        self.vars.get(key).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.vars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }
}

impl Source for EnvSource {
    fn initialize(&self) -> Result<(), SourceError> {
        debug!(vars = self.vars.len(), "environment source ready");
        Ok(())
    }

    fn name(&self) -> &str {
        "environment variables"
    }
}

fn parse_entry(entry: &str) -> (String, String) {
    match entry.split_once('=') {
        Some((key, value)) => (key.to_string(), value.to_string()),
        None => (entry.to_string(), String::new()),
    }
}
