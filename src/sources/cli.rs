//! Command-line argument source

pub mod flags;

use crate::binder::lookup::Lookup;
use crate::binder::Binder;
use crate::error::{BindError, SourceError};
use crate::source::{Source, SourceRef};
use flags::FlagSet;
use parking_lot::Mutex;
use std::collections::BTreeSet;
use std::sync::{Arc, OnceLock};
use tracing::{debug, warn};

const NAME: &str = "CLI flags";

/// Argument vector parsed on initialization.
///
/// Flags bound to booleans are registered as unary before parsing, so the
/// binders must be created before the source is initialized.
#[derive(Debug, Default)]
pub struct CliSource {
    args: Vec<String>,
    unary: Mutex<BTreeSet<String>>,
    parsed: OnceLock<FlagSet>,
}

impl CliSource {
    /// Build from arguments, program name excluded.
    pub fn new<I, S>(args: I) -> Arc<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Arc::new(Self {
            args: args.into_iter().map(Into::into).collect(),
            ..Self::default()
        })
    }

    pub fn from_process() -> Arc<Self> {
        Self::new(std::env::args().skip(1))
    }

    /// `--long` option.
    pub fn flag(self: &Arc<Self>, long: &str) -> Binder {
        self.option_binder(long, None)
    }

    /// `--long` option that also answers to `-short`.
    pub fn flag_with_short(self: &Arc<Self>, long: &str, short: &str) -> Binder {
        self.option_binder(long, Some(short))
    }

    /// Zero-based positional argument.
    pub fn positional(self: &Arc<Self>, index: usize) -> Binder {
        let source: SourceRef = self.clone();
        Binder::new(
            Some(source),
            format!("arg[{}]", index),
            Lookup::CliPositional {
                source: Arc::clone(self),
                index,
            },
        )
    }

    fn option_binder(self: &Arc<Self>, long: &str, short: Option<&str>) -> Binder {
        let source: SourceRef = self.clone();
        Binder::new(
            Some(source),
            long,
            Lookup::CliOption {
                source: Arc::clone(self),
                long: long.to_string(),
                short: short.map(str::to_string),
            },
        )
    }

    /// Declare a flag that takes no value. Binding a flag as a boolean does
    /// this automatically; call it directly when the arguments are parsed
    /// before every boolean field is declared.
    ///
    /// Returns `false` when the arguments were already parsed, in which case
    /// the declaration has no effect on this source.
    pub fn declare_unary(&self, long: &str, short: Option<&str>) -> bool {
        let mut unary = self.unary.lock();
        let newly_declared = unary.insert(long.to_string());
        if let Some(short) = short {
            unary.insert(short.to_string());
        }
        if self.parsed.get().is_some() {
            if newly_declared {
                warn!(flag = %long, "unary flag declared after the arguments were parsed");
            }
            return false;
        }
        true
    }

    pub(crate) fn flags(&self) -> Result<&FlagSet, BindError> {
        self.parsed.get().ok_or_else(|| BindError::Uninitialized {
            source_name: NAME.to_string(),
        })
    }
}

impl Source for CliSource {
    fn initialize(&self) -> Result<(), SourceError> {
        if self.parsed.get().is_some() {
            return Ok(());
        }
        let unary = self.unary.lock().clone();
        let set = flags::parse(&self.args, &unary)
            .map_err(|e| SourceError::malformed(NAME, self.args.join(" "), e))?;
        debug!(
            args = self.args.len(),
            positional = set.positionals().len(),
            "CLI source parsed"
        );
        // a concurrent initializer parsed the same arguments
        let _ = self.parsed.set(set);
        Ok(())
    }

    fn name(&self) -> &str {
        NAME
    }
}
