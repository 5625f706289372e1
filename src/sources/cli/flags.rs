//! CLI token parser
//!
//! Splits an argument vector into options and positional arguments. Options
//! keep every occurrence in order so scalar lookups can take the last one and
//! list lookups can take them all.

use std::collections::BTreeSet;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FlagError {
    #[error("flag {flag} needs a value")]
    MissingValue { flag: String },

    #[error("empty flag name in argument {arg:?}")]
    EmptyName { arg: String },
}

/// Parsed options and positional arguments.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FlagSet {
    options: Vec<(String, String)>,
    positional: Vec<String>,
}

impl FlagSet {
    /// Last value given for `long` or `short`.
    pub fn last(&self, long: &str, short: Option<&str>) -> Option<&str> {
        self.options
            .iter()
            .rev()
            .find(|(name, _)| matches_name(name, long, short))
            .map(|(_, value)| value.as_str())
    }

    /// Every value given for `long` or `short`, in argument order.
    pub fn all(&self, long: &str, short: Option<&str>) -> Vec<&str> {
        self.options
            .iter()
            .filter(|(name, _)| matches_name(name, long, short))
            .map(|(_, value)| value.as_str())
            .collect()
    }

    /// Zero-based positional argument.
    pub fn positional(&self, index: usize) -> Option<&str> {
        self.positional.get(index).map(String::as_str)
    }

    pub fn positionals(&self) -> &[String] {
        &self.positional
    }
}

fn matches_name(name: &str, long: &str, short: Option<&str>) -> bool {
    name == long || short == Some(name)
}

/// Parse `args` (program name excluded).
///
/// `unary` names flags that take no value: their presence means `true`.
/// Supported forms: `--name=value`, `--name value`, `-n=value`, `-n value`,
/// `-nvalue`, grouped unary shorts `-abc`, and `--` to end option parsing.
pub fn parse(args: &[String], unary: &BTreeSet<String>) -> Result<FlagSet, FlagError> {
    let mut set = FlagSet::default();
    let mut iter = args.iter();

    while let Some(arg) = iter.next() {
        if arg == "--" {
            set.positional.extend(iter.by_ref().cloned());
            break;
        }

        if let Some(body) = arg.strip_prefix("--") {
            if let Some((name, value)) = body.split_once('=') {
                push(&mut set, name, value, arg)?;
            } else if unary.contains(body) {
                push(&mut set, body, "true", arg)?;
            } else {
                let value = iter.next().ok_or_else(|| FlagError::MissingValue {
                    flag: arg.clone(),
                })?;
                push(&mut set, body, value, arg)?;
            }
            continue;
        }

        match arg.strip_prefix('-') {
            Some(body) if !body.is_empty() => parse_short(&mut set, body, arg, &mut iter, unary)?,
            _ => set.positional.push(arg.clone()),
        }
    }

    Ok(set)
}

fn parse_short<'a>(
    set: &mut FlagSet,
    body: &str,
    arg: &str,
    rest: &mut impl Iterator<Item = &'a String>,
    unary: &BTreeSet<String>,
) -> Result<(), FlagError> {
    if let Some((name, value)) = body.split_once('=') {
        return push(set, name, value, arg);
    }

    for (offset, ch) in body.char_indices() {
        let name = ch.to_string();
        if unary.contains(&name) {
            push(set, &name, "true", arg)?;
            continue;
        }
        let attached = &body[offset + ch.len_utf8()..];
        if !attached.is_empty() {
            return push(set, &name, attached, arg);
        }
        let value = rest.next().ok_or_else(|| FlagError::MissingValue {
            flag: format!("-{}", name),
        })?;
        return push(set, &name, value, arg);
    }
    Ok(())
}

fn push(set: &mut FlagSet, name: &str, value: &str, arg: &str) -> Result<(), FlagError> {
    if name.is_empty() {
        return Err(FlagError::EmptyName {
            arg: arg.to_string(),
        });
    }
    set.options.push((name.to_string(), value.to_string()));
    Ok(())
}
