//! Raw value conversions and integer width checks
//!
//! Flat-text sources (environment, CLI) go through the `parse_*` functions;
//! structured sources (JSON, TOML, maps, defaults) go through the `value_*`
//! functions. Both report a [`ConvertError`] which the binder wraps with the
//! failing function name and the raw input.

use crate::error::ConvertError;
use serde_json::Value;
use std::num::IntErrorKind;

/// Delimiter used to split flat-text values into lists.
pub const LIST_DELIMITER: char = ',';

/// Destination width of an integer field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IntWidth {
    W8,
    W16,
    W32,
    W64,
    /// Platform word (`isize`/`usize`).
    Word,
}

impl IntWidth {
    pub fn bits(self) -> u32 {
        match self {
            IntWidth::W8 => 8,
            IntWidth::W16 => 16,
            IntWidth::W32 => 32,
            IntWidth::W64 => 64,
            IntWidth::Word => usize::BITS,
        }
    }

    /// Two's-complement range for this width.
    pub fn signed_bounds(self) -> (i64, i64) {
        let bits = self.bits();
        if bits >= 64 {
            (i64::MIN, i64::MAX)
        } else {
            (-(1i64 << (bits - 1)), (1i64 << (bits - 1)) - 1)
        }
    }

    pub fn unsigned_max(self) -> u64 {
        let bits = self.bits();
        if bits >= 64 {
            u64::MAX
        } else {
            (1u64 << bits) - 1
        }
    }

    pub fn check_signed(self, value: i64) -> Result<i64, ConvertError> {
        let (min, max) = self.signed_bounds();
        if value < min || value > max {
            return Err(ConvertError::OutOfRange {
                value: value.into(),
                min: min.into(),
                max: max.into(),
            });
        }
        Ok(value)
    }

    pub fn check_unsigned(self, value: u64) -> Result<u64, ConvertError> {
        let max = self.unsigned_max();
        if value > max {
            return Err(ConvertError::OutOfRange {
                value: value.into(),
                min: 0,
                max: max.into(),
            });
        }
        Ok(value)
    }
}

pub fn parse_int(text: &str) -> Result<i64, ConvertError> {
    text.parse::<i64>().map_err(|e| match e.kind() {
        IntErrorKind::PosOverflow | IntErrorKind::NegOverflow => ConvertError::Overflow,
        _ => ConvertError::InvalidSyntax,
    })
}

pub fn parse_uint(text: &str) -> Result<u64, ConvertError> {
    text.parse::<u64>().map_err(|e| match e.kind() {
        IntErrorKind::PosOverflow => ConvertError::Overflow,
        _ => ConvertError::InvalidSyntax,
    })
}

pub fn parse_float(text: &str) -> Result<f64, ConvertError> {
    text.parse::<f64>().map_err(|_| ConvertError::InvalidSyntax)
}

/// Accepts `1 t T TRUE true True` and `0 f F FALSE false False`.
pub fn parse_bool(text: &str) -> Result<bool, ConvertError> {
    match text {
        "1" | "t" | "T" | "TRUE" | "true" | "True" => Ok(true),
        "0" | "f" | "F" | "FALSE" | "false" | "False" => Ok(false),
        _ => Err(ConvertError::InvalidSyntax),
    }
}

/// Split a flat-text list. Elements are trimmed; empty text is an empty list.
pub fn split_list(text: &str) -> Vec<String> {
    if text.trim().is_empty() {
        return Vec::new();
    }
    text.split(LIST_DELIMITER)
        .map(|item| item.trim().to_string())
        .collect()
}

pub fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(n) if n.is_f64() => "float",
        Value::Number(_) => "integer",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn mismatch(expected: &'static str, value: &Value) -> ConvertError {
    ConvertError::TypeMismatch {
        expected,
        found: value_kind(value),
    }
}

pub fn value_to_string(value: &Value) -> Result<String, ConvertError> {
    match value {
        Value::String(s) => Ok(s.clone()),
        other => Err(mismatch("string", other)),
    }
}

pub fn value_to_int(value: &Value) -> Result<i64, ConvertError> {
    match value {
        Value::Number(n) => {
            if let Some(v) = n.as_i64() {
                Ok(v)
            } else if n.is_u64() {
                Err(ConvertError::Overflow)
            } else {
                Err(mismatch("integer", value))
            }
        }
        other => Err(mismatch("integer", other)),
    }
}

pub fn value_to_uint(value: &Value) -> Result<u64, ConvertError> {
    match value {
        Value::Number(n) => {
            if let Some(v) = n.as_u64() {
                Ok(v)
            } else if n.is_i64() {
                Err(ConvertError::InvalidSyntax)
            } else {
                Err(mismatch("unsigned integer", value))
            }
        }
        other => Err(mismatch("unsigned integer", other)),
    }
}

pub fn value_to_float(value: &Value) -> Result<f64, ConvertError> {
    match value {
        Value::Number(n) => n.as_f64().ok_or(ConvertError::Overflow),
        other => Err(mismatch("float", other)),
    }
}

pub fn value_to_bool(value: &Value) -> Result<bool, ConvertError> {
    match value {
        Value::Bool(b) => Ok(*b),
        other => Err(mismatch("bool", other)),
    }
}

/// Text form of a scalar for text-decodable destinations.
pub fn value_to_text(value: &Value) -> Result<String, ConvertError> {
    match value {
        Value::String(s) => Ok(s.clone()),
        Value::Number(n) => Ok(n.to_string()),
        Value::Bool(b) => Ok(b.to_string()),
        other => Err(mismatch("text", other)),
    }
}
