//! Extended duration values
//!
//! Accepts Go-style duration strings (`1h30m`, `250ms`, `1.5h`, `-2m`), a day
//! prefix (`2d`, `1d12h`) and bare numbers, which are milliseconds. Rendering
//! uses the Go layout (`1m30s`, `48h0m0s`, `1.5ms`).

use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

const NANOS_PER_MICRO: u64 = 1_000;
const NANOS_PER_MILLI: u64 = 1_000_000;
const NANOS_PER_SEC: u64 = 1_000_000_000;
const NANOS_PER_MINUTE: u64 = 60 * NANOS_PER_SEC;
const NANOS_PER_HOUR: u64 = 60 * NANOS_PER_MINUTE;
const NANOS_PER_DAY: i64 = 24 * NANOS_PER_HOUR as i64;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DurationError {
    #[error("invalid duration {0:?}")]
    Invalid(String),

    #[error("missing unit in duration {0:?}")]
    MissingUnit(String),

    #[error("unknown unit {unit:?} in duration {input:?}")]
    UnknownUnit { unit: String, input: String },

    #[error("duration {0:?} is out of range")]
    OutOfRange(String),
}

/// A signed duration with nanosecond precision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ExtendedDuration(chrono::Duration);

impl ExtendedDuration {
    pub fn new(duration: chrono::Duration) -> Self {
        Self(duration)
    }

    pub fn from_nanos(nanos: i64) -> Self {
        Self(chrono::Duration::nanoseconds(nanos))
    }

    pub fn as_duration(&self) -> chrono::Duration {
        self.0
    }

    /// `None` for negative durations.
    pub fn to_std(&self) -> Option<std::time::Duration> {
        self.0.to_std().ok()
    }

    fn nanos(&self) -> i64 {
        // saturates past ~292 years
        match self.0.num_nanoseconds() {
            Some(nanos) => nanos,
            None if self.0 < chrono::Duration::zero() => i64::MIN,
            None => i64::MAX,
        }
    }
}

impl Default for ExtendedDuration {
    fn default() -> Self {
        Self(chrono::Duration::zero())
    }
}

impl From<chrono::Duration> for ExtendedDuration {
    fn from(duration: chrono::Duration) -> Self {
        Self(duration)
    }
}

impl FromStr for ExtendedDuration {
    type Err = DurationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_extended(s).map(Self::from_nanos)
    }
}

impl fmt::Display for ExtendedDuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&format_go(self.nanos()))
    }
}

/// Serialized in its text form.
impl Serialize for ExtendedDuration {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for ExtendedDuration {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        text.parse().map_err(de::Error::custom)
    }
}

fn parse_extended(data: &str) -> Result<i64, DurationError> {
    if let Ok(millis) = data.parse::<f64>() {
        let nanos = millis * NANOS_PER_MILLI as f64;
        if !nanos.is_finite() || nanos.abs() >= i64::MAX as f64 {
            return Err(DurationError::OutOfRange(data.to_string()));
        }
        return Ok(nanos as i64);
    }

    let Some(d_pos) = data.find('d') else {
        return parse_go(data);
    };

    let mut rest = 0i64;
    let tail = &data[d_pos + 1..];
    if !tail.is_empty() {
        rest = parse_go(tail)?;
        if rest < 0 {
            return Err(DurationError::Invalid(tail.to_string()));
        }
    }

    let days: i64 = data[..d_pos]
        .parse()
        .map_err(|_| DurationError::Invalid(data.to_string()))?;
    if days < 0 {
        rest = -rest;
    }
    days.checked_mul(NANOS_PER_DAY)
        .and_then(|d| d.checked_add(rest))
        .ok_or_else(|| DurationError::OutOfRange(data.to_string()))
}

fn unit_nanos(unit: &str) -> Option<u64> {
    match unit {
        "ns" => Some(1),
        "us" | "µs" | "μs" => Some(NANOS_PER_MICRO),
        "ms" => Some(NANOS_PER_MILLI),
        "s" => Some(NANOS_PER_SEC),
        "m" => Some(NANOS_PER_MINUTE),
        "h" => Some(NANOS_PER_HOUR),
        _ => None,
    }
}

/// `[-+]?([0-9]*(\.[0-9]*)?[a-z]+)+`, or a lone `0`.
fn parse_go(input: &str) -> Result<i64, DurationError> {
    let invalid = || DurationError::Invalid(input.to_string());
    let out_of_range = || DurationError::OutOfRange(input.to_string());

    let (negative, mut s) = match input.as_bytes().first() {
        Some(b'-') => (true, &input[1..]),
        Some(b'+') => (false, &input[1..]),
        _ => (false, input),
    };
    if s == "0" {
        return Ok(0);
    }
    if s.is_empty() {
        return Err(invalid());
    }

    let mut total: u64 = 0;
    while !s.is_empty() {
        let int_len = s.bytes().take_while(u8::is_ascii_digit).count();
        let whole: u64 = if int_len > 0 {
            s[..int_len].parse().map_err(|_| out_of_range())?
        } else {
            0
        };
        s = &s[int_len..];

        let mut fraction = 0f64;
        let mut frac_len = 0;
        if let Some(after_dot) = s.strip_prefix('.') {
            frac_len = after_dot.bytes().take_while(u8::is_ascii_digit).count();
            if frac_len > 0 {
                fraction = format!("0.{}", &after_dot[..frac_len])
                    .parse()
                    .map_err(|_| invalid())?;
            }
            s = &after_dot[frac_len..];
        }
        if int_len == 0 && frac_len == 0 {
            return Err(invalid());
        }

        let unit_len = s
            .find(|c: char| c == '.' || c.is_ascii_digit())
            .unwrap_or(s.len());
        if unit_len == 0 {
            return Err(DurationError::MissingUnit(input.to_string()));
        }
        let unit = &s[..unit_len];
        let scale = unit_nanos(unit).ok_or_else(|| DurationError::UnknownUnit {
            unit: unit.to_string(),
            input: input.to_string(),
        })?;
        s = &s[unit_len..];

        let component = whole
            .checked_mul(scale)
            .and_then(|v| v.checked_add((fraction * scale as f64) as u64))
            .ok_or_else(out_of_range)?;
        total = total.checked_add(component).ok_or_else(out_of_range)?;
    }

    if negative {
        0i64.checked_sub_unsigned(total).ok_or_else(out_of_range)
    } else {
        i64::try_from(total).map_err(|_| out_of_range())
    }
}

fn format_go(nanos: i64) -> String {
    if nanos == 0 {
        return "0s".to_string();
    }
    let sign = if nanos < 0 { "-" } else { "" };
    let u = nanos.unsigned_abs();

    let body = if u < NANOS_PER_MICRO {
        format!("{}ns", u)
    } else if u < NANOS_PER_MILLI {
        format!("{}µs", decimal(u, NANOS_PER_MICRO))
    } else if u < NANOS_PER_SEC {
        format!("{}ms", decimal(u, NANOS_PER_MILLI))
    } else {
        let hours = u / NANOS_PER_HOUR;
        let minutes = (u % NANOS_PER_HOUR) / NANOS_PER_MINUTE;
        let seconds = decimal(u % NANOS_PER_MINUTE, NANOS_PER_SEC);
        if hours > 0 {
            format!("{}h{}m{}s", hours, minutes, seconds)
        } else if minutes > 0 {
            format!("{}m{}s", minutes, seconds)
        } else {
            format!("{}s", seconds)
        }
    };
    format!("{}{}", sign, body)
}

/// `value / unit` with the remainder as trimmed decimal digits.
fn decimal(value: u64, unit: u64) -> String {
    let whole = value / unit;
    let rem = value % unit;
    if rem == 0 {
        return whole.to_string();
    }
    let width = unit.ilog10() as usize;
    let digits = format!("{:0width$}", rem, width = width);
    format!("{}.{}", whole, digits.trim_end_matches('0'))
}
