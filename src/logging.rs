//! Logging System
//!
//! Structured logging on top of `tracing`. The library itself only emits
//! events; binaries call [`init_logging`] once to install a subscriber.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;
use tracing_subscriber::fmt::time::ChronoUtc;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Registry};

/// Environment variable holding a full filter directive; overrides the configured level.
pub const LOG_FILTER_ENV: &str = "BINDCONF_LOG";

#[derive(Debug, Error)]
pub enum LoggingError {
    #[error("invalid log format: {0} (must be 'json' or 'text')")]
    InvalidFormat(String),

    #[error("invalid log output: {0} (must be 'stdout' or 'stderr')")]
    InvalidOutput(String),

    #[error("invalid log directive {directive:?}: {reason}")]
    InvalidDirective { directive: String, reason: String },

    #[error("logging already initialized: {0}")]
    AlreadyInitialized(String),
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level: trace, debug, info, warn, error, off
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Output format: json, text
    #[serde(default = "default_format")]
    pub format: String,

    /// Output destination: stdout, stderr
    #[serde(default = "default_output")]
    pub output: String,

    /// Colored output (text format only)
    #[serde(default = "default_true")]
    pub color: bool,

    /// Module-specific log levels
    #[serde(default)]
    pub modules: HashMap<String, String>,
}

fn default_log_level() -> String {
    "warn".to_string()
}

fn default_format() -> String {
    "text".to_string()
}

fn default_output() -> String {
    "stderr".to_string()
}

fn default_true() -> bool {
    true
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_format(),
            output: default_output(),
            color: default_true(),
            modules: HashMap::new(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Format {
    Text,
    Json,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Output {
    Stdout,
    Stderr,
}

/// Install the global subscriber.
///
/// `BINDCONF_LOG` wins over the configured level and module directives.
pub fn init_logging(config: &LoggingConfig) -> Result<(), LoggingError> {
    let filter = build_env_filter(config)?;
    let format = parse_format(&config.format)?;
    let output = parse_output(&config.output)?;
    let base = Registry::default().with(filter);

    let installed = match (format, output) {
        (Format::Json, Output::Stdout) => base
            .with(
                fmt::layer()
                    .json()
                    .with_target(true)
                    .with_timer(ChronoUtc::rfc_3339())
                    .with_writer(std::io::stdout),
            )
            .try_init(),
        (Format::Json, Output::Stderr) => base
            .with(
                fmt::layer()
                    .json()
                    .with_target(true)
                    .with_timer(ChronoUtc::rfc_3339())
                    .with_writer(std::io::stderr),
            )
            .try_init(),
        (Format::Text, Output::Stdout) => base
            .with(
                fmt::layer()
                    .with_target(true)
                    .with_timer(ChronoUtc::rfc_3339())
                    .with_ansi(config.color)
                    .with_writer(std::io::stdout),
            )
            .try_init(),
        (Format::Text, Output::Stderr) => base
            .with(
                fmt::layer()
                    .with_target(true)
                    .with_timer(ChronoUtc::rfc_3339())
                    .with_ansi(config.color)
                    .with_writer(std::io::stderr),
            )
            .try_init(),
    };

    installed.map_err(|e| LoggingError::AlreadyInitialized(e.to_string()))
}

fn build_env_filter(config: &LoggingConfig) -> Result<EnvFilter, LoggingError> {
    if let Ok(filter) = EnvFilter::try_from_env(LOG_FILTER_ENV) {
        return Ok(filter);
    }

    if config.level == "off" {
        return Ok(EnvFilter::new("off"));
    }

    let mut filter = EnvFilter::new(&config.level);
    for (module, level) in &config.modules {
        let directive = format!("{}={}", module, level);
        let parsed = directive
            .parse()
            .map_err(|e: tracing_subscriber::filter::ParseError| LoggingError::InvalidDirective {
                directive: directive.clone(),
                reason: e.to_string(),
            })?;
        filter = filter.add_directive(parsed);
    }
    Ok(filter)
}

fn parse_format(format: &str) -> Result<Format, LoggingError> {
    match format {
        "text" => Ok(Format::Text),
        "json" => Ok(Format::Json),
        other => Err(LoggingError::InvalidFormat(other.to_string())),
    }
}

fn parse_output(output: &str) -> Result<Output, LoggingError> {
    match output {
        "stdout" => Ok(Output::Stdout),
        "stderr" => Ok(Output::Stderr),
        other => Err(LoggingError::InvalidOutput(other.to_string())),
    }
}
