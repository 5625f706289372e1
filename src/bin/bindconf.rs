//! Bindconf demo binary
//!
//! Resolves a small load-test configuration in two stages. The global stage
//! picks the sub-command, the JSON config path and logging options; the run
//! stage reads the JSON file and resolves the run options from
//! default → JSON → environment → CLI. Both stages share one manager, so the
//! final report covers every field.

use anyhow::{bail, Context, Result};
use bindconf::duration::ExtendedDuration;
use bindconf::field::{
    bool_field, int_field, int_list_field, string_field, string_list_field, text_field,
};
use bindconf::logging::{init_logging, LoggingConfig};
use bindconf::report::{render_json, render_table, ConfigReport};
use bindconf::sources::{default_value, CliSource, EnvSource, JsonSource};
use bindconf::{Dest, FieldOptions, Manager};
use clap::{Parser, ValueEnum};
use owo_colors::OwoColorize;
use serde::Serialize;
use std::io::ErrorKind;
use std::process;
use std::sync::Arc;
use tracing::{debug, info, warn};

#[derive(Parser, Debug)]
#[command(name = "bindconf")]
#[command(about = "Resolve a layered configuration and show where each value came from")]
#[command(version)]
struct Cli {
    /// How to print the provenance report
    #[arg(long, value_enum, default_value_t = ReportFormat::Text)]
    report: ReportFormat,

    /// Configuration arguments, e.g. `run --vus 10 -d 2m --throw`
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    args: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum ReportFormat {
    Text,
    Json,
}

/// Flags bound as booleans in the run stage; the global stage parses first.
const UNARY_FLAGS: &[(&str, Option<&str>)] = &[("throw", Some("w"))];

struct GlobalConfig {
    sub_command: Dest<String>,
    config_path: Dest<String>,
    log_level: Dest<String>,
    log_format: Dest<String>,
}

impl GlobalConfig {
    fn declare(manager: &mut Manager, cli: &Arc<CliSource>, env: &Arc<EnvSource>) -> Self {
        let conf = Self {
            sub_command: Dest::new(String::new()),
            config_path: Dest::new(String::new()),
            log_level: Dest::new(String::new()),
            log_format: Dest::new(String::new()),
        };

        manager.add_field(
            string_field(&conf.sub_command, &[&default_value("run"), &cli.positional(0)]),
            FieldOptions::new()
                .name("sub_command")
                .description("command to execute")
                .validator(|cmd: &String| match cmd.as_str() {
                    "run" => Ok(()),
                    other => Err(format!("unknown sub-command {}", other)),
                }),
        );
        manager.add_field(
            string_field(
                &conf.config_path,
                &[
                    &default_value("config.json"),
                    &env.var("K6_CONFIG"),
                    &cli.flag_with_short("config", "c"),
                ],
            ),
            FieldOptions::new()
                .name("config")
                .description("path to the JSON config file"),
        );
        manager.add_field(
            string_field(
                &conf.log_level,
                &[
                    &default_value("warn"),
                    &env.var("BINDCONF_LOG_LEVEL"),
                    &cli.flag("log-level"),
                ],
            ),
            FieldOptions::new().name("log_level").description("log level"),
        );
        manager.add_field(
            string_field(
                &conf.log_format,
                &[
                    &default_value("text"),
                    &env.var("BINDCONF_LOG_FORMAT"),
                    &cli.flag("log-format"),
                ],
            ),
            FieldOptions::new()
                .name("log_format")
                .description("log format: text or json"),
        );
        conf
    }

    fn logging(&self) -> LoggingConfig {
        LoggingConfig {
            level: self.log_level.get(),
            format: self.log_format.get(),
            ..LoggingConfig::default()
        }
    }
}

/// Resolved run options, printed as JSON.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct RunConfig {
    user_agent: String,
    vus: i64,
    duration: ExtendedDuration,
    tags: Vec<String>,
    throw: bool,
    tiny_arr: Vec<i8>,
    dns_server: String,
}

struct RunFields {
    user_agent: Dest<String>,
    vus: Dest<i64>,
    duration: Dest<ExtendedDuration>,
    tags: Dest<Vec<String>>,
    throw: Dest<bool>,
    tiny_arr: Dest<Vec<i8>>,
    dns_server: Dest<String>,
}

impl RunFields {
    fn declare(
        manager: &mut Manager,
        cli: &Arc<CliSource>,
        env: &Arc<EnvSource>,
        json: &Arc<JsonSource>,
    ) -> Self {
        let fields = Self {
            user_agent: Dest::default(),
            vus: Dest::default(),
            duration: Dest::default(),
            tags: Dest::default(),
            throw: Dest::default(),
            tiny_arr: Dest::default(),
            dns_server: Dest::default(),
        };

        manager.add_field(
            string_field(
                &fields.user_agent,
                &[
                    &default_value(concat!("bindconf demo v", env!("CARGO_PKG_VERSION"))),
                    &json.key("userAgent"),
                    &env.var("K6_USER_AGENT"),
                    &cli.flag("user-agent"),
                ],
            ),
            FieldOptions::new()
                .name("user_agent")
                .description("user agent for http requests"),
        );
        manager.add_field(
            int_field(
                &fields.vus,
                &[
                    &default_value(1),
                    &json.key("vus"),
                    &env.var("K6_VUS"),
                    &cli.flag_with_short("vus", "u"),
                ],
            ),
            FieldOptions::new()
                .name("vus")
                .description("number of virtual users")
                .validator(|vus: &i64| {
                    if *vus > 0 {
                        Ok(())
                    } else {
                        Err(format!("must be positive, got {}", vus))
                    }
                }),
        );
        manager.add_field(
            text_field(
                &fields.duration,
                &[
                    &default_value("30s"),
                    &json.key("duration"),
                    &env.var("K6_DURATION"),
                    &cli.flag_with_short("duration", "d"),
                ],
            ),
            FieldOptions::new()
                .name("duration")
                .description("test duration, e.g. 1m30s, 2d or 1500 (ms)"),
        );
        manager.add_field(
            string_list_field(
                &fields.tags,
                &[
                    &default_value(Vec::<String>::new()),
                    &json.key("tags"),
                    &env.var("K6_TAGS"),
                    &cli.flag("tag"),
                ],
            ),
            FieldOptions::new()
                .name("tags")
                .description("run tags; repeat --tag or separate with commas"),
        );
        manager.add_field(
            bool_field(
                &fields.throw,
                &[
                    &default_value(false),
                    &json.key("throw"),
                    &env.var("K6_THROW"),
                    &cli.flag_with_short("throw", "w"),
                ],
            ),
            FieldOptions::new()
                .name("throw")
                .description("throw on failed requests"),
        );
        manager.add_field(
            int_list_field(
                &fields.tiny_arr,
                &[
                    &json.key("tinyArr"),
                    &env.var("K6_TINY_ARR"),
                    &cli.flag("tiny-arr"),
                ],
            ),
            FieldOptions::new()
                .name("tiny_arr")
                .description("list of 8-bit signed integers"),
        );
        manager.add_field(
            string_field(
                &fields.dns_server,
                &[
                    &default_value("8.8.8.8"),
                    &json.key("dns").key("server"),
                    &env.var("K6_DNS_SERVER"),
                    &cli.flag("dns-server"),
                ],
            ),
            FieldOptions::new()
                .name("dns_server")
                .description("DNS resolver address"),
        );
        fields
    }

    fn resolved(&self) -> RunConfig {
        RunConfig {
            user_agent: self.user_agent.get(),
            vus: self.vus.get(),
            duration: self.duration.get(),
            tags: self.tags.get(),
            throw: self.throw.get(),
            tiny_arr: self.tiny_arr.get(),
            dns_server: self.dns_server.get(),
        }
    }
}

fn main() {
    let cli = Cli::parse();
    if let Err(e) = run(cli) {
        eprintln!("{} {:#}", "error:".red().bold(), e);
        process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let cli_source = CliSource::new(cli.args);
    for (long, short) in UNARY_FLAGS {
        cli_source.declare_unary(long, *short);
    }
    let env = EnvSource::from_process();

    let mut manager = Manager::new();
    let global = GlobalConfig::declare(&mut manager, &cli_source, &env);
    manager.consolidate()?;

    if let Err(e) = init_logging(&global.logging()) {
        bail!("failed to initialize logging: {}", e);
    }
    info!(command = %global.sub_command.get(), "global configuration resolved");

    let json = JsonSource::new(read_config_file(&manager, &global.config_path)?);
    let fields = RunFields::declare(&mut manager, &cli_source, &env, &json);
    manager.consolidate()?;
    debug!(fields = manager.fields().len(), "run configuration resolved");

    let resolved = serde_json::to_string_pretty(&fields.resolved())
        .context("failed to serialize the resolved configuration")?;
    println!("{}\n", resolved);

    let report = ConfigReport::new(manager.report());
    match cli.report {
        ReportFormat::Text => print!("{}", render_table(&report)),
        ReportFormat::Json => println!("{}", render_json(&report)?),
    }
    Ok(())
}

/// Read the JSON config. A missing file is only an error when its path was
/// set explicitly.
fn read_config_file(manager: &Manager, path: &Dest<String>) -> Result<Vec<u8>> {
    let path_value = path.get();
    match std::fs::read(&path_value) {
        Ok(bytes) => {
            debug!(path = %path_value, bytes = bytes.len(), "read config file");
            Ok(bytes)
        }
        Err(e) => {
            let explicit = manager
                .field(path)
                .map(|f| f.field().provenance().is_from_source())
                .unwrap_or(false);
            if explicit {
                return Err(e).with_context(|| format!("could not open config file {}", path_value));
            }
            if e.kind() != ErrorKind::NotFound {
                warn!(path = %path_value, error = %e, "could not open config file");
            }
            Ok(Vec::new())
        }
    }
}
