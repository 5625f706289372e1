//! Bindconf: Layered Configuration Value Resolution
//!
//! Declare each configuration value once against an ordered list of sources
//! (defaults, environment variables, JSON or TOML documents, CLI arguments,
//! programmatic maps). A [`Manager`] initializes the sources, resolves every
//! field with last-success-wins precedence, validates the results and reports
//! every problem found in the first failing phase.
//!
//! ```
//! use bindconf::field::uint_field;
//! use bindconf::sources::{default_value, CliSource, EnvSource};
//! use bindconf::{Dest, FieldOptions, Manager};
//!
//! let env = EnvSource::new(["K6_VUS=5"]);
//! let cli = CliSource::new(["--vus", "8"]);
//!
//! let vus = Dest::new(0u32);
//! let mut manager = Manager::new();
//! manager.add_field(
//!     uint_field(&vus, &[&default_value(1), &env.var("K6_VUS"), &cli.flag("vus")]),
//!     FieldOptions::new().name("vus"),
//! );
//! manager.consolidate().unwrap();
//! assert_eq!(vus.get(), 8);
//! ```

pub mod binder;
pub mod binding;
pub mod dest;
pub mod duration;
pub mod error;
pub mod field;
pub mod logging;
pub mod managed;
pub mod manager;
pub mod report;
pub mod source;
pub mod sources;

pub use binder::{Binder, RawValue};
pub use binding::{Binding, Origin, Provenance};
pub use dest::Dest;
pub use error::{BindError, ConfigError, SourceError, ValidationError};
pub use field::Field;
pub use managed::{FieldOptions, ManagedField};
pub use manager::Manager;
pub use source::{Source, SourceRef};
