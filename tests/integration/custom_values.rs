//! Escape hatches: custom decoders, custom bindings and user-defined sources

use bindconf::binder::{CustomBinder, RawValue};
use bindconf::duration::ExtendedDuration;
use bindconf::error::{BindValueError, ConvertError, SourceError};
use bindconf::field::{custom_field, text_field};
use bindconf::sources::{default_value, EnvSource, JsonSource};
use bindconf::{BindError, Binding, Dest, FieldOptions, Manager, Source, SourceRef};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::sync::Arc;

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
struct Scenario {
    executor: String,
    vus: u32,
}

fn scenarios_binding(
    binder: &dyn CustomBinder,
    dest: &Dest<BTreeMap<String, Scenario>>,
) -> Binding {
    let dest = dest.clone();
    binder.bind_custom_to(Box::new(move |raw: RawValue| -> Result<(), BindError> {
        let RawValue::Structured(value) = raw else {
            return Err(BindError::Custom("scenarios must be structured".to_string()));
        };
        let input = value.to_string();
        let parsed = serde_json::from_value(value).map_err(|e| {
            BindValueError::new("bind_scenarios", input, ConvertError::Decode(e.to_string()))
        })?;
        dest.set(parsed);
        Ok(())
    }))
}

#[test]
fn test_custom_decoder_for_structured_values() {
    let json = JsonSource::new(
        r#"{"scenarios": {"smoke": {"executor": "shared-iterations", "vus": 2}}}"#,
    );
    let scenarios = Dest::new(BTreeMap::new());

    let mut manager = Manager::new();
    manager.add_field(
        custom_field(&scenarios, vec![scenarios_binding(&json.key("scenarios"), &scenarios)]),
        FieldOptions::new().name("scenarios"),
    );
    manager.consolidate().unwrap();

    assert_eq!(
        scenarios.get().get("smoke"),
        Some(&Scenario {
            executor: "shared-iterations".to_string(),
            vus: 2
        })
    );
}

#[test]
fn test_custom_decoder_error_is_a_value_error() {
    let json = JsonSource::new(r#"{"scenarios": {"smoke": {"vus": "two"}}}"#);
    let scenarios = Dest::new(BTreeMap::new());

    let mut manager = Manager::new();
    manager.add_field(
        custom_field(&scenarios, vec![scenarios_binding(&json.key("scenarios"), &scenarios)]),
        FieldOptions::new().name("scenarios"),
    );
    let err = manager.consolidate().unwrap_err();
    assert!(err.messages()[0].starts_with("scenarios: bind_scenarios: parsing "));
}

#[test]
fn test_text_decodable_duration_across_sources() {
    let env = EnvSource::new(["K6_DURATION=1d12h"]);
    let duration = Dest::new(ExtendedDuration::default());
    let mut manager = Manager::new();
    manager.add_field(
        text_field(&duration, &[&default_value("30s"), &env.var("K6_DURATION")]),
        FieldOptions::new().name("duration"),
    );
    manager.consolidate().unwrap();
    assert_eq!(duration.get().to_string(), "36h0m0s");

    let env = EnvSource::new(["K6_DURATION=soon"]);
    let mut manager = Manager::new();
    manager.add_field(
        text_field(&duration, &[&env.var("K6_DURATION")]),
        FieldOptions::new().name("duration"),
    );
    let err = manager.consolidate().unwrap_err();
    assert_eq!(
        err.messages(),
        vec![r#"duration: bind_text: parsing "soon": invalid duration "soon""#.to_string()]
    );
}

/// Source backed by a fixed table, standing in for an application-specific store.
struct Secrets {
    values: BTreeMap<&'static str, &'static str>,
}

impl Source for Secrets {
    fn initialize(&self) -> Result<(), SourceError> {
        Ok(())
    }

    fn name(&self) -> &str {
        "secrets"
    }
}

#[test]
fn test_user_defined_source_participates_in_precedence() {
    let secrets = Arc::new(Secrets {
        values: BTreeMap::from([("api_token", "s3cr3t")]),
    });
    let token = Dest::new(String::new());

    let lookup = Arc::clone(&secrets);
    let dest = token.clone();
    let source: SourceRef = secrets;
    let from_secrets = Binding::from_source(source, "api_token", move || {
        let value = lookup
            .values
            .get("api_token")
            .ok_or_else(|| BindError::field_missing("secrets", "api_token"))?;
        dest.set(value.to_string());
        Ok(())
    });

    let mut manager = Manager::new();
    manager.add_field(
        custom_field(&token, vec![from_secrets]),
        FieldOptions::new().required(),
    );
    manager.consolidate().unwrap();

    assert_eq!(token.get(), "s3cr3t");
    let managed = manager.field(&token).unwrap();
    assert_eq!(managed.name(), "api_token");
    assert_eq!(managed.field().provenance().source_name(), Some("secrets"));
}
