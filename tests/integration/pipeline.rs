//! Phase gating, required fields, validators and repeated consolidation

use bindconf::error::Phase;
use bindconf::field::{bool_field, int_field, string_field, Field};
use bindconf::sources::{default_value, CliSource, EnvSource, JsonSource};
use bindconf::{Binding, Dest, FieldOptions, Manager, SourceRef, ValidationError};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

fn spy(source: SourceRef, calls: &Arc<AtomicUsize>) -> Binding {
    let calls = Arc::clone(calls);
    Binding::from_source(source, "spy", move || {
        calls.fetch_add(1, Ordering::SeqCst);
        Ok(())
    })
}

#[test]
fn test_source_failure_never_applies_bindings() {
    let broken = JsonSource::new("{\"vus\": 1,");
    let env = EnvSource::new(["K6_VUS=2"]);
    let calls = Arc::new(AtomicUsize::new(0));

    let dest = Dest::new(0i64);
    let env_ref: SourceRef = env.clone();
    let broken_ref: SourceRef = broken.clone();
    let mut manager = Manager::new();
    manager.add_field(
        Field::new(&dest, vec![spy(env_ref, &calls), spy(broken_ref, &calls)]),
        FieldOptions::new(),
    );

    let err = manager.consolidate().unwrap_err();
    assert_eq!(err.phase(), Phase::Sources);
    assert_eq!(err.len(), 1);
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[test]
fn test_required_field_needs_a_real_source() {
    let env = EnvSource::new(Vec::<String>::new());
    let vus = Dest::new(0i64);
    let mut manager = Manager::new();
    manager.add_field(
        int_field(&vus, &[&default_value(1), &env.var("K6_VUS")]),
        FieldOptions::new().name("vus").required(),
    );

    let err = manager.consolidate().unwrap_err();
    assert_eq!(
        err.to_string(),
        "Validation errors:\n\t- field vus is required, but no value was set"
    );

    let env = EnvSource::new(["K6_VUS=4"]);
    let vus = Dest::new(0i64);
    let mut manager = Manager::new();
    manager.add_field(
        int_field(&vus, &[&default_value(1), &env.var("K6_VUS")]),
        FieldOptions::new().name("vus").required(),
    );
    assert!(manager.consolidate().is_ok());
    assert_eq!(vus.get(), 4);
}

#[test]
fn test_validator_errors_are_collected_across_fields() {
    let cli = CliSource::new(["--vus", "0", "--user-agent", ""]);
    let vus = Dest::new(0i64);
    let agent = Dest::new(String::new());

    let mut manager = Manager::new();
    manager.add_field(
        int_field(&vus, &[&default_value(1), &cli.flag("vus")]),
        FieldOptions::new()
            .name("vus")
            .validator(|v: &i64| if *v > 0 { Ok(()) } else { Err("must be positive") }),
    );
    manager.add_field(
        string_field(&agent, &[&default_value("k6"), &cli.flag("user-agent")]),
        FieldOptions::new()
            .name("user_agent")
            .validator(|v: &String| if v.is_empty() { Err("must not be empty") } else { Ok(()) }),
    );

    match manager.consolidate().unwrap_err() {
        bindconf::ConfigError::Validation(errors) => {
            assert_eq!(errors.len(), 2);
            assert!(matches!(&errors[0], ValidationError::Rejected { field, .. } if field == "vus"));
            assert_eq!(errors[1].to_string(), "field user_agent is invalid: must not be empty");
        }
        other => panic!("unexpected error {}", other),
    }
}

#[test]
fn test_second_consolidation_only_resolves_new_fields() {
    let cli = CliSource::new(["run", "--throw"]);
    cli.declare_unary("throw", None);
    let env = EnvSource::new(Vec::<String>::new());
    let calls = Arc::new(AtomicUsize::new(0));

    let command = Dest::new(String::new());
    let counted = Dest::new(0i64);
    let env_ref: SourceRef = env.clone();
    let mut manager = Manager::new();
    manager.add_field(
        string_field(&command, &[&default_value("help"), &cli.positional(0)]),
        FieldOptions::new().name("command"),
    );
    manager.add_field(
        Field::new(&counted, vec![spy(env_ref, &calls)]),
        FieldOptions::new(),
    );
    manager.consolidate().unwrap();
    assert_eq!(command.get(), "run");
    assert_eq!(calls.load(Ordering::SeqCst), 1);

    let throw = Dest::new(false);
    manager.add_field(
        bool_field(&throw, &[&default_value(false), &cli.flag("throw")]),
        FieldOptions::new().name("throw"),
    );
    manager.consolidate().unwrap();
    assert!(throw.get());
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert_eq!(manager.sources().len(), 2);
}
