//! Precedence, fallthrough and error aggregation across real sources

use bindconf::field::{int_field, string_field};
use bindconf::source::SourceId;
use bindconf::sources::{default_value, CliSource, EnvSource, JsonSource, MapSource};
use bindconf::{Dest, FieldOptions, Manager, Provenance, Source};
use serde_json::json;

#[test]
fn test_last_successful_source_wins() {
    let json = JsonSource::new(r#"{"vus": 3}"#);
    let env = EnvSource::new(["K6_VUS=5"]);
    let vus = Dest::new(0i64);

    let mut manager = Manager::new();
    manager.add_field(
        int_field(&vus, &[&default_value(1), &json.key("vus"), &env.var("K6_VUS")]),
        FieldOptions::new().name("vus"),
    );
    manager.consolidate().unwrap();

    assert_eq!(vus.get(), 5);
    let provenance = manager.field(&vus).unwrap().field().provenance();
    let env_ref: bindconf::SourceRef = env.clone();
    assert_eq!(provenance.source_id(), Some(SourceId::of(&env_ref)));
    assert_eq!(provenance.bound_name(), Some("K6_VUS"));
}

#[test]
fn test_missing_value_falls_through_to_earlier_source() {
    let json = JsonSource::new(r#"{"vus": 3}"#);
    let env = EnvSource::new(Vec::<String>::new());
    let vus = Dest::new(0i64);

    let mut manager = Manager::new();
    manager.add_field(
        int_field(&vus, &[&default_value(1), &json.key("vus"), &env.var("K6_VUS")]),
        FieldOptions::new().name("vus"),
    );
    manager.consolidate().unwrap();

    assert_eq!(vus.get(), 3);
    let provenance = manager.field(&vus).unwrap().field().provenance();
    assert_eq!(provenance.source_name(), Some("json"));
}

#[test]
fn test_errors_from_every_source_are_reported_in_order() {
    let json = JsonSource::new(r#"{"vus": "many"}"#);
    let env = EnvSource::new(["K6_VUS=lots"]);
    let cli = CliSource::new(["--vus", "7"]);
    let vus = Dest::new(0i64);

    let mut manager = Manager::new();
    manager.add_field(
        int_field(
            &vus,
            &[&default_value(1), &json.key("vus"), &env.var("K6_VUS"), &cli.flag("vus")],
        ),
        FieldOptions::new().name("vus"),
    );

    let err = manager.consolidate().unwrap_err();
    assert_eq!(
        err.messages(),
        vec![
            r#"vus: bind_int: parsing "\"many\"": expected integer, found string"#.to_string(),
            r#"vus: bind_int: parsing "lots": invalid syntax"#.to_string(),
        ]
    );
    // the CLI value still applied after the failures
    assert_eq!(vus.get(), 7);
}

#[test]
fn test_default_then_undefined_env_then_cli() {
    let env = EnvSource::new(["OTHER=1"]);
    let cli = CliSource::new(["--user-agent", "bar"]);
    let agent = Dest::new(String::new());

    let mut manager = Manager::new();
    manager.add_field(
        string_field(
            &agent,
            &[&default_value("foo"), &env.var("K6_USER_AGENT"), &cli.flag("user-agent")],
        ),
        FieldOptions::new().name("user_agent"),
    );

    assert!(manager.consolidate().is_ok());
    assert_eq!(agent.get(), "bar");
    match manager.field(&agent).unwrap().field().provenance() {
        Provenance::FromSource { source, bound_name } => {
            assert_eq!(source.name(), "CLI flags");
            assert_eq!(bound_name, "user-agent");
        }
        other => panic!("unexpected provenance {:?}", other),
    }
}

#[test]
fn test_only_defaults_resolve_to_default_provenance() {
    let env = EnvSource::new(Vec::<String>::new());
    let agent = Dest::new(String::new());
    let mut manager = Manager::new();
    manager.add_field(
        string_field(&agent, &[&default_value("foo"), &env.var("K6_USER_AGENT")]),
        FieldOptions::new(),
    );
    manager.consolidate().unwrap();

    assert_eq!(agent.get(), "foo");
    assert!(matches!(
        manager.field(&agent).unwrap().field().provenance(),
        Provenance::FromDefault
    ));
}

#[test]
fn test_map_source_nested_paths() {
    let map = MapSource::from_pairs([("dns", json!({"server": "1.1.1.1", "ttl": 30}))]);
    let server = Dest::new(String::new());
    let ttl = Dest::new(0i64);

    let mut manager = Manager::new();
    manager.add_field(
        string_field(&server, &[&default_value("8.8.8.8"), &map.key("dns").key("server")]),
        FieldOptions::new(),
    );
    manager.add_field(
        int_field(&ttl, &[&map.key("dns").key("ttl")]),
        FieldOptions::new(),
    );
    manager.consolidate().unwrap();

    assert_eq!(server.get(), "1.1.1.1");
    assert_eq!(ttl.get(), 30);
    assert_eq!(manager.field(&server).unwrap().name(), "dns.server");
    assert_eq!(map.name(), "map");
}
