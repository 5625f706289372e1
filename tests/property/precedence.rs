//! Property-based tests for last-success-wins precedence

use bindconf::binder::IntBinder;
use bindconf::field::int_field;
use bindconf::sources::{default_value, CliSource, EnvSource, JsonSource};
use bindconf::{Dest, FieldOptions, Manager, Provenance};
use proptest::prelude::*;

/// The highest-precedence present value wins, whatever subset is present
#[test]
fn test_last_present_source_wins() {
    let mut runner = proptest::test_runner::TestRunner::default();
    let layer = proptest::option::of(-1000i64..1000);

    runner
        .run(
            &(layer.clone(), layer.clone(), layer.clone(), layer),
            |(default, json, env, cli)| {
                let json_source = JsonSource::new(match json {
                    Some(v) => format!(r#"{{"vus": {}}}"#, v),
                    None => String::new(),
                });
                let env_source = EnvSource::new(env.map(|v| format!("K6_VUS={}", v)));
                let cli_source = CliSource::new(match cli {
                    Some(v) => vec![format!("--vus={}", v)],
                    None => Vec::new(),
                });

                let default_binder = default_value(default.unwrap_or(0));
                let json_binder = json_source.key("vus");
                let env_binder = env_source.var("K6_VUS");
                let cli_binder = cli_source.flag("vus");
                let mut binders: Vec<&dyn IntBinder> = Vec::new();
                if default.is_some() {
                    binders.push(&default_binder);
                }
                binders.push(&json_binder);
                binders.push(&env_binder);
                binders.push(&cli_binder);

                let vus = Dest::new(i64::MIN);
                let mut manager = Manager::new();
                manager.add_field(int_field(&vus, &binders), FieldOptions::new().name("vus"));
                manager.consolidate().unwrap();

                let expected = cli.or(env).or(json).or(default);
                assert_eq!(vus.get(), expected.unwrap_or(i64::MIN));

                let provenance = manager.field(&vus).unwrap().field().provenance();
                let source_set = cli.or(env).or(json).is_some();
                match provenance {
                    Provenance::FromSource { .. } => assert!(source_set),
                    Provenance::FromDefault => assert!(!source_set && default.is_some()),
                    Provenance::Unset => assert!(expected.is_none()),
                }
                Ok(())
            },
        )
        .unwrap();
}
