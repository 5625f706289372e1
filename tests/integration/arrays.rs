//! Lazy array bindings and list fields

use bindconf::binder::convert::IntWidth;
use bindconf::binder::{ArrayBinder, ArraySlot, IntBinder, StringBinder};
use bindconf::field::{list_field_with, read_list, read_string, string_list_field, uint_list_field};
use bindconf::sources::{CliSource, EnvSource, JsonSource, TomlSource};
use bindconf::{BindError, Dest, FieldOptions, Manager, Source};

#[test]
fn test_elements_parse_only_when_applied() {
    let env = EnvSource::new(["K6_TINY_ARR=1,foo,3"]);
    let slot: ArraySlot = Dest::new(None);
    env.var("K6_TINY_ARR")
        .bind_array_to(slot.clone())
        .apply()
        .unwrap();

    let elements = slot.take().unwrap();
    assert_eq!(elements.len(), 3);

    let last = Dest::new(0i64);
    elements
        .element(2)
        .unwrap()
        .bind_int_to(last.clone(), IntWidth::W8)
        .apply()
        .unwrap();
    assert_eq!(last.get(), 3);

    let foo = elements.element(1).unwrap();
    let text = Dest::new(String::new());
    foo.bind_string_to(text.clone()).apply().unwrap();
    assert_eq!(text.get(), "foo");
    assert!(foo.bind_int_to(Dest::new(0), IntWidth::W8).apply().is_err());
}

#[test]
fn test_element_past_the_end() {
    let json = JsonSource::new(r#"{"tinyArr": [1, 2, 3]}"#);
    json.initialize().unwrap();
    let slot: ArraySlot = Dest::new(None);
    json.key("tinyArr").bind_array_to(slot.clone()).apply().unwrap();

    let err = slot.take().unwrap().element(5).err().unwrap();
    assert_eq!(
        err,
        BindError::ElementOutOfRange {
            name: "tinyArr[5]".to_string(),
            index: 5,
            len: 3
        }
    );
    assert_eq!(
        err.to_string(),
        "tried to access invalid element tinyArr[5], array only has 3 elements"
    );
}

#[test]
fn test_empty_env_value_is_an_empty_list() {
    let env = EnvSource::new(["K6_TAGS="]);
    let tags = Dest::new(vec!["preset".to_string()]);
    let mut manager = Manager::new();
    manager.add_field(string_list_field(&tags, &[&env.var("K6_TAGS")]), FieldOptions::new());
    manager.consolidate().unwrap();
    assert!(tags.get().is_empty());
}

#[test]
fn test_repeated_cli_flags_override_env_list() {
    let env = EnvSource::new(["K6_PORTS=80,443"]);
    let cli = CliSource::new(["--port", "8080", "--port", "8443,9443"]);
    let ports = Dest::new(Vec::<u16>::new());

    let mut manager = Manager::new();
    manager.add_field(
        uint_list_field(&ports, &[&env.var("K6_PORTS"), &cli.flag("port")]),
        FieldOptions::new().name("ports"),
    );
    manager.consolidate().unwrap();
    assert_eq!(ports.get(), vec![8080, 8443, 9443]);
}

#[test]
fn test_nested_lists_from_toml() {
    let toml = TomlSource::new(
        r#"
[scenarios]
groups = [["login", "browse"], ["checkout"]]
"#,
    );
    let groups = Dest::new(Vec::<Vec<String>>::new());

    let mut manager = Manager::new();
    manager.add_field(
        list_field_with(&groups, &[&toml.key("scenarios").key("groups")], |el| {
            read_list(el, read_string)
        }),
        FieldOptions::new().name("groups"),
    );
    manager.consolidate().unwrap();
    assert_eq!(
        groups.get(),
        vec![
            vec!["login".to_string(), "browse".to_string()],
            vec!["checkout".to_string()]
        ]
    );
}

#[test]
fn test_array_binding_on_scalar_json_value() {
    let json = JsonSource::new(r#"{"tags": "smoke"}"#);
    let tags = Dest::new(Vec::<String>::new());
    let mut manager = Manager::new();
    manager.add_field(string_list_field(&tags, &[&json.key("tags")]), FieldOptions::new());

    let err = manager.consolidate().unwrap_err();
    assert_eq!(
        err.messages(),
        vec![r#"tags: bind_array: parsing "\"smoke\"": expected array, found string"#.to_string()]
    );
}
