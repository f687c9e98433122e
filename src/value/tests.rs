use super::*;
use rust_decimal::Decimal;

#[test]
fn updates_share_structure_and_leave_previous_value_intact() {
    let before = Value::record([("name", Value::from("Sahel")), ("year", Value::from(2024))]);
    let Value::Record(fields) = &before else {
        panic!("record expected");
    };
    let after = Value::Record(fields.update("name".to_owned(), Value::from("Horn of Africa")));

    assert_eq!(before.get("name"), Some(&Value::from("Sahel")));
    assert_eq!(after.get("name"), Some(&Value::from("Horn of Africa")));
    assert_eq!(after.get("year"), before.get("year"));
}

#[test]
fn json_conversion_keeps_integers_exact_and_nests_containers() {
    let json = serde_json::json!({
        "country": "SDN",
        "figures": [{ "id": 1, "quantity": 1500 }, { "id": 2, "quantity": 12.5 }],
        "archived": false,
        "notes": null
    });
    let value = Value::from(json.clone());

    let figures = value.get("figures").and_then(Value::as_list).expect("figures list");
    assert_eq!(figures[0].get("quantity"), Some(&Value::from(1500)));
    assert_eq!(
        figures[1].get("quantity").and_then(Value::as_number),
        Some(Decimal::new(125, 1))
    );
    assert_eq!(value.get("notes"), Some(&Value::Null));
    assert_eq!(value.to_json(), json);
}

#[test]
fn key_string_renders_scalars_only() {
    assert_eq!(Value::from("fig-1").key_string().as_deref(), Some("fig-1"));
    assert_eq!(Value::from(Decimal::new(200, 2)).key_string().as_deref(), Some("2"));
    assert_eq!(Value::Null.key_string(), None);
    assert_eq!(Value::empty_record().key_string(), None);
}

#[test]
fn default_policy_drops_null_and_empty_text_but_keeps_zero_and_false() {
    let value = Value::record([
        ("title", Value::from("")),
        ("count", Value::from(0)),
        ("active", Value::from(false)),
        ("comment", Value::Null),
        ("tags", Value::list(Vec::<Value>::new())),
        ("meta", Value::record([("source", Value::from(""))])),
    ]);
    let sanitized = sanitize(&value, &SanitizePolicy::default()).expect("root record");

    assert_eq!(sanitized.get("title"), None);
    assert_eq!(sanitized.get("comment"), None);
    assert_eq!(sanitized.get("meta"), None);
    assert_eq!(sanitized.get("count"), Some(&Value::from(0)));
    assert_eq!(sanitized.get("active"), Some(&Value::from(false)));
    assert_eq!(sanitized.get("tags"), Some(&Value::list(Vec::<Value>::new())));
}

#[test]
fn strict_policy_drops_every_falsy_kind() {
    let policy = SanitizePolicy {
        blank_text: true,
        empty_list: true,
        zero: true,
        false_bool: true,
        ..SanitizePolicy::default()
    };
    let value = Value::list([
        Value::from("  "),
        Value::from(0),
        Value::from(false),
        Value::list(Vec::<Value>::new()),
        Value::from("kept"),
    ]);

    assert_eq!(sanitize(&value, &policy), Some(Value::list(["kept"])));
    assert_eq!(sanitize(&Value::list([Value::Null]), &policy), None);
}

#[test]
fn policy_deserializes_with_defaults_for_missing_flags() {
    let policy: SanitizePolicy =
        serde_json::from_str(r#"{ "zero": true }"#).expect("policy json");
    assert!(policy.zero);
    assert!(policy.empty_text);
    assert!(!policy.keep_unknown_fields);
}
