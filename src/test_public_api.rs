use crate::prelude::*;

#[derive(Clone, FormModel)]
struct InviteForm {
    email: String,
    #[form(rename = "seatCount")]
    seats: u32,
}

#[test]
fn prelude_builds_form_and_filter_defaults() {
    let _ = FormOptions::default();
    let _ = FilterOptions::default();
    let _ = SanitizePolicy::default();
    let _ = ValidationMode::OnSubmit;
    let _ = SortDirection::Dsc;
}

#[test]
fn derived_model_drives_engine_through_prelude() {
    let fields = InviteForm::fields();
    let schema = ObjectSchema::new()
        .field(
            fields.email().as_str(),
            FieldSchema::new().with(conditions::email()),
        )
        .field(fields.seats().as_str(), FieldSchema::new());
    let mut engine = FormEngine::for_model(
        &InviteForm {
            email: "ops@example.com".into(),
            seats: 3,
        },
        schema,
        FormOptions::default(),
    );

    assert_eq!(fields.seats().as_str(), "seatCount");
    assert_eq!(
        engine.value().get("seatCount"),
        Some(&Value::from(3_u32))
    );
    assert!(engine.validate());

    engine
        .set_field(fields.email(), "not-an-email")
        .expect("known field");
    assert!(engine.errors().has_error());
}

#[test]
fn filter_handle_is_reachable_through_prelude() {
    let handle = FilterHandle::new(Record::new(), FilterOptions::default());
    handle.sort_by("name");
    assert_eq!(handle.raw_ordering(), Some(SortOrder::asc("name")));
}
