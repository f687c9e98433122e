use helix_state::form::{FieldPath, FormModel};

#[derive(Clone, helix_state::form::FormModel)]
struct ProfileForm {
    #[form(rename = "firstName")]
    first_name: String,
    newsletter: Option<bool>,
}

fn main() {
    let fields = ProfileForm::fields();
    let path = FieldPath::from(fields.first_name());
    assert_eq!(path.to_string(), "firstName");

    let model = ProfileForm {
        first_name: "Ada".to_string(),
        newsletter: None,
    };
    assert!(model.to_value().get("first_name").is_none());
    assert!(model.to_value().get("firstName").is_some());
}
