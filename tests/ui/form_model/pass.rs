use helix_state::form::FormModel;
use helix_state::value::Value;

#[derive(Clone, helix_state::form::FormModel)]
struct DemoForm {
    email: String,
    seats: u32,
}

fn main() {
    let fields = DemoForm::fields();
    assert_eq!(fields.email().as_str(), "email");
    assert_eq!(fields.seats().as_str(), "seats");

    let model = DemoForm {
        email: "a@example.com".to_string(),
        seats: 2,
    };
    let value = model.to_value();
    assert_eq!(value.get("email"), Some(&Value::from("a@example.com")));
    assert_eq!(value.get("seats"), Some(&Value::from(2_u32)));
}
