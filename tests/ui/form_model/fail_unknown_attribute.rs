#[allow(dead_code)]
#[derive(Clone, helix_state::form::FormModel)]
struct DemoForm {
    #[form(skip)]
    email: String,
}

fn main() {}
