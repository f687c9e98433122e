use serde::{Deserialize, Serialize};

use super::errors::{ArrayErrors, ErrorTree};

/// Field name the API uses for form-level messages.
pub const NON_FIELD_ERRORS: &str = "nonFieldErrors";

/// One entry of a mutation's `errors` payload.
#[derive(Clone, Debug, Default, Eq, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectErrorPayload {
    pub field: String,
    #[serde(default)]
    pub messages: Option<String>,
    #[serde(default)]
    pub object_errors: Option<Vec<ObjectErrorPayload>>,
    #[serde(default)]
    pub array_errors: Option<Vec<ArrayErrorPayload>>,
}

#[derive(Clone, Debug, Default, Eq, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ArrayErrorPayload {
    pub key: String,
    #[serde(default)]
    pub messages: Option<String>,
    #[serde(default)]
    pub object_errors: Option<Vec<ObjectErrorPayload>>,
}

impl ErrorTree {
    /// Maps the API's error payload onto the tree shape used for validation.
    /// A field's own `messages` take precedence over nested errors.
    pub fn from_server_errors(errors: &[ObjectErrorPayload]) -> Self {
        let mut tree = ErrorTree::new();
        for error in errors {
            if error.field == NON_FIELD_ERRORS {
                if let Some(messages) = error.messages.as_deref() {
                    tree = tree.with_internal(messages);
                }
                continue;
            }

            if let Some(messages) = error.messages.as_deref() {
                tree = tree.with_message(error.field.as_str(), messages);
            } else if let Some(object_errors) = error.object_errors.as_deref() {
                let nested = ErrorTree::from_server_errors(object_errors);
                if !nested.is_empty() {
                    tree = tree.with_object(error.field.as_str(), nested);
                }
            } else if let Some(array_errors) = error.array_errors.as_deref() {
                let members = array_errors_from_payload(array_errors);
                if !members.is_empty() {
                    tree = tree.with_array(error.field.as_str(), members);
                }
            }
        }
        tree
    }

    pub fn from_server_json(payload: &str) -> serde_json::Result<Self> {
        let errors: Vec<ObjectErrorPayload> = serde_json::from_str(payload)?;
        Ok(ErrorTree::from_server_errors(&errors))
    }
}

fn array_errors_from_payload(errors: &[ArrayErrorPayload]) -> ArrayErrors {
    errors.iter().fold(ArrayErrors::new(), |members, error| {
        let mut member = error
            .object_errors
            .as_deref()
            .map(ErrorTree::from_server_errors)
            .unwrap_or_default();
        if let Some(messages) = error.messages.as_deref() {
            member = member.with_internal(messages);
        }
        if member.is_empty() {
            members
        } else {
            members.with_member(error.key.as_str(), member)
        }
    })
}
