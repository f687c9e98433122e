mod accumulate;
mod array;
pub mod conditions;
mod controller;
mod errors;
mod path;
mod schema;
mod server;
mod validation;


pub use controller::{
    FormEngine, FormError, FormOptions, FormResult, SubmitState, Validation, ValidationMode,
};
pub use errors::{ArrayErrors, ErrorTree, FieldError};
pub use helix_state_derive::FormModel;
pub use path::{FieldPath, PathParseError, PathSegment};
pub use schema::{ArraySchema, FieldSchema, ObjectSchema, Schema};
pub use server::{ArrayErrorPayload, NON_FIELD_ERRORS, ObjectErrorPayload};
pub use validation::{FieldKey, FieldValidator, FormModel, FormValidator};
