use std::fmt::{Display, Formatter};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::value::{SanitizePolicy, Value};

use super::accumulate::{MemberAddressing, accumulate_errors, accumulate_values, read_at, resolve_path};
use super::errors::{ErrorTree, FieldError};
use super::path::FieldPath;
use super::schema::ObjectSchema;
use super::validation::FormModel;

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidationMode {
    /// Revalidate the changed field on every `set_field`.
    #[default]
    OnChange,
    /// Only clear the changed field's stale error; validate on submit.
    OnSubmit,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct FormOptions {
    pub validate_mode: ValidationMode,
    pub sanitize: SanitizePolicy,
}

impl Default for FormOptions {
    fn default() -> Self {
        Self {
            validate_mode: ValidationMode::OnChange,
            sanitize: SanitizePolicy::default(),
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum SubmitState {
    Idle,
    Failed,
    Succeeded,
}

impl Display for SubmitState {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            SubmitState::Idle => "idle",
            SubmitState::Failed => "failed",
            SubmitState::Succeeded => "succeeded",
        })
    }
}

#[derive(Clone, Debug, Eq, PartialEq, Error)]
pub enum FormError {
    #[error("field path `{path}` is not described by the form schema")]
    UnknownField { path: FieldPath },
    #[error("field path `{path}` does not address a {expected}")]
    PathMismatch {
        path: FieldPath,
        expected: &'static str,
    },
    #[error("no array member `{key}` along `{path}`")]
    MissingMember { path: FieldPath, key: String },
    #[error("form has validation errors")]
    Invalid { errors: ErrorTree },
}

pub type FormResult<T> = Result<T, FormError>;

/// Result of a full validation pass.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Validation {
    pub errors: ErrorTree,
    pub has_error: bool,
}

/// Form state bound to a fixed schema: the current value, its error tree and
/// the pristine flag.
#[derive(Clone, Debug)]
pub struct FormEngine {
    pub(super) options: FormOptions,
    pub(super) schema: Arc<ObjectSchema>,
    pub(super) initial: Value,
    pub(super) value: Value,
    pub(super) errors: ErrorTree,
    pub(super) pristine: bool,
    pub(super) submit_state: SubmitState,
    pub(super) submit_count: u32,
}

impl FormEngine {
    pub fn new(initial: impl Into<Value>, schema: ObjectSchema) -> Self {
        Self::with_options(initial, schema, FormOptions::default())
    }

    /// A non-record initial value is replaced by an empty record.
    pub fn with_options(initial: impl Into<Value>, schema: ObjectSchema, options: FormOptions) -> Self {
        let initial = match initial.into() {
            record @ Value::Record(_) => record,
            _ => Value::empty_record(),
        };
        Self {
            options,
            schema: Arc::new(schema),
            value: initial.clone(),
            initial,
            errors: ErrorTree::new(),
            pristine: true,
            submit_state: SubmitState::Idle,
            submit_count: 0,
        }
    }

    pub fn for_model<M>(model: &M, schema: ObjectSchema, options: FormOptions) -> Self
    where
        M: FormModel,
    {
        Self::with_options(model.to_value(), schema, options)
    }

    pub fn options(&self) -> &FormOptions {
        &self.options
    }

    pub fn schema(&self) -> &ObjectSchema {
        &self.schema
    }

    pub fn value(&self) -> &Value {
        &self.value
    }

    pub fn initial_value(&self) -> &Value {
        &self.initial
    }

    pub fn errors(&self) -> &ErrorTree {
        &self.errors
    }

    pub fn is_pristine(&self) -> bool {
        self.pristine
    }

    /// Declared by the caller; a successful save may reset it without touching the value.
    pub fn set_pristine(&mut self, pristine: bool) {
        self.pristine = pristine;
    }

    pub fn submit_state(&self) -> SubmitState {
        self.submit_state
    }

    pub fn submit_count(&self) -> u32 {
        self.submit_count
    }

    /// Replaces the whole error tree, typically with errors reported by the server.
    pub fn set_errors(&mut self, errors: ErrorTree) {
        debug!(has_error = errors.has_error(), "form errors replaced");
        self.errors = errors;
    }

    pub fn clear_errors(&mut self) {
        self.errors = ErrorTree::new();
    }

    /// Runs every validator and cross-field check over the current value.
    pub fn validate_all(&self) -> Validation {
        let errors = accumulate_errors(&self.value, &self.schema, &self.value);
        let has_error = errors.has_error();
        Validation { errors, has_error }
    }

    /// Runs `validate_all` and keeps its error tree. Returns true when valid.
    pub fn validate(&mut self) -> bool {
        let Validation { errors, has_error } = self.validate_all();
        self.errors = errors;
        !has_error
    }

    /// The current value with absent-by-policy entries removed and fields
    /// unknown to the schema dropped.
    pub fn sanitized_value(&self) -> Value {
        accumulate_values(&self.value, &self.schema, &self.options.sanitize)
            .unwrap_or_else(Value::empty_record)
    }

    pub fn value_at(&self, path: impl Into<FieldPath>) -> FormResult<&Value> {
        let path = path.into();
        let resolved = resolve_path(&self.value, &self.schema, &path, MemberAddressing::ByIndex)?;
        read_at(&self.value, resolved.segments(), &path)
    }

    pub fn error_at(&self, path: impl Into<FieldPath>) -> FormResult<Option<&FieldError>> {
        let path = path.into();
        let resolved = resolve_path(&self.value, &self.schema, &path, MemberAddressing::ByKey)?;
        Ok(self.errors.at(&resolved))
    }

    /// Replaces the value and its baseline, clears errors and marks the form pristine.
    pub fn reset_to(&mut self, value: impl Into<Value>) {
        let value = match value.into() {
            record @ Value::Record(_) => record,
            _ => Value::empty_record(),
        };
        self.initial = value.clone();
        self.value = value;
        self.errors = ErrorTree::new();
        self.pristine = true;
        self.submit_state = SubmitState::Idle;
    }

    pub fn reset_to_initial(&mut self) {
        self.value = self.initial.clone();
        self.errors = ErrorTree::new();
        self.pristine = true;
        self.submit_state = SubmitState::Idle;
    }
}
