use std::fmt::{Display, Formatter};

use tracing::{debug, trace};

use crate::value::Value;

use super::accumulate::{
    MemberAddressing, clear_path, renamed_member, resolve_path, revalidate_path, write_at,
};
use super::controller::{
    FormEngine, FormError, FormResult, SubmitState, Validation, ValidationMode,
};
use super::path::FieldPath;

/// Checks one field. Receives the field value and the whole form value.
pub trait FieldValidator: Send + Sync {
    fn validate(&self, value: &Value, all_values: &Value) -> Result<(), String>;
}

impl<F> FieldValidator for F
where
    F: Fn(&Value, &Value) -> Result<(), String> + Send + Sync,
{
    fn validate(&self, value: &Value, all_values: &Value) -> Result<(), String> {
        (self)(value, all_values)
    }
}

/// Cross-field check of an object or list as a whole.
pub trait FormValidator: Send + Sync {
    fn validate(&self, value: &Value) -> Result<(), String>;
}

impl<F> FormValidator for F
where
    F: Fn(&Value) -> Result<(), String> + Send + Sync,
{
    fn validate(&self, value: &Value) -> Result<(), String> {
        (self)(value)
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct FieldKey(&'static str);

impl FieldKey {
    pub const fn new(value: &'static str) -> Self {
        Self(value)
    }

    pub const fn as_str(self) -> &'static str {
        self.0
    }
}

impl Display for FieldKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.0)
    }
}

/// A typed form whose field names are checked at compile time.
/// Usually derived with `#[derive(FormModel)]`.
pub trait FormModel {
    type Fields;

    fn fields() -> Self::Fields;
    fn to_value(&self) -> Value;
}

impl FormEngine {
    /// Applies one field change. In `OnChange` mode only the error subtree
    /// reachable from `path` is recomputed; every other node is reused.
    ///
    /// A `&str` is taken as a single top-level field name. Parse nested paths:
    ///
    /// ```
    /// use helix_state::form::{ArraySchema, FieldPath, FieldSchema, FormEngine, ObjectSchema};
    /// use helix_state::value::Value;
    ///
    /// let item = ObjectSchema::new().field("title", FieldSchema::new());
    /// let schema = ObjectSchema::new().field("items", ArraySchema::keyed_by("title", item));
    /// let mut engine = FormEngine::new(
    ///     Value::record([("items", Value::list([Value::record([("title", "Desk")])]))]),
    ///     schema,
    /// );
    ///
    /// let path: FieldPath = "items[0].title".parse()?;
    /// engine.set_field(path, "Lamp")?;
    /// assert!(engine.set_field("items[0].title", "Lamp").is_err());
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn set_field(
        &mut self,
        path: impl Into<FieldPath>,
        value: impl Into<Value>,
    ) -> FormResult<()> {
        let path = path.into();
        let by_index =
            resolve_path(&self.value, &self.schema, &path, MemberAddressing::ByIndex)?;
        let next = write_at(&self.value, by_index.segments(), value.into(), &path)?;

        let errors = match self.options.validate_mode {
            ValidationMode::OnChange => revalidate_path(
                &self.value,
                &next,
                &self.errors,
                &self.schema,
                by_index.segments(),
                &next,
                &path,
            )?,
            ValidationMode::OnSubmit => {
                let old_key =
                    resolve_path(&self.value, &self.schema, &by_index, MemberAddressing::ByKey)?;
                let new_key = resolve_path(&next, &self.schema, &by_index, MemberAddressing::ByKey)?;
                let cleared = clear_path(&self.errors, new_key.segments());
                match renamed_member(old_key.segments(), new_key.segments()) {
                    Some(stale) => clear_path(&cleared, stale),
                    None => cleared,
                }
            }
        };

        trace!(path = %path, "form field changed");
        self.value = next;
        self.errors = errors;
        self.pristine = false;
        Ok(())
    }

    /// Validates everything and, when valid, hands the sanitized value to
    /// `on_submit`. The callback may return a future; the engine is released
    /// before it runs to completion.
    pub fn submit<F, R>(&mut self, on_submit: F) -> FormResult<R>
    where
        F: FnOnce(Value) -> R,
    {
        self.submit_count = self.submit_count.saturating_add(1);
        let Validation { errors, has_error } = self.validate_all();
        self.errors = errors;

        if has_error {
            self.submit_state = SubmitState::Failed;
            debug!(submit_count = self.submit_count, "form submit rejected by validation");
            return Err(FormError::Invalid {
                errors: self.errors.clone(),
            });
        }

        self.submit_state = SubmitState::Succeeded;
        debug!(submit_count = self.submit_count, "form submitted");
        Ok(on_submit(self.sanitized_value()))
    }
}
