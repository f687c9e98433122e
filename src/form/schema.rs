use std::collections::{BTreeMap, BTreeSet};
use std::fmt::{Debug, Formatter};
use std::sync::Arc;

use crate::value::Value;

use super::validation::{FieldValidator, FormValidator};

pub(crate) type FieldCheck = Arc<dyn FieldValidator>;
pub(crate) type ValueCheck = Arc<dyn FormValidator>;
pub(crate) type KeySelector = Arc<dyn Fn(&Value) -> String + Send + Sync>;

/// Validation rules for one field of an [`ObjectSchema`].
#[derive(Clone)]
pub enum Schema {
    Field(FieldSchema),
    Object(ObjectSchema),
    Array(ArraySchema),
}

impl From<FieldSchema> for Schema {
    fn from(schema: FieldSchema) -> Self {
        Schema::Field(schema)
    }
}

impl From<ObjectSchema> for Schema {
    fn from(schema: ObjectSchema) -> Self {
        Schema::Object(schema)
    }
}

impl From<ArraySchema> for Schema {
    fn from(schema: ArraySchema) -> Self {
        Schema::Array(schema)
    }
}

impl Debug for Schema {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Schema::Field(schema) => schema.fmt(f),
            Schema::Object(schema) => schema.fmt(f),
            Schema::Array(schema) => schema.fmt(f),
        }
    }
}

/// Ordered validators of a leaf field. The first failure wins.
#[derive(Clone, Default)]
pub struct FieldSchema {
    pub(crate) validators: Vec<FieldCheck>,
}

impl FieldSchema {
    /// A described field without rules.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with<V>(mut self, validator: V) -> Self
    where
        V: FieldValidator + 'static,
    {
        self.validators.push(Arc::new(validator));
        self
    }

    pub fn validator_count(&self) -> usize {
        self.validators.len()
    }
}

impl Debug for FieldSchema {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FieldSchema")
            .field("validators", &self.validators.len())
            .finish()
    }
}

#[derive(Clone, Default)]
pub struct ObjectSchema {
    pub(crate) fields: BTreeMap<String, Schema>,
    pub(crate) validation: Option<ValueCheck>,
    pub(crate) dependencies: BTreeMap<String, BTreeSet<String>>,
}

impl ObjectSchema {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn field(mut self, name: impl Into<String>, schema: impl Into<Schema>) -> Self {
        self.fields.insert(name.into(), schema.into());
        self
    }

    /// Cross-field check reported at this object's `internal` slot.
    pub fn validation<V>(mut self, validator: V) -> Self
    where
        V: FormValidator + 'static,
    {
        self.validation = Some(Arc::new(validator));
        self
    }

    /// Re-evaluates `dependent` whenever `source` changes.
    pub fn dependency(mut self, source: impl Into<String>, dependent: impl Into<String>) -> Self {
        self.dependencies
            .entry(source.into())
            .or_default()
            .insert(dependent.into());
        self
    }

    pub fn get(&self, name: &str) -> Option<&Schema> {
        self.fields.get(name)
    }

    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    pub(crate) fn dependents(&self, source: &str) -> impl Iterator<Item = &str> {
        self.dependencies
            .get(source)
            .into_iter()
            .flat_map(|dependents| dependents.iter().map(String::as_str))
    }
}

impl Debug for ObjectSchema {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ObjectSchema")
            .field("fields", &self.fields)
            .field("validation", &self.validation.is_some())
            .field("dependencies", &self.dependencies)
            .finish()
    }
}

/// Schema of a list of records whose errors are keyed by member identity.
#[derive(Clone)]
pub struct ArraySchema {
    pub(crate) key_selector: KeySelector,
    pub(crate) member: ObjectSchema,
    pub(crate) validation: Option<ValueCheck>,
}

impl ArraySchema {
    pub fn new<K>(key_selector: K, member: ObjectSchema) -> Self
    where
        K: Fn(&Value) -> String + Send + Sync + 'static,
    {
        Self {
            key_selector: Arc::new(key_selector),
            member,
            validation: None,
        }
    }

    /// Uses the scalar stored under `field` as the member key. Members without
    /// one share the empty key.
    pub fn keyed_by(field: impl Into<String>, member: ObjectSchema) -> Self {
        let field = field.into();
        Self::new(
            move |value: &Value| {
                value
                    .get(&field)
                    .and_then(Value::key_string)
                    .unwrap_or_default()
            },
            member,
        )
    }

    pub fn validation<V>(mut self, validator: V) -> Self
    where
        V: FormValidator + 'static,
    {
        self.validation = Some(Arc::new(validator));
        self
    }

    pub fn key_of(&self, member: &Value) -> String {
        (self.key_selector)(member)
    }

    pub fn member(&self) -> &ObjectSchema {
        &self.member
    }
}

impl Debug for ArraySchema {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ArraySchema")
            .field("member", &self.member)
            .field("validation", &self.validation.is_some())
            .finish()
    }
}
