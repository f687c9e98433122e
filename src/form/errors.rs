use std::sync::Arc;

use im::OrdMap;

use super::path::{FieldPath, PathSegment};

/// Validation messages shaped like the form value.
///
/// Subtrees are shared through `Arc`; a node that was not revalidated keeps
/// its identity, so `FieldError::ptr_eq` tells callers whether anything under
/// it changed. Fields without errors are omitted.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct ErrorTree {
    pub(crate) internal: Option<Arc<str>>,
    pub(crate) fields: OrdMap<String, FieldError>,
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum FieldError {
    Message(Arc<str>),
    Object(Arc<ErrorTree>),
    Array(Arc<ArrayErrors>),
}

/// Errors of a list field: an optional list-level message and member trees
/// keyed by the schema's key selector.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct ArrayErrors {
    pub(crate) internal: Option<Arc<str>>,
    pub(crate) members: OrdMap<String, Arc<ErrorTree>>,
}

impl ErrorTree {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_internal(mut self, message: impl Into<Arc<str>>) -> Self {
        self.internal = Some(message.into());
        self
    }

    pub fn with_message(mut self, field: impl Into<String>, message: impl Into<Arc<str>>) -> Self {
        self.fields
            .insert(field.into(), FieldError::Message(message.into()));
        self
    }

    pub fn with_object(mut self, field: impl Into<String>, tree: ErrorTree) -> Self {
        self.fields
            .insert(field.into(), FieldError::Object(Arc::new(tree)));
        self
    }

    pub fn with_array(mut self, field: impl Into<String>, errors: ArrayErrors) -> Self {
        self.fields
            .insert(field.into(), FieldError::Array(Arc::new(errors)));
        self
    }

    /// The `$internal` message of this level.
    pub fn internal(&self) -> Option<&str> {
        self.internal.as_deref()
    }

    pub fn field(&self, name: &str) -> Option<&FieldError> {
        self.fields.get(name)
    }

    pub fn message(&self, name: &str) -> Option<&str> {
        self.field(name).and_then(FieldError::message)
    }

    pub fn object(&self, name: &str) -> Option<&Arc<ErrorTree>> {
        self.field(name).and_then(FieldError::as_object)
    }

    pub fn array(&self, name: &str) -> Option<&Arc<ArrayErrors>> {
        self.field(name).and_then(FieldError::as_array)
    }

    pub fn fields(&self) -> impl Iterator<Item = (&str, &FieldError)> {
        self.fields.iter().map(|(name, error)| (name.as_str(), error))
    }

    /// Error of the field addressed by `path`. Only field and member-key
    /// segments are followed; resolve index segments against the value first.
    pub fn at(&self, path: &FieldPath) -> Option<&FieldError> {
        let (last, parents) = path.segments().split_last()?;
        let PathSegment::Field(name) = last else {
            return None;
        };
        self.walk(parents)?.field(name)
    }

    /// Nested tree of the object or array member addressed by `path`.
    pub fn tree_at(&self, path: &FieldPath) -> Option<&ErrorTree> {
        self.walk(path.segments())
    }

    fn walk(&self, segments: &[PathSegment]) -> Option<&ErrorTree> {
        let mut tree = self;
        let mut rest = segments;
        while let Some((segment, tail)) = rest.split_first() {
            let PathSegment::Field(name) = segment else {
                return None;
            };
            match (tree.field(name)?, tail.split_first()) {
                (FieldError::Object(child), _) => {
                    tree = child.as_ref();
                    rest = tail;
                }
                (FieldError::Array(errors), Some((PathSegment::Member(key), after))) => {
                    tree = errors.member(key)?.as_ref();
                    rest = after;
                }
                _ => return None,
            }
        }
        Some(tree)
    }

    pub fn is_empty(&self) -> bool {
        self.internal.is_none() && self.fields.is_empty()
    }

    /// True if any message exists at any depth.
    pub fn has_error(&self) -> bool {
        self.internal.is_some() || self.fields.values().any(FieldError::has_error)
    }

    pub(crate) fn set_field(&mut self, name: &str, error: Option<FieldError>) {
        match error {
            Some(error) => {
                self.fields.insert(name.to_owned(), error);
            }
            None => {
                self.fields.remove(name);
            }
        }
    }

    pub(crate) fn into_object(self) -> Option<FieldError> {
        (!self.is_empty()).then(|| FieldError::Object(Arc::new(self)))
    }
}

impl FieldError {
    pub fn message(&self) -> Option<&str> {
        match self {
            FieldError::Message(message) => Some(message.as_ref()),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&Arc<ErrorTree>> {
        match self {
            FieldError::Object(tree) => Some(tree),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&Arc<ArrayErrors>> {
        match self {
            FieldError::Array(errors) => Some(errors),
            _ => None,
        }
    }

    pub fn has_error(&self) -> bool {
        match self {
            FieldError::Message(_) => true,
            FieldError::Object(tree) => tree.has_error(),
            FieldError::Array(errors) => errors.has_error(),
        }
    }

    /// Same variant and same shared allocation.
    pub fn ptr_eq(&self, other: &FieldError) -> bool {
        match (self, other) {
            (FieldError::Message(left), FieldError::Message(right)) => Arc::ptr_eq(left, right),
            (FieldError::Object(left), FieldError::Object(right)) => Arc::ptr_eq(left, right),
            (FieldError::Array(left), FieldError::Array(right)) => Arc::ptr_eq(left, right),
            _ => false,
        }
    }
}

impl ArrayErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_internal(mut self, message: impl Into<Arc<str>>) -> Self {
        self.internal = Some(message.into());
        self
    }

    pub fn with_member(mut self, key: impl Into<String>, tree: ErrorTree) -> Self {
        self.members.insert(key.into(), Arc::new(tree));
        self
    }

    pub fn internal(&self) -> Option<&str> {
        self.internal.as_deref()
    }

    pub fn member(&self, key: &str) -> Option<&Arc<ErrorTree>> {
        self.members.get(key)
    }

    pub fn members(&self) -> impl Iterator<Item = (&str, &Arc<ErrorTree>)> {
        self.members.iter().map(|(key, tree)| (key.as_str(), tree))
    }

    pub fn is_empty(&self) -> bool {
        self.internal.is_none() && self.members.is_empty()
    }

    pub fn has_error(&self) -> bool {
        self.internal.is_some() || self.members.values().any(|tree| tree.has_error())
    }

    pub(crate) fn set_member(&mut self, key: &str, tree: Option<Arc<ErrorTree>>) {
        match tree.filter(|tree| !tree.is_empty()) {
            Some(tree) => {
                self.members.insert(key.to_owned(), tree);
            }
            None => {
                self.members.remove(key);
            }
        }
    }

    pub(crate) fn into_field(self) -> Option<FieldError> {
        (!self.is_empty()).then(|| FieldError::Array(Arc::new(self)))
    }
}
