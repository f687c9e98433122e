//! Error accumulation, differential revalidation and submit-value sanitizing.

use std::collections::HashMap;
use std::sync::Arc;

use crate::value::{List, Record, SanitizePolicy, Value, sanitize};

use super::controller::{FormError, FormResult};
use super::errors::{ArrayErrors, ErrorTree, FieldError};
use super::path::{FieldPath, PathSegment};
use super::schema::{ArraySchema, FieldSchema, ObjectSchema, Schema, ValueCheck};

static NULL: Value = Value::Null;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum MemberAddressing {
    ByIndex,
    ByKey,
}

pub(crate) fn accumulate_errors(value: &Value, schema: &ObjectSchema, root: &Value) -> ErrorTree {
    let mut tree = ErrorTree::new();
    for (name, field_schema) in &schema.fields {
        let field_value = value.get(name).unwrap_or(&NULL);
        tree.set_field(name, accumulate_field(field_value, field_schema, root));
    }
    tree.internal = run_check(schema.validation.as_ref(), value);
    tree
}

fn accumulate_field(value: &Value, schema: &Schema, root: &Value) -> Option<FieldError> {
    match schema {
        Schema::Field(field) => first_failure(field, value, root).map(FieldError::Message),
        Schema::Object(object) => accumulate_errors(value, object, root).into_object(),
        Schema::Array(array) => accumulate_array(value, array, root, None).into_field(),
    }
}

fn first_failure(schema: &FieldSchema, value: &Value, root: &Value) -> Option<Arc<str>> {
    schema
        .validators
        .iter()
        .find_map(|validator| validator.validate(value, root).err())
        .map(Arc::from)
}

fn run_check(check: Option<&ValueCheck>, value: &Value) -> Option<Arc<str>> {
    check
        .and_then(|check| check.validate(value).err())
        .map(Arc::from)
}

fn shared(tree: ErrorTree) -> Option<Arc<ErrorTree>> {
    (!tree.is_empty()).then(|| Arc::new(tree))
}

/// With `previous`, members whose key and value are unchanged keep their old
/// error subtree.
fn accumulate_array(
    value: &Value,
    schema: &ArraySchema,
    root: &Value,
    previous: Option<(&Value, Option<&ArrayErrors>)>,
) -> ArrayErrors {
    let previous = previous.map(|(old_value, old_errors)| {
        let members = old_value
            .as_list()
            .map(|members| {
                members
                    .iter()
                    .map(|member| (schema.key_of(member), member))
                    .collect::<HashMap<_, _>>()
            })
            .unwrap_or_default();
        (members, old_errors)
    });

    let mut errors = ArrayErrors::new();
    if let Some(members) = value.as_list() {
        for member in members {
            let key = schema.key_of(member);
            let reused = previous.as_ref().and_then(|(old_members, old_errors)| {
                let unchanged = old_members.get(&key).is_some_and(|old| *old == member);
                unchanged.then(|| old_errors.and_then(|errors| errors.member(&key)).cloned())
            });
            let tree = match reused {
                Some(tree) => tree,
                None => shared(accumulate_errors(member, &schema.member, root)),
            };
            errors.set_member(&key, tree);
        }
    }
    errors.internal = run_check(schema.validation.as_ref(), value);
    errors
}

/// Recomputes the error subtree reachable from `segments` and reuses every
/// other node of `old_errors`. Cross-field checks of the levels above the
/// changed field keep their previous result.
pub(crate) fn revalidate_path(
    old_value: &Value,
    new_value: &Value,
    old_errors: &ErrorTree,
    schema: &ObjectSchema,
    segments: &[PathSegment],
    root: &Value,
    path: &FieldPath,
) -> FormResult<ErrorTree> {
    let Some((PathSegment::Field(name), rest)) = segments.split_first() else {
        return Err(mismatch(path, "field name"));
    };
    let field_schema = schema.get(name).ok_or_else(|| unknown(path))?;
    let old_field = old_value.get(name).unwrap_or(&NULL);
    let new_field = new_value.get(name).unwrap_or(&NULL);
    let old_error = old_errors.field(name);

    let next = match (field_schema, rest.split_first()) {
        (Schema::Array(array), None) => {
            let old_array = old_error.and_then(FieldError::as_array).map(|errors| &**errors);
            accumulate_array(new_field, array, root, Some((old_field, old_array))).into_field()
        }
        (_, None) => accumulate_field(new_field, field_schema, root),
        (Schema::Object(object), Some(_)) => {
            let empty = ErrorTree::new();
            let old_tree = old_error
                .and_then(FieldError::as_object)
                .map_or(&empty, |tree| &**tree);
            revalidate_path(old_field, new_field, old_tree, object, rest, root, path)?
                .into_object()
        }
        (Schema::Array(array), Some((segment, after))) => revalidate_member(
            old_field,
            new_field,
            old_error.and_then(FieldError::as_array),
            array,
            segment,
            after,
            root,
            path,
        )?,
        (Schema::Field(_), Some(_)) => return Err(mismatch(path, "object or array field")),
    };

    let mut tree = old_errors.clone();
    tree.set_field(name, next);
    for dependent in schema.dependents(name) {
        if let Some(dependent_schema) = schema.get(dependent) {
            let value = new_value.get(dependent).unwrap_or(&NULL);
            tree.set_field(dependent, accumulate_field(value, dependent_schema, root));
        }
    }
    Ok(tree)
}

#[allow(clippy::too_many_arguments)]
fn revalidate_member(
    old_list: &Value,
    new_list: &Value,
    old_errors: Option<&Arc<ArrayErrors>>,
    schema: &ArraySchema,
    segment: &PathSegment,
    rest: &[PathSegment],
    root: &Value,
    path: &FieldPath,
) -> FormResult<Option<FieldError>> {
    let members = new_list.as_list().ok_or_else(|| mismatch(path, "list"))?;
    let (index, key, member) = locate_member(members, schema, segment, path)?;

    let mut errors = old_errors.map(|errors| (**errors).clone()).unwrap_or_default();
    let old_member = match segment {
        PathSegment::Index(_) => old_list.as_list().and_then(|members| members.get(index)),
        _ => old_list
            .as_list()
            .and_then(|members| members.iter().find(|old| schema.key_of(old) == key)),
    };
    let previous = match old_member {
        Some(old) if schema.key_of(old) == key => Some(old),
        Some(old) => {
            // The edit changed the member's identity; its old errors go with the old key.
            errors.set_member(&schema.key_of(old), None);
            None
        }
        None => None,
    };

    let tree = match previous {
        Some(old_member) if !rest.is_empty() => {
            let empty = ErrorTree::new();
            let old_tree = errors.member(&key).map_or(&empty, |tree| &**tree);
            shared(revalidate_path(
                old_member,
                member,
                old_tree,
                &schema.member,
                rest,
                root,
                path,
            )?)
        }
        _ => shared(accumulate_errors(member, &schema.member, root)),
    };
    errors.set_member(&key, tree);
    Ok(errors.into_field())
}

fn locate_member<'v>(
    members: &'v List,
    schema: &ArraySchema,
    segment: &PathSegment,
    path: &FieldPath,
) -> FormResult<(usize, String, &'v Value)> {
    match segment {
        PathSegment::Member(key) => members
            .iter()
            .position(|member| schema.key_of(member) == *key)
            .map(|index| (index, key.clone(), &members[index]))
            .ok_or_else(|| missing(path, key.clone())),
        PathSegment::Index(index) => members
            .get(*index)
            .map(|member| (*index, schema.key_of(member), member))
            .ok_or_else(|| missing(path, index.to_string())),
        PathSegment::Field(_) => Err(mismatch(path, "array member")),
    }
}

/// Checks `path` against the schema and rewrites its member segments to
/// positions or to keys, as found in `value`.
pub(crate) fn resolve_path(
    value: &Value,
    schema: &ObjectSchema,
    path: &FieldPath,
    addressing: MemberAddressing,
) -> FormResult<FieldPath> {
    let mut resolved = Vec::with_capacity(path.segments().len());
    let mut current_value = value;
    let mut current_schema = schema;
    let mut segments = path.segments();

    loop {
        let Some((PathSegment::Field(name), rest)) = segments.split_first() else {
            return Err(mismatch(path, "field name"));
        };
        let field_schema = current_schema.get(name).ok_or_else(|| unknown(path))?;
        resolved.push(PathSegment::Field(name.clone()));
        let field_value = current_value.get(name).unwrap_or(&NULL);

        let Some((segment, after)) = rest.split_first() else {
            break;
        };
        match field_schema {
            Schema::Object(object) => {
                current_schema = object;
                current_value = field_value;
                segments = rest;
            }
            Schema::Array(array) => {
                let members = field_value.as_list().ok_or_else(|| mismatch(path, "list"))?;
                let (index, key, member) = locate_member(members, array, segment, path)?;
                resolved.push(match addressing {
                    MemberAddressing::ByIndex => PathSegment::Index(index),
                    MemberAddressing::ByKey => PathSegment::Member(key),
                });
                if after.is_empty() {
                    break;
                }
                current_schema = &array.member;
                current_value = member;
                segments = after;
            }
            Schema::Field(_) => return Err(mismatch(path, "object or array field")),
        }
    }

    Ok(FieldPath::from_segments(resolved))
}

/// Array schema addressed by a resolved path.
pub(crate) fn array_at<'s>(
    schema: &'s ObjectSchema,
    segments: &[PathSegment],
    path: &FieldPath,
) -> FormResult<&'s ArraySchema> {
    let Some((PathSegment::Field(name), rest)) = segments.split_first() else {
        return Err(mismatch(path, "field name"));
    };
    match (schema.get(name).ok_or_else(|| unknown(path))?, rest) {
        (Schema::Array(array), []) => Ok(array),
        (Schema::Object(object), [_, ..]) => array_at(object, rest, path),
        (Schema::Array(array), [_member, tail @ ..]) if !tail.is_empty() => {
            array_at(&array.member, tail, path)
        }
        _ => Err(mismatch(path, "array field")),
    }
}

/// Writes `new` at a path resolved by index. Returns the new root.
pub(crate) fn write_at(
    current: &Value,
    segments: &[PathSegment],
    new: Value,
    path: &FieldPath,
) -> FormResult<Value> {
    let Some((segment, rest)) = segments.split_first() else {
        return Ok(new);
    };
    match segment {
        PathSegment::Field(name) => {
            let fields = match current {
                Value::Record(fields) => fields.clone(),
                Value::Null => Record::new(),
                _ => return Err(mismatch(path, "record")),
            };
            let child = fields.get(name).unwrap_or(&NULL);
            let next = write_at(child, rest, new, path)?;
            Ok(Value::Record(fields.update(name.clone(), next)))
        }
        PathSegment::Index(index) => {
            let Value::List(members) = current else {
                return Err(mismatch(path, "list"));
            };
            let member = members
                .get(*index)
                .ok_or_else(|| missing(path, index.to_string()))?;
            let next = write_at(member, rest, new, path)?;
            Ok(Value::List(members.update(*index, next)))
        }
        PathSegment::Member(key) => Err(missing(path, key.clone())),
    }
}

/// Reads the value at a path resolved by index. Missing record fields read as null.
pub(crate) fn read_at<'v>(
    current: &'v Value,
    segments: &[PathSegment],
    path: &FieldPath,
) -> FormResult<&'v Value> {
    let Some((segment, rest)) = segments.split_first() else {
        return Ok(current);
    };
    let child = match segment {
        PathSegment::Field(name) => current.get(name).unwrap_or(&NULL),
        PathSegment::Index(index) => current
            .as_list()
            .and_then(|members| members.get(*index))
            .ok_or_else(|| missing(path, index.to_string()))?,
        PathSegment::Member(key) => return Err(missing(path, key.clone())),
    };
    read_at(child, rest, path)
}

/// Prefix of `old` ending at the first member whose key differs in `new`.
/// Both paths must be resolved by key from the same path.
pub(crate) fn renamed_member<'p>(
    old: &'p [PathSegment],
    new: &[PathSegment],
) -> Option<&'p [PathSegment]> {
    old.iter()
        .zip(new)
        .position(|(old, new)| old != new)
        .map(|position| &old[..=position])
}

/// Drops the errors under a path resolved by key. A path ending at a member
/// drops the whole member.
pub(crate) fn clear_path(tree: &ErrorTree, segments: &[PathSegment]) -> ErrorTree {
    let Some((PathSegment::Field(name), rest)) = segments.split_first() else {
        return tree.clone();
    };
    let replaced = match (tree.field(name), rest.split_first()) {
        (_, None) => None,
        (Some(FieldError::Object(child)), Some(_)) => clear_path(child, rest).into_object(),
        (Some(FieldError::Array(errors)), Some((PathSegment::Member(key), after))) => {
            let mut errors = (**errors).clone();
            let member = match errors.member(key) {
                Some(member) if !after.is_empty() => shared(clear_path(member, after)),
                _ => None,
            };
            errors.set_member(key, member);
            errors.into_field()
        }
        (other, Some(_)) => other.cloned(),
    };
    let mut next = tree.clone();
    next.set_field(name, replaced);
    next
}

/// Schema-aware sanitizing of a record. `None` means absent.
pub(crate) fn accumulate_values(
    value: &Value,
    schema: &ObjectSchema,
    policy: &SanitizePolicy,
) -> Option<Value> {
    let Some(fields) = value.as_record() else {
        return sanitize(value, policy);
    };
    let mut kept = Record::new();
    for (name, field_value) in fields {
        let sanitized = match schema.get(name) {
            Some(field_schema) => sanitize_field(field_value, field_schema, policy),
            None if policy.keep_unknown_fields => sanitize(field_value, policy),
            None => None,
        };
        if let Some(sanitized) = sanitized {
            kept.insert(name.clone(), sanitized);
        }
    }
    (!policy.is_absent_record(kept.len())).then_some(Value::Record(kept))
}

fn sanitize_field(value: &Value, schema: &Schema, policy: &SanitizePolicy) -> Option<Value> {
    match (schema, value) {
        (Schema::Object(object), Value::Record(_)) => accumulate_values(value, object, policy),
        (Schema::Array(array), Value::List(members)) => {
            let kept = members
                .iter()
                .filter_map(|member| accumulate_values(member, &array.member, policy))
                .collect::<List>();
            (!policy.is_absent_list(kept.len())).then_some(Value::List(kept))
        }
        _ => sanitize(value, policy),
    }
}

fn unknown(path: &FieldPath) -> FormError {
    FormError::UnknownField { path: path.clone() }
}

fn mismatch(path: &FieldPath, expected: &'static str) -> FormError {
    FormError::PathMismatch {
        path: path.clone(),
        expected,
    }
}

fn missing(path: &FieldPath, key: String) -> FormError {
    FormError::MissingMember {
        path: path.clone(),
        key,
    }
}
