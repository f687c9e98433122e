use serde::{Deserialize, Serialize};

use super::Value;

/// Which present-but-falsy values are turned into absent ones before submit.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct SanitizePolicy {
    pub null: bool,
    pub empty_text: bool,
    /// Whitespace-only text.
    pub blank_text: bool,
    pub empty_list: bool,
    /// A nested record left without any present field.
    pub empty_record: bool,
    pub zero: bool,
    pub false_bool: bool,
    /// Keep record fields that the form schema does not describe.
    pub keep_unknown_fields: bool,
}

impl Default for SanitizePolicy {
    fn default() -> Self {
        Self {
            null: true,
            empty_text: true,
            blank_text: false,
            empty_list: false,
            empty_record: true,
            zero: false,
            false_bool: false,
            keep_unknown_fields: false,
        }
    }
}

impl SanitizePolicy {
    /// Keeps every value as it is.
    pub const fn preserve_all() -> Self {
        Self {
            null: false,
            empty_text: false,
            blank_text: false,
            empty_list: false,
            empty_record: false,
            zero: false,
            false_bool: false,
            keep_unknown_fields: true,
        }
    }

    /// Scalar check only; containers are decided after their members.
    pub fn is_absent_scalar(&self, value: &Value) -> bool {
        match value {
            Value::Null => self.null,
            Value::Text(text) if text.is_empty() => self.empty_text,
            Value::Text(text) => self.blank_text && text.trim().is_empty(),
            Value::Number(number) => self.zero && number.is_zero(),
            Value::Bool(flag) => self.false_bool && !flag,
            Value::List(_) | Value::Record(_) => false,
        }
    }

    pub(crate) fn is_absent_list(&self, len: usize) -> bool {
        self.empty_list && len == 0
    }

    pub(crate) fn is_absent_record(&self, len: usize) -> bool {
        self.empty_record && len == 0
    }
}

/// Schema-unaware sanitization. `None` means the value is absent.
pub fn sanitize(value: &Value, policy: &SanitizePolicy) -> Option<Value> {
    match value {
        Value::List(items) => {
            let kept = items
                .iter()
                .filter_map(|item| sanitize(item, policy))
                .collect::<im::Vector<_>>();
            (!policy.is_absent_list(kept.len())).then_some(Value::List(kept))
        }
        Value::Record(fields) => {
            let kept = fields
                .iter()
                .filter_map(|(key, value)| sanitize(value, policy).map(|value| (key.clone(), value)))
                .collect::<im::OrdMap<_, _>>();
            (!policy.is_absent_record(kept.len())).then_some(Value::Record(kept))
        }
        scalar => (!policy.is_absent_scalar(scalar)).then(|| scalar.clone()),
    }
}
