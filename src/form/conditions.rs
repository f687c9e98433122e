//! Ready-made field validators.
//!
//! Except for the `required*` family, every condition accepts an absent or
//! blank value; combine with `required` to reject those.

use std::sync::LazyLock;

use regex::Regex;
use rust_decimal::Decimal;

use crate::value::Value;

use super::validation::FieldValidator;

static EMAIL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z0-9._%+\-]+@[A-Za-z0-9\-]+(\.[A-Za-z0-9\-]+)*\.[A-Za-z]{2,}$")
        .expect("email pattern is valid")
});

static URL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(https?|ftp)://[^\s/$.?#][^\s]*$").expect("url pattern is valid")
});

pub fn required() -> impl FieldValidator {
    |value: &Value, _: &Value| {
        if value.is_null() || value.as_str().is_some_and(str::is_empty) {
            Err("The field is required".to_owned())
        } else {
            Ok(())
        }
    }
}

/// Rejects null and whitespace-only text.
pub fn required_string() -> impl FieldValidator {
    |value: &Value, _: &Value| match value {
        Value::Text(text) if !text.trim().is_empty() => Ok(()),
        _ => Err("The field is required".to_owned()),
    }
}

pub fn required_list() -> impl FieldValidator {
    |value: &Value, _: &Value| match value {
        Value::List(items) if !items.is_empty() => Ok(()),
        _ => Err("The field is required".to_owned()),
    }
}

pub fn email() -> impl FieldValidator {
    |value: &Value, _: &Value| match value.as_str() {
        Some(text) if !text.is_empty() && !EMAIL_PATTERN.is_match(text) => {
            Err("The field must be a valid email".to_owned())
        }
        _ => Ok(()),
    }
}

pub fn url() -> impl FieldValidator {
    |value: &Value, _: &Value| match value.as_str() {
        Some(text) if !text.is_empty() && !URL_PATTERN.is_match(text) => {
            Err("The field must be a valid url".to_owned())
        }
        _ => Ok(()),
    }
}

/// Text length in characters, or list length.
pub fn length_greater_than(min: usize) -> impl FieldValidator {
    move |value: &Value, _: &Value| match value.len() {
        Some(len) if !value.is_blank() && len <= min => {
            Err(format!("The length must be greater than {min}"))
        }
        _ => Ok(()),
    }
}

pub fn length_smaller_than(max: usize) -> impl FieldValidator {
    move |value: &Value, _: &Value| match value.len() {
        Some(len) if len >= max => Err(format!("The length must be smaller than {max}")),
        _ => Ok(()),
    }
}

pub fn greater_than(bound: impl Into<Decimal>) -> impl FieldValidator {
    let bound = bound.into();
    move |value: &Value, _: &Value| match value.as_number() {
        Some(number) if number <= bound => Err(format!("The field must be greater than {bound}")),
        _ => Ok(()),
    }
}

pub fn greater_than_or_equal_to(bound: impl Into<Decimal>) -> impl FieldValidator {
    let bound = bound.into();
    move |value: &Value, _: &Value| match value.as_number() {
        Some(number) if number < bound => Err(format!(
            "The field must be greater than or equal to {bound}"
        )),
        _ => Ok(()),
    }
}

pub fn less_than(bound: impl Into<Decimal>) -> impl FieldValidator {
    let bound = bound.into();
    move |value: &Value, _: &Value| match value.as_number() {
        Some(number) if number >= bound => Err(format!("The field must be less than {bound}")),
        _ => Ok(()),
    }
}

pub fn less_than_or_equal_to(bound: impl Into<Decimal>) -> impl FieldValidator {
    let bound = bound.into();
    move |value: &Value, _: &Value| match value.as_number() {
        Some(number) if number > bound => Err(format!(
            "The field must be less than or equal to {bound}"
        )),
        _ => Ok(()),
    }
}

pub fn integer() -> impl FieldValidator {
    |value: &Value, _: &Value| match value.as_number() {
        Some(number) if !number.fract().is_zero() => {
            Err("The number should be an integer".to_owned())
        }
        _ => Ok(()),
    }
}
