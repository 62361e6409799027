// File: src/combinators/types.rs
// Purpose: Type guards and null handling

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{json, Value};

use super::date::parse_date;
use super::logic::no_validate;
use crate::error_code::ErrorCode;
use crate::result::{invalid, pass};
use crate::validator::{validator, Validator};

/// Leading float literal of a string, the way lenient number parsing reads it
static FLOAT_PREFIX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[+-]?(?:\d+\.?\d*|\.\d+)(?:[eE][+-]?\d+)?")
        .expect("float prefix pattern is valid")
});

/// Runtime kinds a value can be guarded against
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    String,
    Number,
    Boolean,
    Object,
    Date,
}

impl ValueKind {
    pub fn name(self) -> &'static str {
        match self {
            ValueKind::String => "string",
            ValueKind::Number => "number",
            ValueKind::Boolean => "boolean",
            ValueKind::Object => "object",
            ValueKind::Date => "date",
        }
    }

    /// Lenient check: numbers and dates may arrive as strings
    pub fn accepts(self, value: &Value) -> bool {
        match self {
            ValueKind::Number => coerce_number(value).is_some(),
            ValueKind::Date => parse_date(value).is_some(),
            _ => self.is_exactly(value),
        }
    }

    /// Strict check on the JSON type itself
    pub fn is_exactly(self, value: &Value) -> bool {
        match self {
            ValueKind::String => value.is_string(),
            ValueKind::Number => value.is_number(),
            ValueKind::Boolean => value.is_boolean(),
            ValueKind::Object => value.is_object(),
            ValueKind::Date => parse_date(value).is_some(),
        }
    }
}

/// Read a value as a finite number.
///
/// JSON numbers are taken as is. Strings are read by their leading float
/// literal, so `"12px"` reads as `12.0` and `"px"` reads as nothing.
pub fn coerce_number(value: &Value) -> Option<f64> {
    let n = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => FLOAT_PREFIX.find(s.trim_start())?.as_str().parse().ok()?,
        _ => return None,
    };
    n.is_finite().then_some(n)
}

/// Fail with InvalidDataType unless the value is of `kind`, else run `inner`
pub fn expect_type(kind: ValueKind, inner: Validator) -> Validator {
    validator(move |value, ctx| {
        let inner = inner.clone();
        async move {
            if kind.accepts(&value) {
                inner(value, ctx).await
            } else {
                invalid(ErrorCode::InvalidDataType, json!({ "expectedType": kind.name() }))
            }
        }
    })
}

/// Fail with InvalidDataType `{expectedType: "array"}` unless the value is an
/// array whose every element is exactly of `kind`
pub fn expect_array_of(kind: ValueKind, inner: Validator) -> Validator {
    validator(move |value, ctx| {
        let inner = inner.clone();
        async move {
            let well_typed = value
                .as_array()
                .is_some_and(|items| items.iter().all(|item| kind.is_exactly(item)));

            if well_typed {
                inner(value, ctx).await
            } else {
                invalid(ErrorCode::InvalidDataType, json!({ "expectedType": "array" }))
            }
        }
    })
}

/// Null passes without running `inner`
pub fn nullable(inner: Validator) -> Validator {
    validator(move |value, ctx| {
        let inner = inner.clone();
        async move {
            if value.is_null() {
                pass()
            } else {
                inner(value, ctx).await
            }
        }
    })
}

/// Null fails with NullOrUndefined, anything else runs `inner`
pub fn not_nullable(inner: Validator) -> Validator {
    validator(move |value, ctx| {
        let inner = inner.clone();
        async move {
            if value.is_null() {
                invalid(ErrorCode::NullOrUndefined, json!({}))
            } else {
                inner(value, ctx).await
            }
        }
    })
}

pub fn string() -> Validator {
    expect_type(ValueKind::String, no_validate())
}

pub fn number() -> Validator {
    expect_type(ValueKind::Number, no_validate())
}
