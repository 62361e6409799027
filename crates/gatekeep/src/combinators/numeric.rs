// File: src/combinators/numeric.rs
// Purpose: Sign and range rules over numbers
//
// Values are read with `coerce_number`, so numeric query strings work.

use serde_json::{json, Value};

use super::number_arg;
use super::types::{coerce_number, expect_type, ValueKind};
use crate::error_code::ErrorCode;
use crate::result::{invalid, pass};
use crate::validator::{sync_validator, Validator};

fn number_rule<F>(code: ErrorCode, args: Value, holds: F) -> Validator
where
    F: Fn(f64) -> bool + Send + Sync + 'static,
{
    expect_type(
        ValueKind::Number,
        sync_validator(move |value, _| match coerce_number(value) {
            Some(n) if holds(n) => pass(),
            _ => invalid(code, args.clone()),
        }),
    )
}

pub fn non_zero() -> Validator {
    number_rule(ErrorCode::NonZero, json!({}), |n| n != 0.0)
}

pub fn positive() -> Validator {
    number_rule(ErrorCode::Positive, json!({}), |n| n > 0.0)
}

pub fn negative() -> Validator {
    number_rule(ErrorCode::Negative, json!({}), |n| n < 0.0)
}

/// Zero or above
pub fn non_negative() -> Validator {
    number_rule(ErrorCode::PositiveOrZero, json!({}), |n| n >= 0.0)
}

/// Zero or below
pub fn non_positive() -> Validator {
    number_rule(ErrorCode::NegativeOrZero, json!({}), |n| n <= 0.0)
}

pub fn min_value(min: f64) -> Validator {
    number_rule(
        ErrorCode::Min,
        json!({ "minValue": number_arg(min) }),
        move |n| n >= min,
    )
}

pub fn max_value(max: f64) -> Validator {
    number_rule(
        ErrorCode::Max,
        json!({ "maxValue": number_arg(max) }),
        move |n| n <= max,
    )
}

pub fn min_max_value(min: f64, max: f64) -> Validator {
    number_rule(
        ErrorCode::MinMax,
        json!({ "minValue": number_arg(min), "maxValue": number_arg(max) }),
        move |n| n >= min && n <= max,
    )
}
