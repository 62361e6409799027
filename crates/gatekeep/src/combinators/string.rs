// File: src/combinators/string.rs
// Purpose: String length rules
//
// Lengths are counted in characters after trimming surrounding whitespace.
// Non-strings fail with InvalidDataType before any rule runs.

use serde_json::{json, Value};

use super::types::{expect_type, ValueKind};
use crate::error_code::ErrorCode;
use crate::result::{invalid, pass};
use crate::validator::{sync_validator, Validator};

fn trimmed_len(value: &Value) -> usize {
    value.as_str().map_or(0, |s| s.trim().chars().count())
}

fn length_rule<F>(code: ErrorCode, args: Value, within: F) -> Validator
where
    F: Fn(usize) -> bool + Send + Sync + 'static,
{
    expect_type(
        ValueKind::String,
        sync_validator(move |value, _| {
            if within(trimmed_len(value)) {
                pass()
            } else {
                invalid(code, args.clone())
            }
        }),
    )
}

pub fn not_empty() -> Validator {
    length_rule(ErrorCode::EmptyString, json!({}), |len| len > 0)
}

pub fn exact_length(expected: usize) -> Validator {
    length_rule(
        ErrorCode::ExactStringLength,
        json!({ "expectedLength": expected }),
        move |len| len == expected,
    )
}

pub fn min_length(min: usize) -> Validator {
    length_rule(
        ErrorCode::MinStringLength,
        json!({ "minLength": min }),
        move |len| len >= min,
    )
}

pub fn max_length(max: usize) -> Validator {
    length_rule(
        ErrorCode::MaxStringLength,
        json!({ "maxLength": max }),
        move |len| len <= max,
    )
}

/// Inclusive on both ends
pub fn length_between(min: usize, max: usize) -> Validator {
    length_rule(
        ErrorCode::MinMaxStringLength,
        json!({ "minLength": min, "maxLength": max }),
        move |len| (min..=max).contains(&len),
    )
}
