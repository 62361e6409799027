// File: src/combinators/array.rs
// Purpose: Array size rules, set membership and per-element validation

use futures::future::join_all;
use serde_json::{json, Value};

use crate::error_code::ErrorCode;
use crate::result::{invalid, pass, ValidationResult, Verdict};
use crate::validator::{sync_validator, validator, Validator};

/// A closed set of named values a parameter may take.
///
/// `VARIANTS` pairs each key with the value clients send, e.g.
/// `("OrgCreate", "ORG_CREATE")`.
pub trait ParamEnum {
    const VARIANTS: &'static [(&'static str, &'static str)];

    fn keys() -> Vec<&'static str> {
        Self::VARIANTS.iter().map(|(key, _)| *key).collect()
    }

    fn values() -> Vec<&'static str> {
        Self::VARIANTS.iter().map(|(_, value)| *value).collect()
    }

    fn has_value(candidate: &str) -> bool {
        Self::VARIANTS.iter().any(|(_, value)| *value == candidate)
    }
}

fn size_rule<F>(code: ErrorCode, args: Value, within: F) -> Validator
where
    F: Fn(usize) -> bool + Send + Sync + 'static,
{
    sync_validator(move |value, _| match value.as_array() {
        Some(items) if within(items.len()) => pass(),
        _ => invalid(code, args.clone()),
    })
}

pub fn not_empty_array() -> Validator {
    size_rule(ErrorCode::EmptyArr, json!({}), |len| len > 0)
}

pub fn min_items(min: usize) -> Validator {
    size_rule(ErrorCode::MinArrLength, json!({ "minLength": min }), move |len| len >= min)
}

pub fn max_items(max: usize) -> Validator {
    size_rule(ErrorCode::MaxArrLength, json!({ "maxLength": max }), move |len| len <= max)
}

pub fn items_between(min: usize, max: usize) -> Validator {
    size_rule(
        ErrorCode::MinMaxArrLength,
        json!({ "minLength": min, "maxLength": max }),
        move |len| (min..=max).contains(&len),
    )
}

/// Value must equal one of `allowed`
pub fn in_array<I, T>(allowed: I) -> Validator
where
    I: IntoIterator<Item = T>,
    T: Into<Value>,
{
    let allowed: Vec<Value> = allowed.into_iter().map(Into::into).collect();
    let args = json!({ "allowedValues": allowed });

    sync_validator(move |value, _| {
        if allowed.contains(value) {
            pass()
        } else {
            invalid(ErrorCode::NotInAllowedSet, args.clone())
        }
    })
}

/// Value must equal none of `disallowed`
pub fn not_in_array<I, T>(disallowed: I) -> Validator
where
    I: IntoIterator<Item = T>,
    T: Into<Value>,
{
    let disallowed: Vec<Value> = disallowed.into_iter().map(Into::into).collect();
    let args = json!({ "disallowedValues": disallowed });

    sync_validator(move |value, _| {
        if disallowed.contains(value) {
            invalid(ErrorCode::InDisallowedSet, args.clone())
        } else {
            pass()
        }
    })
}

/// Value must be one of the enum's values. The failure lists the enum's keys.
pub fn in_enum<E: ParamEnum + 'static>() -> Validator {
    let args = json!({ "allowedValues": E::keys() });

    sync_validator(move |value, _| {
        let known = value.as_str().is_some_and(E::has_value);
        if known {
            pass()
        } else {
            invalid(ErrorCode::NotInAllowedSet, args.clone())
        }
    })
}

/// Value must not be one of the enum's values. The failure lists the values.
pub fn not_in_enum<E: ParamEnum + 'static>() -> Validator {
    let args = json!({ "disallowedValues": E::values() });

    sync_validator(move |value, _| {
        let known = value.as_str().is_some_and(E::has_value);
        if known {
            invalid(ErrorCode::InDisallowedSet, args.clone())
        } else {
            pass()
        }
    })
}

/// Run `inner` on every element concurrently.
///
/// On any failure the verdict is an ArrElemInvalid marker listing the failing
/// indexes, followed by every element failure in index order.
pub fn for_each(inner: Validator) -> Validator {
    validator(move |value, ctx| {
        let inner = inner.clone();
        async move {
            let Value::Array(items) = value else {
                return invalid(ErrorCode::InvalidDataType, json!({ "expectedType": "array" }));
            };

            let verdicts = join_all(items.into_iter().map(|item| inner(item, ctx.clone()))).await;

            let mut invalid_indexes = Vec::new();
            let mut failures = Vec::new();
            for (index, verdict) in verdicts.into_iter().enumerate() {
                let element_failures = verdict.failures();
                if !element_failures.is_empty() {
                    invalid_indexes.push(index);
                    failures.extend(element_failures);
                }
            }

            if invalid_indexes.is_empty() {
                return pass();
            }

            let mut results = vec![ValidationResult::Fail {
                error_code: ErrorCode::ArrElemInvalid,
                error_args: json!({ "invalidIndexes": invalid_indexes }),
            }];
            results.extend(failures);
            Verdict::Many(results)
        }
    })
}
