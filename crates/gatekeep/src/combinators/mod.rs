// File: src/combinators/mod.rs
// Purpose: Composable validator constructors
//
// Every constructor returns a `Validator`, so rules nest:
// `nullable(all_of(vec![min_length(3), max_length(40)]))`.

pub mod array;
pub mod date;
pub mod format;
pub mod logic;
pub mod numeric;
pub mod string;
pub mod types;

pub use array::{
    for_each, in_array, in_enum, items_between, max_items, min_items, not_empty_array,
    not_in_array, not_in_enum, ParamEnum,
};
pub use date::{date, date_future, date_past, parse_date};
pub use format::{is_email, is_url, match_url, matches_regex, MatchUrl};
pub use logic::{all_of, any_of, force_fail, no_validate, reject};
pub use numeric::{
    max_value, min_max_value, min_value, negative, non_negative, non_positive, non_zero, positive,
};
pub use string::{exact_length, length_between, max_length, min_length, not_empty};
pub use types::{
    coerce_number, expect_array_of, expect_type, not_nullable, nullable, number, string, ValueKind,
};

use serde_json::Value;

/// Number argument for an error payload; whole numbers serialize without a fraction
pub(crate) fn number_arg(n: f64) -> Value {
    if n.fract() == 0.0 && n.abs() < 9.0e15 {
        Value::from(n as i64)
    } else {
        Value::from(n)
    }
}
