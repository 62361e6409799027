// File: src/combinators/date.rs
// Purpose: Date parsing and date rules

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use serde_json::{json, Value};

use super::types::{expect_type, ValueKind};
use crate::error_code::ErrorCode;
use crate::result::{invalid, pass};
use crate::validator::{sync_validator, Validator};

/// Read a value as a point in time.
///
/// Strings may be RFC 3339, `YYYY-MM-DD` (midnight UTC), a naive
/// `YYYY-MM-DDTHH:MM:SS` (UTC) or RFC 2822. Numbers are epoch milliseconds.
pub fn parse_date(value: &Value) -> Option<DateTime<Utc>> {
    match value {
        Value::String(s) => parse_date_str(s.trim()),
        Value::Number(n) => {
            let millis = n.as_i64().or_else(|| n.as_f64().map(|f| f as i64))?;
            Utc.timestamp_millis_opt(millis).single()
        }
        _ => None,
    }
}

fn parse_date_str(s: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(day) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return day.and_hms_opt(0, 0, 0).map(|naive| naive.and_utc());
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(naive.and_utc());
    }
    DateTime::parse_from_rfc2822(s)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

/// Unparseable values fail the type guard; InvalidDate means the date
/// parsed but `holds` rejected it
fn date_rule<F>(holds: F) -> Validator
where
    F: Fn(DateTime<Utc>) -> bool + Send + Sync + 'static,
{
    expect_type(
        ValueKind::Date,
        sync_validator(move |value, _| match parse_date(value) {
            Some(when) if holds(when) => pass(),
            _ => invalid(ErrorCode::InvalidDate, json!({})),
        }),
    )
}

pub fn date() -> Validator {
    date_rule(|_| true)
}

/// Strictly after now
pub fn date_future() -> Validator {
    date_rule(|when| when > Utc::now())
}

/// Strictly before now
pub fn date_past() -> Validator {
    date_rule(|when| when < Utc::now())
}
