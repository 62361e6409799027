// File: src/combinators/format.rs
// Purpose: Pattern, URL and email rules over strings

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::json;
use url::Url;

use super::types::{expect_type, ValueKind};
use crate::error_code::ErrorCode;
use crate::result::{invalid, pass};
use crate::validator::{sync_validator, Validator};

static EMAIL_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$")
        .expect("email pattern is valid")
});

/// Expected URL parts; `None` accepts whatever the URL has
#[derive(Debug, Clone, Default)]
pub struct MatchUrl {
    /// Serialized origin, e.g. `https://cdn.example.com`
    pub origin: Option<String>,
    /// Scheme with trailing colon, e.g. `https:`
    pub protocol: Option<String>,
}

impl MatchUrl {
    pub fn origin(origin: impl Into<String>) -> Self {
        Self {
            origin: Some(origin.into()),
            protocol: None,
        }
    }

    pub fn with_protocol(mut self, protocol: impl Into<String>) -> Self {
        self.protocol = Some(protocol.into());
        self
    }
}

fn string_rule<F>(check: F) -> Validator
where
    F: Fn(&str) -> crate::result::Verdict + Send + Sync + 'static,
{
    expect_type(
        ValueKind::String,
        sync_validator(move |value, _| check(value.as_str().unwrap_or_default())),
    )
}

/// The failure reports the pattern as `/pattern/`
pub fn matches_regex(regex: Regex) -> Validator {
    let args = json!({ "regExp": format!("/{}/", regex.as_str()) });

    string_rule(move |s| {
        if regex.is_match(s) {
            pass()
        } else {
            invalid(ErrorCode::InvalidRegex, args.clone())
        }
    })
}

/// Any absolute URL
pub fn is_url() -> Validator {
    string_rule(|s| match Url::parse(s) {
        Ok(_) => pass(),
        Err(_) => invalid(
            ErrorCode::InvalidUrl,
            json!({ "urlOrigin": "", "urlProtocol": "" }),
        ),
    })
}

/// An absolute URL with the expected origin and protocol.
///
/// A string that does not parse at all fails with Unknown.
pub fn match_url(expected: MatchUrl) -> Validator {
    string_rule(move |s| {
        let Ok(url) = Url::parse(s) else {
            return invalid(ErrorCode::Unknown, json!({}));
        };

        let origin = url.origin().ascii_serialization();
        let protocol = format!("{}:", url.scheme());

        let want_origin = expected.origin.clone().unwrap_or_else(|| origin.clone());
        let want_protocol = expected.protocol.clone().unwrap_or_else(|| protocol.clone());

        if want_origin == origin && want_protocol == protocol {
            pass()
        } else {
            invalid(
                ErrorCode::InvalidUrl,
                json!({ "urlOrigin": want_origin, "urlProtocol": want_protocol }),
            )
        }
    })
}

pub fn is_email() -> Validator {
    string_rule(|s| {
        if EMAIL_REGEX.is_match(s) {
            pass()
        } else {
            invalid(ErrorCode::InvalidEmail, json!({}))
        }
    })
}
