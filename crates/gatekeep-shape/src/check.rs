//! The shape-check algorithm

use serde::Serialize;
use serde_json::Value;

use crate::marker::{Marker, ShapeField, TypeMarker};
use crate::registry::ShapeRegistry;

/// A declared field whose supplied value has the wrong type
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TypeMismatch {
    pub field: String,
    pub expected_type: String,
    pub received_type: String,
}

/// Outcome of checking a supplied object against a declared shape
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "valid")]
pub enum ShapeCheck {
    #[serde(rename = "true")]
    Valid,
    #[serde(rename = "false", rename_all = "camelCase")]
    Invalid {
        missing_fields: Vec<String>,
        type_errors: Vec<TypeMismatch>,
    },
}

impl ShapeCheck {
    pub fn is_valid(&self) -> bool {
        matches!(self, ShapeCheck::Valid)
    }

    /// Declared fields absent from the supplied object
    pub fn missing_fields(&self) -> &[String] {
        match self {
            ShapeCheck::Valid => &[],
            ShapeCheck::Invalid { missing_fields, .. } => missing_fields,
        }
    }

    /// Declared fields present with the wrong type
    pub fn type_errors(&self) -> &[TypeMismatch] {
        match self {
            ShapeCheck::Valid => &[],
            ShapeCheck::Invalid { type_errors, .. } => type_errors,
        }
    }
}

/// JS-style `typeof` name of a JSON value.
///
/// Arrays and `null` report `"object"`, mirroring how shape declarations are
/// written by API clients.
pub fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null | Value::Array(_) | Value::Object(_) => "object",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
    }
}

/// Check `supplied` against the shape `registry` declares for `key`.
///
/// - an empty declared shape always validates, whatever is supplied
/// - all missing fields are collected before any type is looked at
/// - type errors are only reported when nothing is missing
///
/// Never panics; every outcome is a [`ShapeCheck`].
pub fn check_shape<R>(registry: &R, key: &R::Key, supplied: &Value) -> ShapeCheck
where
    R: ShapeRegistry + ?Sized,
{
    let shape = registry.shape(key);
    if shape.is_empty() {
        return ShapeCheck::Valid;
    }

    let present = |name: &str| {
        supplied
            .as_object()
            .is_some_and(|object| object.contains_key(name))
    };

    let missing_fields: Vec<String> = shape
        .iter()
        .filter(|field| !present(field.name))
        .map(|field| field.name.to_string())
        .collect();

    if !missing_fields.is_empty() {
        return ShapeCheck::Invalid {
            missing_fields,
            type_errors: Vec::new(),
        };
    }

    let type_errors: Vec<TypeMismatch> = shape
        .iter()
        .filter_map(|field| {
            let value = supplied.get(field.name)?;
            check_field(field, value)
        })
        .collect();

    if type_errors.is_empty() {
        ShapeCheck::Valid
    } else {
        ShapeCheck::Invalid {
            missing_fields: Vec::new(),
            type_errors,
        }
    }
}

/// Bind a registry once and get back a reusable `(key, value) -> ShapeCheck` closure
pub fn shape_checker<R>(registry: R) -> impl Fn(&R::Key, &Value) -> ShapeCheck
where
    R: ShapeRegistry,
{
    move |key, supplied| check_shape(&registry, key, supplied)
}

fn check_field<M: TypeMarker>(field: &ShapeField<M>, value: &Value) -> Option<TypeMismatch> {
    let mismatch = |expected: String, received: String| TypeMismatch {
        field: field.name.to_string(),
        expected_type: expected,
        received_type: received,
    };

    match &field.marker {
        Marker::Scalar(marker) => {
            if marker.matches(value) {
                None
            } else {
                Some(mismatch(
                    marker.type_name().into_owned(),
                    json_type_name(value).to_string(),
                ))
            }
        }
        Marker::ArrayOf(marker) => {
            let element_name = if marker.is_any() {
                "any".into()
            } else {
                marker.type_name()
            };

            let Some(items) = value.as_array() else {
                return Some(mismatch(
                    format!("{element_name}[]"),
                    json_type_name(value).to_string(),
                ));
            };

            if marker.is_any() || items.iter().all(|item| marker.matches(item)) {
                return None;
            }

            let received: Vec<&str> = items.iter().map(json_type_name).collect();
            Some(mismatch(
                format!("{element_name}[]"),
                format!("[{}]", received.join(", ")),
            ))
        }
    }
}
