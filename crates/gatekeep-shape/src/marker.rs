//! Type markers and shape fields

use serde_json::Value;
use std::borrow::Cow;

use crate::check::json_type_name;

/// A set of primitive type markers a registry can declare fields with.
///
/// Implementors decide which names they report and which JSON values they
/// accept. The default `matches` compares the JS-style `typeof` name of the
/// value against `type_name`.
pub trait TypeMarker {
    /// Name reported in type mismatches (`"string"`, `"number"`, ...)
    fn type_name(&self) -> Cow<'static, str>;

    /// Escape hatch: an "any" marker never fails a type check
    fn is_any(&self) -> bool {
        false
    }

    /// Whether a single JSON value satisfies this marker
    fn matches(&self, value: &Value) -> bool {
        self.is_any() || json_type_name(value) == self.type_name()
    }
}

/// Expected type of one declared field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Marker<T> {
    /// A single value of type `T`
    Scalar(T),
    /// An array whose every element is of type `T`
    ArrayOf(T),
}

/// One named field of a declared shape
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShapeField<T> {
    pub name: &'static str,
    pub marker: Marker<T>,
}

impl<T> ShapeField<T> {
    pub const fn scalar(name: &'static str, marker: T) -> Self {
        Self {
            name,
            marker: Marker::Scalar(marker),
        }
    }

    pub const fn array_of(name: &'static str, marker: T) -> Self {
        Self {
            name,
            marker: Marker::ArrayOf(marker),
        }
    }
}
