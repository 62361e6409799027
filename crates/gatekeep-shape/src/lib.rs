//! Gatekeep Shape
//!
//! Checks a runtime JSON object against a statically declared "shape": a list of
//! field names, each paired with an expected type marker. The same check serves
//! any number of unrelated registries (error-argument shapes, event metadata
//! shapes, ...) because it is generic over both the registry and the marker set.

pub mod check;
pub mod marker;
pub mod registry;

pub use check::{check_shape, json_type_name, shape_checker, ShapeCheck, TypeMismatch};
pub use marker::{Marker, ShapeField, TypeMarker};
pub use registry::ShapeRegistry;
