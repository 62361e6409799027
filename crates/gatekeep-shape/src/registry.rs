//! Shape registries

use crate::marker::{ShapeField, TypeMarker};

/// A static, closed mapping from keys to declared shapes.
///
/// Registries are immutable tables built at compile time. They are passed
/// explicitly into [`check_shape`](crate::check_shape) rather than looked up
/// from ambient state.
pub trait ShapeRegistry {
    /// Key type the registry is indexed by (an error code, an event type, ...)
    type Key;

    /// Marker set the registry declares fields with
    type Marker: TypeMarker;

    /// Declared shape for `key`; an empty slice means "no arguments"
    fn shape(&self, key: &Self::Key) -> &[ShapeField<Self::Marker>];
}

impl<R: ShapeRegistry + ?Sized> ShapeRegistry for &R {
    type Key = R::Key;
    type Marker = R::Marker;

    fn shape(&self, key: &Self::Key) -> &[ShapeField<Self::Marker>] {
        (**self).shape(key)
    }
}
