//! Value object trait: equality by value, not identity.

/// Marker trait for value objects.
///
/// Value objects are immutable and compared by their attribute values. A value
/// object that carries an invariant (e.g. a non-empty product name) should only
/// be constructible through a validating constructor, so every instance in the
/// program already satisfies it.
///
/// ```ignore
/// #[derive(Debug, Clone, PartialEq, Eq)]
/// struct Sku(String);
///
/// impl ValueObject for Sku {}
/// ```
pub trait ValueObject: Clone + PartialEq + core::fmt::Debug {}
