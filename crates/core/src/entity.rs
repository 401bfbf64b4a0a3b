//! Entities: domain objects identified by a stable key, not by their contents.

/// A domain object with identity.
///
/// Two values with the same id are the same entity even when their other
/// fields differ; a renamed product is still the same product.
pub trait Entity {
    type Id: Copy + Eq + core::hash::Hash + core::fmt::Display;

    fn id(&self) -> &Self::Id;
}
