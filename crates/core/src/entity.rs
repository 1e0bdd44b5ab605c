//! Entity trait: identity that survives state changes.

/// Anything persisted under a stable identifier.
pub trait Entity {
    type Id: Copy + Eq + core::hash::Hash + core::fmt::Debug;

    fn id(&self) -> Self::Id;
}
