//! Aggregate root trait for domain models that own a consistency boundary.

/// Aggregate root marker + minimal interface.
///
/// The cart is the only aggregate in the storefront: every line item change goes
/// through it, so it is the place where the one-item-per-product rule holds.
pub trait AggregateRoot {
    /// Strongly-typed aggregate identifier.
    type Id: Clone + Eq + core::hash::Hash + core::fmt::Debug;

    /// Returns the aggregate identifier.
    fn id(&self) -> &Self::Id;

    /// Monotonically increasing version of the aggregate's state.
    ///
    /// Bumped by one per successful mutation. Restored aggregates start again
    /// from zero; the version is not persisted.
    fn version(&self) -> u64;
}
