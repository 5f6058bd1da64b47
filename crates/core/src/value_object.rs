//! Value object trait: equality by value, not identity.
//!
//! Value objects are domain objects that have **no identity** - they are defined entirely
//! by their attribute values. Two value objects with the same values are considered equal.

/// Marker trait for value objects.
///
/// Value objects are **immutable** and **compared by value**. To "modify" one,
/// build a new one with the new values (`CartItem::with_quantity`,
/// `Money::checked_mul`, ...). The cart relies on this: it replaces line items
/// by index and never edits a field of a stored item in place.
///
/// ## Value Object vs Entity
///
/// - **Value Object**: No identity (two cart items with the same values are equal)
/// - **Entity**: Has identity (two products with the same id are the same product)
///
/// ```ignore
/// let a = Money::from_cents(1_000);
/// let b = Money::from_cents(1_000);
/// assert_eq!(a, b); // equal by value
/// ```
pub trait ValueObject: Clone + PartialEq + core::fmt::Debug {}
