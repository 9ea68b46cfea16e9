//! Entity capability
//!
//! Any type persisted through a repository exposes a stable identity
//! value through this trait. The identity is immutable for the lifetime
//! of the entity within a repository; stores that assign keys on insert
//! report the assigned key through the entity returned by `add`.

use std::fmt::Display;
use std::hash::Hash;

/// Capability required of identity values.
///
/// Both numeric and string keys qualify; `Display` gives the canonical
/// textual form used for document ids, telemetry entries and error
/// context.
pub trait EntityKey: Clone + Eq + Hash + Display + Send + Sync + 'static {}

impl<T> EntityKey for T where T: Clone + Eq + Hash + Display + Send + Sync + 'static {}

/// Marker capability for persisted types.
pub trait Entity: Clone + Send + Sync + 'static {
    /// Identity type of this entity.
    type Key: EntityKey;

    /// Stable entity-type label, used in telemetry entries and error
    /// context. Conventionally the lower-case type name.
    const NAME: &'static str;

    /// The entity's identity value.
    fn key(&self) -> Self::Key;
}
