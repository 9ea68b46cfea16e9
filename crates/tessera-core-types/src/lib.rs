//! Tessera core types - shared capabilities and correlation primitives
//!
//! This crate is the leaf of the workspace: it defines the entity
//! capability every persisted type satisfies and the correlation
//! identifiers threaded through telemetry and errors.

pub mod correlation;
pub mod entity;

pub use correlation::{RequestId, SpanId, TraceId};
pub use entity::{Entity, EntityKey};
