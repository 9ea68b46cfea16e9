//! Correlation identifiers for operation tracking
//!
//! These identifiers correlate a logical operation across the telemetry
//! pipeline and error context. UUIDv7 keeps them sortable by creation
//! time.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Identifier for a single logical request entering the system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RequestId(Uuid);

/// Identifier for a distributed trace spanning service boundaries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TraceId(Uuid);

/// Identifier for one telemetry span within a trace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SpanId(Uuid);

macro_rules! correlation_id {
    ($name:ident) => {
        impl $name {
            /// Generate a fresh identifier (UUIDv7).
            pub fn new() -> Self {
                Self(Uuid::now_v7())
            }

            /// Rehydrate from an existing UUID (for deserialized records).
            pub fn from_uuid(id: Uuid) -> Self {
                Self(id)
            }

            pub fn as_uuid(&self) -> Uuid {
                self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

correlation_id!(RequestId);
correlation_id!(TraceId);
correlation_id!(SpanId);
