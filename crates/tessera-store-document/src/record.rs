//! Entity-to-document mapping
//!
//! Entities map onto JSON documents through serde. `KEY_FIELD` names
//! the document field carrying the identity; the document id itself is
//! the key's canonical `Display` form, which is how the identity maps
//! onto the store's native key mechanism.

use serde::de::DeserializeOwned;
use serde::Serialize;
use tessera_core_types::Entity;

/// Mapping of an entity type onto a document collection.
pub trait DocumentRecord: Entity + Serialize + DeserializeOwned {
    /// Document field that carries the identity value.
    const KEY_FIELD: &'static str;

    /// Document id for an identity value.
    fn document_id(key: &Self::Key) -> String {
        key.to_string()
    }
}
