//! Document store adapter
//!
//! Realizes the tessera repository contract against a narrow document
//! driver surface:
//! - `DocumentCollection` - the opaque driver: insert/replace/delete/
//!   get/scan over JSON documents, filtered by Mongo-style filter
//!   documents
//! - `DocumentRecord` - serde-based mapping of an entity onto a
//!   document, naming the field that carries the identity
//! - `DocumentRepository` - the adapter: translates portable filters
//!   into filter documents and classifies driver failures
//! - `MemoryCollection` - an in-process implementation of the driver
//!   surface, useful embedded and under test
//!
//! The filter-document language has no LIKE equivalent, so `Like`
//! predicates are rejected at the contract boundary rather than
//! evaluated client-side.

pub mod adapter;
pub mod client;
pub mod memory;
pub mod record;

pub use adapter::DocumentRepository;
pub use client::{CollectionError, DocumentCollection, ScanOptions, SortSpec};
pub use memory::MemoryCollection;
pub use record::DocumentRecord;
