//! Tessera localization - JSON resource-file catalog
//!
//! Loads per-culture key/string mappings from `localization*.json`
//! files discovered recursively under a base directory at startup.
//! Lookups take an explicit culture (never thread-local state) and an
//! optional channel; a missing mapping returns the key verbatim, never
//! an error. Only the one-time load and empty-key arguments fail.

pub mod catalog;
pub mod reader;

pub use catalog::{Catalog, Culture, CultureSettings};
pub use reader::ReaderError;
