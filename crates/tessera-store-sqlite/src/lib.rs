//! SQLite store adapter
//!
//! Realizes the tessera repository contract against a shared `rusqlite`
//! connection handle:
//! - `SqlRecord` maps an entity to its table, key column and row codec
//! - filters and ordering render as parameterized SQL, validated
//!   against the record's column whitelist
//! - statements run on the tokio blocking pool; the async caller never
//!   blocks a worker thread
//! - `rusqlite::Error` is classified into the uniform store-failure
//!   taxonomy with the native error retained as the cause
//!
//! The connection is owned and pooled by the caller; the adapter holds
//! a reference and never closes it.

pub mod adapter;
pub mod db;
pub mod record;
mod sql;

pub use adapter::SqliteRepository;
pub use db::{connect, open, open_in_memory, shared, SqliteHandle, SqliteSettings};
pub use record::SqlRecord;
