//! Tessera repository contract
//!
//! The uniform data-access surface implemented by every store adapter:
//! - `Repository<E>` - async CRUD + predicate querying + paging
//! - `Filter` / `Scalar` - portable predicate AST, translated by each
//!   adapter into its store's native query representation
//! - `Sort` - optional ordering key
//! - `PageRequest` - validated paging arguments
//!
//! Adapters own the translation to their store; constructs a store
//! cannot evaluate server-side are rejected at this boundary, never
//! silently dropped.

pub mod contract;
pub mod filter;
pub mod page;

pub use contract::Repository;
pub use filter::{Filter, Scalar, Sort};
pub use page::PageRequest;
