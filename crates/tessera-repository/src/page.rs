//! Paging argument validation
//!
//! Page arguments arrive as raw signed integers and are validated at
//! the contract boundary: every adapter funnels them through
//! [`PageRequest::new`] before touching the store.

use tessera_errors::{invalid_argument, DataResult};

/// A validated page request: zero-based index, positive size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    index: u64,
    size: u64,
}

impl PageRequest {
    /// Validate raw paging arguments.
    ///
    /// `page_size <= 0` or `page_index < 0` fail with
    /// `ERR_INVALID_ARGUMENT`; the `op` names the repository operation
    /// for error context.
    pub fn new(op: &str, page_index: i64, page_size: i64) -> DataResult<Self> {
        if page_index < 0 {
            return Err(invalid_argument(
                op,
                format!("page_index must be >= 0, got {}", page_index),
            ));
        }
        if page_size <= 0 {
            return Err(invalid_argument(
                op,
                format!("page_size must be > 0, got {}", page_size),
            ));
        }
        Ok(Self {
            index: page_index as u64,
            size: page_size as u64,
        })
    }

    pub fn index(&self) -> u64 {
        self.index
    }

    pub fn size(&self) -> u64 {
        self.size
    }

    /// Number of rows to skip before the first row of this page.
    pub fn offset(&self) -> u64 {
        self.index * self.size
    }
}
