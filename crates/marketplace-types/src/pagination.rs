//! # Pagination
//!
//! Offset/limit pagination envelope used by the offer store's query methods.

use serde::{Deserialize, Serialize};

/// Hard ceiling on page size, applied regardless of what the caller asks for.
pub const MAX_PAGE_SIZE: usize = 100;

/// Default page size when the caller does not specify one.
pub const DEFAULT_PAGE_SIZE: usize = 20;

/// A page request: where to start and how many rows to return.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRequest {
    /// Number of rows to skip.
    pub offset: usize,
    /// Requested number of rows; clamped to [`MAX_PAGE_SIZE`].
    pub limit: usize,
}

impl PageRequest {
    /// First page with the given limit.
    #[must_use]
    pub fn first(limit: usize) -> Self {
        Self { offset: 0, limit }
    }

    /// The effective limit after clamping. A zero limit falls back to the
    /// default rather than returning an empty page forever.
    #[must_use]
    pub fn effective_limit(&self) -> usize {
        if self.limit == 0 {
            DEFAULT_PAGE_SIZE
        } else {
            self.limit.min(MAX_PAGE_SIZE)
        }
    }

    /// The request for the page after this one.
    #[must_use]
    pub fn next(&self) -> Self {
        Self {
            offset: self.offset + self.effective_limit(),
            limit: self.limit,
        }
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            offset: 0,
            limit: DEFAULT_PAGE_SIZE,
        }
    }
}

/// One page of results plus the total count for the underlying query.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page<T> {
    /// Rows in this page, in query order.
    pub items: Vec<T>,
    /// Total rows matching the query, across all pages.
    pub total: usize,
    /// Offset this page started at.
    pub offset: usize,
}

impl<T> Page<T> {
    /// An empty page at offset zero.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            items: Vec::new(),
            total: 0,
            offset: 0,
        }
    }

    /// Whether rows exist beyond this page.
    #[must_use]
    pub fn has_more(&self) -> bool {
        self.offset + self.items.len() < self.total
    }
}
