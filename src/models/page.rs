//! Paginated collection shapes.

use serde::{Deserialize, Serialize};

/// Whether page metadata came from the server or was estimated client-side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Exactness {
    /// Totals were reported by the backend and can be rendered as-is.
    Reported,
    /// Totals are a client-side guess. Render a `has_more`-driven
    /// "load more" affordance instead of a numbered page count.
    Estimated,
}

/// Pagination metadata for one fetched page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageMeta {
    /// 1-based page number, always `>= 1`.
    pub page: u32,
    /// Requested page size, always `>= 1`.
    pub page_size: u32,
    /// Total item count across all pages (reported or estimated).
    pub total: u64,
    /// Total page count, always `>= 1`.
    pub total_pages: u32,
    /// Whether a further page is believed to exist.
    pub has_more: bool,
    /// Provenance of `total` / `total_pages`.
    pub exactness: Exactness,
}

impl PageMeta {
    /// Metadata for an empty collection at page 1.
    #[must_use]
    pub fn empty(page_size: u32) -> Self {
        Self {
            page: 1,
            page_size: page_size.max(1),
            total: 0,
            total_pages: 1,
            has_more: false,
            exactness: Exactness::Estimated,
        }
    }
}

/// One page of items plus its pagination metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageResult<T> {
    /// Items on this page; never longer than `meta.page_size`.
    pub items: Vec<T>,
    /// Pagination metadata for the fetch that produced `items`.
    pub meta: PageMeta,
}

impl<T> PageResult<T> {
    /// An empty page with defaulted metadata.
    #[must_use]
    pub fn empty(page_size: u32) -> Self {
        Self {
            items: Vec::new(),
            meta: PageMeta::empty(page_size),
        }
    }
}
