//! Best-effort pagination metadata estimation.
//!
//! The backend does not reliably report totals. When it does, they are
//! trusted and tagged [`Exactness::Reported`]; otherwise the page shape
//! itself drives a conservative estimate tagged [`Exactness::Estimated`]
//! so callers can fall back to a "load more" affordance instead of
//! rendering a page count the client cannot justify.

use serde_json::Value;

use crate::models::page::{Exactness, PageMeta};

/// When a full page comes back with no reported totals, assume at least
/// this many pages exist so the pager stays enabled.
const ASSUMED_MIN_PAGES: u32 = 3;

/// Server-reported pagination hints, when the response carried any.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ServerHints {
    /// Reported total item count.
    pub total: Option<u64>,
    /// Reported total page count.
    pub total_pages: Option<u32>,
    /// Reported current page.
    pub page: Option<u32>,
}

impl ServerHints {
    /// Read hints out of a raw response body.
    ///
    /// Checks the top level, then a nested `meta` object, then a nested
    /// `pagination` object (which reports pages as `pages`). Negative or
    /// non-numeric values are ignored.
    #[must_use]
    pub fn from_response(raw: &Value) -> Self {
        let Value::Object(_) = raw else {
            return Self::default();
        };

        let scopes = [
            (Some(raw), "totalPages"),
            (raw.get("meta"), "totalPages"),
            (raw.get("pagination"), "pages"),
        ];

        for (scope, pages_key) in scopes {
            let Some(scope) = scope else { continue };
            let hints = Self {
                total: read_u64(scope.get("total")),
                total_pages: read_u32(scope.get(pages_key)),
                page: read_u32(scope.get("page")),
            };
            if hints.total.is_some() || hints.total_pages.is_some() || hints.page.is_some() {
                return hints;
            }
        }

        Self::default()
    }

    /// Field-wise fallback: keep `self`'s values, fill gaps from `other`.
    ///
    /// Used when the response body and the envelope `meta` both may carry
    /// totals; the body wins.
    #[must_use]
    pub fn or(self, other: Self) -> Self {
        Self {
            total: self.total.or(other.total),
            total_pages: self.total_pages.or(other.total_pages),
            page: self.page.or(other.page),
        }
    }
}

/// Estimate pagination metadata for one fetched page.
///
/// Algorithm:
/// 1. Both `total` and `total_pages` reported — trust them.
/// 2. Full page (`items_returned == page_size`) — more data may exist;
///    placeholder `total_pages = max(page + 1, 3)`.
/// 3. Partial page — this is the last page; exact total derived from
///    the pages before it.
/// 4. Empty page — empty collection.
///
/// `requested_page` and `page_size` are clamped to `>= 1` before the
/// algorithm runs; `total_pages` is always `>= 1`. Never fails.
#[must_use]
pub fn estimate(
    items_returned: usize,
    requested_page: u32,
    page_size: u32,
    hints: ServerHints,
) -> PageMeta {
    let page_size = page_size.max(1);
    let requested_page = requested_page.max(1);
    let page = hints.page.filter(|p| *p >= 1).unwrap_or(requested_page);

    if let (Some(total), Some(total_pages)) = (hints.total, hints.total_pages) {
        let total_pages = total_pages.max(1);
        return PageMeta {
            page,
            page_size,
            total,
            total_pages,
            has_more: page < total_pages,
            exactness: Exactness::Reported,
        };
    }

    let items = u32::try_from(items_returned).unwrap_or(u32::MAX);
    if items >= page_size {
        let total_pages = (page + 1).max(ASSUMED_MIN_PAGES);
        return PageMeta {
            page,
            page_size,
            total: u64::from(total_pages) * u64::from(page_size),
            total_pages,
            has_more: true,
            exactness: Exactness::Estimated,
        };
    }

    if items > 0 {
        return PageMeta {
            page,
            page_size,
            total: u64::from(items) + u64::from(page - 1) * u64::from(page_size),
            total_pages: page,
            has_more: false,
            exactness: Exactness::Estimated,
        };
    }

    PageMeta {
        page,
        page_size,
        total: 0,
        total_pages: 1,
        has_more: false,
        exactness: Exactness::Estimated,
    }
}

/// Non-negative integer from a JSON number; floats are truncated.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)] // guarded by the >= 0 filter
fn read_u64(value: Option<&Value>) -> Option<u64> {
    let value = value?;
    if let Some(n) = value.as_u64() {
        return Some(n);
    }
    value
        .as_f64()
        .filter(|f| f.is_finite() && *f >= 0.0)
        .map(|f| f.trunc() as u64)
}

fn read_u32(value: Option<&Value>) -> Option<u32> {
    read_u64(value).map(|n| u32::try_from(n).unwrap_or(u32::MAX))
}
