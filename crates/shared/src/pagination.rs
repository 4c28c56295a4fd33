//! Page-number pagination utilities.

use serde::{Deserialize, Serialize};

/// Default page size for list endpoints.
pub const DEFAULT_PER_PAGE: i64 = 20;

/// Largest page size a caller may request.
pub const MAX_PER_PAGE: i64 = 100;

/// A normalized page request.
///
/// Out-of-range input is clamped rather than rejected: page starts at 1 and
/// per_page stays within 1..=100.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: i64,
    pub per_page: i64,
}

impl PageRequest {
    pub fn new(page: Option<i64>, per_page: Option<i64>) -> Self {
        Self {
            page: page.unwrap_or(1).max(1),
            per_page: per_page
                .unwrap_or(DEFAULT_PER_PAGE)
                .clamp(1, MAX_PER_PAGE),
        }
    }

    /// SQL LIMIT for this page.
    pub fn limit(&self) -> i64 {
        self.per_page
    }

    /// SQL OFFSET for this page.
    pub fn offset(&self) -> i64 {
        (self.page - 1) * self.per_page
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::new(None, None)
    }
}

/// Pagination info returned alongside list data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    pub page: i64,
    pub per_page: i64,
    pub total: i64,
    pub total_pages: i64,
}

impl Pagination {
    pub fn new(request: PageRequest, total: i64) -> Self {
        let total_pages = if total <= 0 {
            0
        } else {
            (total + request.per_page - 1) / request.per_page
        };
        Self {
            page: request.page,
            per_page: request.per_page,
            total,
            total_pages,
        }
    }
}
