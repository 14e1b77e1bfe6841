//! Pagination for admin list screens.
//!
//! Pages are 1-based. The page count is always derived from the store's
//! exact row count, never from the length of the page just fetched.

use serde::Serialize;

/// Pagination parameters for one list request.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Pagination {
    /// 1-based page index
    pub page: u64,
    /// items per page
    pub per_page: u64,
}

impl Pagination {
    /// Clamp a requested page to at least 1 and a page size to at least 1.
    #[must_use]
    pub fn new(page: Option<u64>, per_page: u64) -> Self {
        Self {
            page: page.unwrap_or(1).max(1),
            per_page: per_page.max(1),
        }
    }

    /// Zero-based index of the first row on this page.
    #[must_use]
    pub fn offset(&self) -> u64 {
        (self.page - 1).saturating_mul(self.per_page)
    }

    /// The same page size positioned on the last page holding `total` rows,
    /// when this page lies past it.
    #[must_use]
    pub fn clamped(&self, total: u64) -> Option<Self> {
        let last = self.total_pages(total);
        (self.page > last).then_some(Self { page: last, per_page: self.per_page })
    }

    /// Number of pages needed for `total` rows. Zero rows still make one page.
    #[must_use]
    pub fn total_pages(&self, total: u64) -> u64 {
        total.div_ceil(self.per_page).max(1)
    }

    /// Navigation links for this page given the authoritative row count.
    #[must_use]
    pub fn links(&self, total: u64) -> PageLinks {
        let total_pages = self.total_pages(total);
        let current = self.page.min(total_pages);
        PageLinks {
            current,
            total_pages,
            prev: (current > 1).then(|| current - 1),
            next: (current < total_pages).then(|| current + 1),
            numbers: (1..=total_pages).collect(),
        }
    }
}

/// Rendered pagination controls. `prev`/`next` are `None` at the edges.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct PageLinks {
    pub current: u64,
    pub total_pages: u64,
    pub prev: Option<u64>,
    pub next: Option<u64>,
    pub numbers: Vec<u64>,
}

#[cfg(test)]
#[path = "pagination_test.rs"]
mod tests;
