//! Pagination control model.

use serde::{Deserialize, Serialize};

use backoffice_core::total_pages;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaginationView {
    pub current_page: u32,
    pub total_pages: u32,
    pub total_results: u64,
    pub rows_per_page: u32,
    /// 1-based index of the first and last row shown on this page.
    pub first_row: u64,
    pub last_row: u64,
}

impl PaginationView {
    pub fn has_previous(&self) -> bool {
        self.current_page > 1
    }

    pub fn has_next(&self) -> bool {
        self.current_page < self.total_pages
    }
}

/// The pagination control, or `None` when every result fits on one page.
pub fn pagination_view(total_results: u64, current_page: u32, rows_per_page: u32) -> Option<PaginationView> {
    let rows_per_page = rows_per_page.max(1);
    if total_results <= u64::from(rows_per_page) {
        return None;
    }

    let pages = total_pages(total_results, rows_per_page);
    let current_page = current_page.clamp(1, pages);
    let first_row = u64::from(current_page - 1) * u64::from(rows_per_page) + 1;
    let last_row = (first_row + u64::from(rows_per_page) - 1).min(total_results);

    Some(PaginationView {
        current_page,
        total_pages: pages,
        total_results,
        rows_per_page,
        first_row,
        last_row,
    })
}
