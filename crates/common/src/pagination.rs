//! Pagination for in-memory result sets.
//!
//! Admin tables fetch whole collections and page them client-side, so the
//! helpers here slice an already-filtered `Vec` rather than build SQL.

use serde::{Deserialize, Serialize};

/// Pagination parameters
#[derive(Clone, Copy, Debug, Deserialize)]
pub struct Pagination {
    /// 1-based page index
    #[serde(default = "default_page")]
    pub page: u32,
    /// items per page
    #[serde(default = "default_per_page")]
    pub per_page: u32,
}

fn default_page() -> u32 {
    1
}

fn default_per_page() -> u32 {
    10
}

impl Pagination {
    /// Clamp to sane values: page >= 1, per_page in 1..=100.
    pub fn normalize(self) -> (usize, usize) {
        let page = if self.page == 0 { 1 } else { self.page };
        let per_page = self.per_page.clamp(1, 100);
        ((page - 1) as usize, per_page as usize)
    }

    /// Slice one page out of a filtered set, with the controls the table
    /// footer renders (showing/total counts, page cursor).
    pub fn page_of<'a, T>(self, items: &'a [T]) -> (&'a [T], PageInfo) {
        let (page_idx, per_page) = self.normalize();
        let total = items.len();
        let total_pages = if total == 0 { 1 } else { total.div_ceil(per_page) };
        let page = (page_idx + 1).min(total_pages);
        let start = (page - 1) * per_page;
        let end = (start + per_page).min(total);
        let slice = &items[start..end];
        (
            slice,
            PageInfo {
                page: page as u32,
                per_page: per_page as u32,
                total_pages: total_pages as u32,
                showing: slice.len() as u32,
                total: total as u32,
            },
        )
    }
}

impl Default for Pagination {
    fn default() -> Self { Self { page: 1, per_page: 10 } }
}

/// Footer view-model for a paginated table.
#[derive(Clone, Copy, Debug, Serialize, PartialEq, Eq)]
pub struct PageInfo {
    pub page: u32,
    pub per_page: u32,
    pub total_pages: u32,
    pub showing: u32,
    pub total: u32,
}
