//! Pagination shared by every `filter`/`search` operation (spec §4.2/§4.3).
//! Grounded on `original_source/utils/pagination.py`'s page/skip arithmetic.

use serde::{Deserialize, Serialize};

pub const DEFAULT_PAGE_SIZE: u32 = 50;
pub const MAX_PAGE_SIZE: u32 = 100;

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Pagination {
    pub page: u32,
    pub size: u32,
}

impl Default for Pagination {
    fn default() -> Self {
        Self { page: 1, size: DEFAULT_PAGE_SIZE }
    }
}

impl Pagination {
    pub fn new(page: u32, size: u32) -> Self {
        let page = page.max(1);
        let size = size.clamp(1, MAX_PAGE_SIZE);
        Self { page, size }
    }

    /// Row offset for a SQL `OFFSET` clause.
    pub fn offset(&self) -> i64 {
        ((self.page - 1) as i64) * (self.size as i64)
    }

    pub fn limit(&self) -> i64 {
        self.size as i64
    }
}

/// `{items, total, page, size, pages}` result shape (spec §4.2).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub page: u32,
    pub size: u32,
    pub pages: u32,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, total: u64, pagination: Pagination) -> Self {
        let pages = if pagination.size == 0 { 0 } else { ((total as u32) + pagination.size - 1) / pagination.size };
        Page { items, total, page: pagination.page, size: pagination.size, pages }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn offset_is_zero_based() {
        let p = Pagination::new(1, 50);
        assert_eq!(p.offset(), 0);
        let p2 = Pagination::new(3, 50);
        assert_eq!(p2.offset(), 100);
    }

    #[test]
    fn size_is_clamped() {
        let p = Pagination::new(1, 1000);
        assert_eq!(p.size, MAX_PAGE_SIZE);
        let p2 = Pagination::new(1, 0);
        assert_eq!(p2.size, 1);
    }

    #[test]
    fn page_count_rounds_up() {
        let page: Page<i32> = Page::new(vec![1, 2], 101, Pagination::new(1, 50));
        assert_eq!(page.pages, 3);
    }
}
