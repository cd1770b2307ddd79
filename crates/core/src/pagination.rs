//! Page-index arithmetic.
//!
//! Pages are 1-based. The backend reports a total count; the number of pages
//! is derived from it and every navigation request is checked against that
//! bound before it is honoured.

use serde::Serialize;

/// Catalog cards per page.
pub const CATALOG_PAGE_SIZE: u32 = 20;
/// Cart lines per page.
pub const CART_PAGE_SIZE: u32 = 5;
/// Product detail gallery thumbnails per page.
pub const GALLERY_PAGE_SIZE: u32 = 4;
/// Rows per admin grid page.
pub const ADMIN_PAGE_SIZE: u32 = 10;

/// Position within a paginated collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Pagination {
    page: u32,
    page_size: u32,
    total: u64,
}

impl Pagination {
    /// Build a pagination window.
    ///
    /// A zero page size is treated as one. A requested page outside
    /// `1..=total_pages` falls back to the first page.
    #[must_use]
    pub fn new(requested_page: u32, page_size: u32, total: u64) -> Self {
        let mut pagination = Self {
            page: 1,
            page_size: page_size.max(1),
            total,
        };
        if pagination.accepts(requested_page) {
            pagination.page = requested_page;
        }
        pagination
    }

    #[must_use]
    pub const fn page(&self) -> u32 {
        self.page
    }

    #[must_use]
    pub const fn page_size(&self) -> u32 {
        self.page_size
    }

    #[must_use]
    pub const fn total(&self) -> u64 {
        self.total
    }

    /// `ceil(total / page_size)`; zero for an empty collection.
    #[must_use]
    pub fn total_pages(&self) -> u32 {
        let pages = self.total.div_ceil(u64::from(self.page_size));
        u32::try_from(pages).unwrap_or(u32::MAX)
    }

    /// Whether navigating to `page` is allowed.
    #[must_use]
    pub fn accepts(&self, page: u32) -> bool {
        page >= 1 && page <= self.total_pages()
    }

    /// Move to `page` if it is in bounds; returns whether the page changed.
    pub fn go_to(&mut self, page: u32) -> bool {
        if self.accepts(page) && page != self.page {
            self.page = page;
            true
        } else {
            false
        }
    }

    /// Zero-based index of the first item on the current page.
    #[must_use]
    pub fn offset(&self) -> usize {
        let offset = u64::from(self.page - 1) * u64::from(self.page_size);
        usize::try_from(offset).unwrap_or(usize::MAX)
    }

    #[must_use]
    pub const fn has_prev(&self) -> bool {
        self.page > 1
    }

    #[must_use]
    pub fn has_next(&self) -> bool {
        self.page < self.total_pages()
    }

    #[must_use]
    pub const fn prev_page(&self) -> u32 {
        self.page.saturating_sub(1)
    }

    #[must_use]
    pub const fn next_page(&self) -> u32 {
        self.page.saturating_add(1)
    }

    /// Last page number; one when the collection is empty.
    #[must_use]
    pub fn last_page(&self) -> u32 {
        self.total_pages().max(1)
    }

    /// Items of `items` that fall on the current page.
    #[must_use]
    pub fn slice<'a, T>(&self, items: &'a [T]) -> &'a [T] {
        let start = self.offset().min(items.len());
        let end = start
            .saturating_add(self.page_size as usize)
            .min(items.len());
        items.get(start..end).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_total_pages_rounds_up() {
        assert_eq!(Pagination::new(1, 20, 0).total_pages(), 0);
        assert_eq!(Pagination::new(1, 20, 1).total_pages(), 1);
        assert_eq!(Pagination::new(1, 20, 20).total_pages(), 1);
        assert_eq!(Pagination::new(1, 20, 21).total_pages(), 2);
        assert_eq!(Pagination::new(1, 5, 11).total_pages(), 3);
    }

    #[test]
    fn test_out_of_range_request_falls_back_to_first_page() {
        assert_eq!(Pagination::new(0, 10, 35).page(), 1);
        assert_eq!(Pagination::new(5, 10, 35).page(), 1);
        assert_eq!(Pagination::new(4, 10, 35).page(), 4);
    }

    #[test]
    fn test_go_to_only_within_bounds() {
        let mut pagination = Pagination::new(1, 10, 35);
        assert!(!pagination.go_to(0));
        assert!(!pagination.go_to(5));
        assert!(pagination.go_to(4));
        assert_eq!(pagination.page(), 4);
        assert!(!pagination.go_to(4));
    }

    #[test]
    fn test_empty_collection_accepts_nothing() {
        let pagination = Pagination::new(1, 10, 0);
        assert!(!pagination.accepts(1));
        assert!(!pagination.has_next());
        assert!(!pagination.has_prev());
        assert_eq!(pagination.last_page(), 1);
    }

    #[test]
    fn test_prev_next_flags() {
        let middle = Pagination::new(2, 5, 15);
        assert!(middle.has_prev());
        assert!(middle.has_next());
        assert_eq!(middle.prev_page(), 1);
        assert_eq!(middle.next_page(), 3);

        let last = Pagination::new(3, 5, 15);
        assert!(!last.has_next());
    }

    #[test]
    fn test_slice_returns_current_page() {
        let items: Vec<u32> = (1..=12).collect();
        assert_eq!(Pagination::new(1, 5, 12).slice(&items), &[1, 2, 3, 4, 5]);
        assert_eq!(Pagination::new(3, 5, 12).slice(&items), &[11, 12]);
        assert!(Pagination::new(1, 5, 0).slice::<u32>(&[]).is_empty());
    }
}
