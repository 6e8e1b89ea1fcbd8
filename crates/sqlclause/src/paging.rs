//! Fetch-narrowing (paging) state.
//!
//! The state is dialect-neutral row arithmetic; how it becomes SQL (a `limit`
//! suffix, a `top` hint, a row-number wrap) is decided by the dialect.

use crate::error::{ClauseError, ClauseResult};

/// Accumulated fetch range. Indexes are zero-origin row offsets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PagingState {
    fetch_start_index: usize,
    fetch_size: usize,
    fetch_page_number: usize,
    suppressed: bool,
}

impl Default for PagingState {
    fn default() -> Self {
        Self {
            fetch_start_index: 0,
            fetch_size: 0,
            fetch_page_number: 1,
            suppressed: false,
        }
    }
}

impl PagingState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Narrow to the first `size` rows.
    pub fn fetch_first(&mut self, size: usize) -> ClauseResult<()> {
        if size == 0 {
            return Err(ClauseError::precondition(
                "fetchFirst() needs a positive fetch size",
            ));
        }
        self.fetch_start_index = 0;
        self.fetch_size = size;
        self.fetch_page_number = 1;
        self.suppressed = false;
        Ok(())
    }

    /// Narrow to `size` rows starting at `start`.
    pub fn fetch_scope(&mut self, start: usize, size: usize) -> ClauseResult<()> {
        if size == 0 {
            return Err(ClauseError::precondition(
                "fetchScope() needs a positive fetch size",
            ));
        }
        self.fetch_start_index = start;
        self.fetch_size = size;
        self.fetch_page_number = 1;
        self.suppressed = false;
        Ok(())
    }

    /// Move to page `page` of the current scope. A page number of zero is
    /// coerced to the first page.
    pub fn fetch_page(&mut self, page: usize) -> ClauseResult<()> {
        if self.fetch_size == 0 {
            return Err(ClauseError::precondition(
                "fetchPage() needs fetchFirst() or fetchScope() called beforehand",
            ));
        }
        self.fetch_page_number = if page == 0 { 1 } else { page };
        self.suppressed = false;
        Ok(())
    }

    /// Keep the narrowing values but render nothing until re-enabled.
    pub fn ignore_fetch_scope(&mut self) {
        self.suppressed = true;
    }

    pub fn make_fetch_scope_effective(&mut self) {
        self.suppressed = false;
    }

    pub fn is_fetch_scope_effective(&self) -> bool {
        self.fetch_size > 0 && !self.suppressed
    }

    pub fn fetch_start_index(&self) -> usize {
        self.fetch_start_index
    }

    pub fn fetch_size(&self) -> usize {
        self.fetch_size
    }

    pub fn fetch_page_number(&self) -> usize {
        self.fetch_page_number
    }

    /// Rows a client-side cursor must skip when the dialect cannot express
    /// the start offset in SQL. Zero while narrowing is ineffective.
    pub fn fetch_narrowing_skip_start_index(&self) -> usize {
        if self.is_fetch_scope_effective() {
            self.page_start_index()
        } else {
            0
        }
    }

    /// Rows a client-side cursor may read after skipping. Unbounded while
    /// narrowing is ineffective.
    pub fn fetch_narrowing_loop_count(&self) -> usize {
        if self.is_fetch_scope_effective() {
            self.fetch_size
        } else {
            usize::MAX
        }
    }

    /// First row offset of the current page.
    pub fn page_start_index(&self) -> usize {
        self.fetch_start_index + self.fetch_size * (self.fetch_page_number - 1)
    }

    /// Row offset just past the current page.
    pub fn page_end_index(&self) -> usize {
        self.fetch_start_index + self.fetch_size * self.fetch_page_number
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fetch_first_narrows_to_first_page() {
        let mut paging = PagingState::new();
        paging.fetch_first(20).unwrap();
        assert!(paging.is_fetch_scope_effective());
        assert_eq!(paging.page_start_index(), 0);
        assert_eq!(paging.page_end_index(), 20);
    }

    #[test]
    fn test_fetch_page_row_arithmetic() {
        let mut paging = PagingState::new();
        paging.fetch_scope(5, 10).unwrap();
        paging.fetch_page(3).unwrap();
        assert_eq!(paging.page_start_index(), 5 + 10 * 2);
        assert_eq!(paging.page_end_index(), 5 + 10 * 3);
    }

    #[test]
    fn test_fetch_page_one_equals_fetch_first() {
        let mut by_page = PagingState::new();
        by_page.fetch_first(20).unwrap();
        by_page.fetch_page(1).unwrap();
        let mut by_first = PagingState::new();
        by_first.fetch_first(20).unwrap();
        assert_eq!(by_page, by_first);
    }

    #[test]
    fn test_zero_page_number_is_coerced_to_one() {
        let mut paging = PagingState::new();
        paging.fetch_first(10).unwrap();
        paging.fetch_page(0).unwrap();
        assert_eq!(paging.fetch_page_number(), 1);
    }

    #[test]
    fn test_fetch_narrowing_accessors() {
        let mut paging = PagingState::new();
        assert_eq!(paging.fetch_narrowing_skip_start_index(), 0);
        assert_eq!(paging.fetch_narrowing_loop_count(), usize::MAX);
        paging.fetch_first(10).unwrap();
        paging.fetch_page(2).unwrap();
        assert_eq!(paging.fetch_narrowing_skip_start_index(), 10);
        assert_eq!(paging.fetch_narrowing_loop_count(), 10);
    }

    #[test]
    fn test_ignore_and_restore_fetch_scope() {
        let mut paging = PagingState::new();
        paging.fetch_first(20).unwrap();
        paging.ignore_fetch_scope();
        assert!(!paging.is_fetch_scope_effective());
        paging.make_fetch_scope_effective();
        assert!(paging.is_fetch_scope_effective());
        assert_eq!(paging.fetch_size(), 20);
    }

    #[test]
    fn test_zero_fetch_size_is_rejected() {
        let mut paging = PagingState::new();
        assert!(paging.fetch_first(0).unwrap_err().is_precondition());
        assert!(paging.fetch_scope(0, 0).unwrap_err().is_precondition());
        assert!(paging.fetch_page(2).unwrap_err().is_precondition());
    }
}
