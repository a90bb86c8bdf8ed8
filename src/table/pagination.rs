//! Pagination window arithmetic.
//!
//! Pages are 1-based. A page size of zero is treated as one so every
//! calculation stays total.

use std::ops::Range;

/// Half-open row index range `[start, end)` for one page
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageWindow {
    pub start: usize,
    pub end: usize,
}

impl PageWindow {
    /// Window for `page` (1-based); pages below 1 are treated as 1
    pub fn new(page: usize, page_size: usize) -> Self {
        let page_size = page_size.max(1);
        let start = page.max(1).saturating_sub(1).saturating_mul(page_size);
        Self {
            start,
            end: start.saturating_add(page_size),
        }
    }

    /// The window cut down to a collection of `len` items
    pub fn clipped(&self, len: usize) -> Range<usize> {
        let start = self.start.min(len);
        let end = self.end.min(len);
        start..end
    }

    /// Slice `items` without padding; a short final page stays short
    pub fn slice<'a, T>(&self, items: &'a [T]) -> &'a [T] {
        &items[self.clipped(items.len())]
    }
}

/// `max(1, ceil(total / page_size))`
pub fn total_pages(total_records: usize, page_size: usize) -> usize {
    let page_size = page_size.max(1);
    total_records.div_ceil(page_size).max(1)
}

/// Clamp a requested page into `[1, total_pages]`
pub fn clamp_page(page: i64, total_pages: usize) -> usize {
    if page < 1 {
        return 1;
    }
    usize::try_from(page)
        .unwrap_or(usize::MAX)
        .min(total_pages.max(1))
}
