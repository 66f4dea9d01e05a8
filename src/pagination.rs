//! Fixed-size pages over a ranked list.

use num::Integer;
use serde::{Deserialize, Serialize};

/// Pages shown around the current one
pub const NEIGHBOR_WINDOW: usize = 3;

/// Page metadata, independent of the items
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageInfo {
    /// 1-based requested page
    pub page: usize,
    pub page_size: usize,
    pub total_items: usize,
    pub total_pages: usize,
    /// Page numbers to link to, ascending
    pub neighbors: Vec<usize>,
}

impl PageInfo {
    pub fn new(total_items: usize, page: usize, page_size: usize) -> Self {
        let page_size = page_size.max(1);
        let total_pages = Integer::div_ceil(&total_items, &page_size);
        PageInfo {
            page,
            page_size,
            total_items,
            total_pages,
            neighbors: neighbor_pages(page, total_pages),
        }
    }

    /// Requested page is outside `[1, total_pages]`
    #[inline]
    pub fn is_out_of_range(&self) -> bool {
        self.page == 0 || self.page > self.total_pages
    }

    #[inline]
    pub fn has_prev(&self) -> bool {
        !self.is_out_of_range() && self.page > 1
    }

    #[inline]
    pub fn has_next(&self) -> bool {
        !self.is_out_of_range() && self.page < self.total_pages
    }

    /// Index range of this page in the full list; empty when out of range
    pub fn range(&self) -> std::ops::Range<usize> {
        if self.is_out_of_range() {
            return 0..0;
        }
        let start = (self.page - 1) * self.page_size;
        let end = (start + self.page_size).min(self.total_items);
        start..end
    }
}

/// One page of a ranked list
#[derive(Debug, Clone, PartialEq)]
pub struct Page<'a, T> {
    pub items: &'a [T],
    pub info: PageInfo,
}

impl<T> Page<'_, T> {
    #[inline]
    pub fn is_out_of_range(&self) -> bool {
        self.info.is_out_of_range()
    }
}

/// Slice `ranked` into page `page` (1-based) of `page_size` items.
///
/// A page outside `[1, total_pages]` gives an empty slice; the caller decides
/// whether to redirect.
pub fn paginate<T>(ranked: &[T], page: usize, page_size: usize) -> Page<'_, T> {
    let info = PageInfo::new(ranked.len(), page, page_size);
    Page {
        items: &ranked[info.range()],
        info,
    }
}

/// `{p-1, p, p+1}`; `{1, 2, 3}` on the first page; the last three on the
/// final page. Clamped to `[1, total_pages]`. Out-of-range requests get the
/// window of the nearest valid page.
pub fn neighbor_pages(page: usize, total_pages: usize) -> Vec<usize> {
    if total_pages == 0 {
        return Vec::new();
    }
    let page = page.clamp(1, total_pages);
    let first = if page == 1 {
        1
    } else if page == total_pages {
        total_pages.saturating_sub(NEIGHBOR_WINDOW - 1).max(1)
    } else {
        page - 1
    };
    let last = (first + NEIGHBOR_WINDOW - 1).min(total_pages);
    (first..=last).collect()
}
