//! Presentation engine: column ordering and pagination.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{MatrixError, Result};
use crate::i18n::Language;

/// Column order for the matrix header.
///
/// The base language is always first. A preferred language other than the
/// base comes second. Every other registered language follows in registry
/// order, so each language appears exactly once.
pub fn ordered_languages(preferred: Option<Language>) -> Vec<Language> {
    let base = Language::base();
    let pinned = preferred.filter(|p| *p != base);

    std::iter::once(base)
        .chain(pinned)
        .chain(
            Language::all()
                .into_iter()
                .filter(|lang| *lang != base && Some(*lang) != pinned),
        )
        .collect()
}

/// Number of rows shown per page, restricted to the selectable options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "usize", into = "usize")]
pub struct PageSize(usize);

impl PageSize {
    pub const OPTIONS: [usize; 4] = [20, 50, 100, 200];
    pub const DEFAULT: PageSize = PageSize(50);

    pub fn new(size: usize) -> Result<Self> {
        if Self::OPTIONS.contains(&size) {
            Ok(Self(size))
        } else {
            Err(MatrixError::InvalidPageSize(size))
        }
    }

    pub fn get(&self) -> usize {
        self.0
    }
}

impl Default for PageSize {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl TryFrom<usize> for PageSize {
    type Error = MatrixError;

    fn try_from(size: usize) -> Result<Self> {
        Self::new(size)
    }
}

impl From<PageSize> for usize {
    fn from(size: PageSize) -> usize {
        size.0
    }
}

/// The span of items a page covers, 1-based and inclusive.
///
/// `start` is 0 when there is nothing to show.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ItemRange {
    pub start: usize,
    pub end: usize,
    pub total: usize,
}

impl fmt::Display for ItemRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Showing {} - {} of {} items",
            self.start, self.end, self.total
        )
    }
}

/// One page of entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page<'a, T> {
    pub items: &'a [T],
    pub page: usize,
    pub total_pages: usize,
    pub range: ItemRange,
}

/// Number of pages needed for `count` entries; 0 when there are none.
pub fn total_pages(count: usize, page_size: usize) -> usize {
    if page_size == 0 {
        return 0;
    }
    count.div_ceil(page_size)
}

/// Slice out page `page_number` (1-based) of `entries`.
///
/// Out-of-range pages are an error rather than being clamped, so the caller
/// can apply its own reset policy. Page 1 of an empty list is valid and empty.
pub fn paginate<T>(entries: &[T], page_size: usize, page_number: usize) -> Result<Page<'_, T>> {
    if page_size == 0 {
        return Err(MatrixError::InvalidPageSize(page_size));
    }

    let total = entries.len();
    let pages = total_pages(total, page_size);
    if page_number == 0 || page_number > pages.max(1) {
        return Err(MatrixError::PageOutOfRange {
            page: page_number,
            total_pages: pages,
        });
    }

    let start = (page_number - 1) * page_size;
    let end = (start + page_size).min(total);
    let items = &entries[start.min(total)..end];

    Ok(Page {
        items,
        page: page_number,
        total_pages: pages,
        range: ItemRange {
            start: if items.is_empty() { 0 } else { start + 1 },
            end,
            total,
        },
    })
}
