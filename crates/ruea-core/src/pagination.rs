//! Offset/limit pagination for the data table

use serde::{Deserialize, Serialize};

use crate::filters::MAX_PAGE_SIZE;

/// Page sizes offered by the table
pub const PAGE_SIZE_OPTIONS: [usize; 4] = [25, 50, 100, 200];

/// Initial page size
pub const DEFAULT_PAGE_SIZE: usize = 50;

/// Position of the table window within a result set
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pager {
    pub limit: usize,
    pub offset: usize,
}

impl Default for Pager {
    fn default() -> Self {
        Self::new(DEFAULT_PAGE_SIZE)
    }
}

impl Pager {
    /// Create a pager at the first page; the limit is clamped to `1..=MAX_PAGE_SIZE`
    pub fn new(limit: usize) -> Self {
        Self {
            limit: limit.clamp(1, MAX_PAGE_SIZE),
            offset: 0,
        }
    }

    /// One-based page number
    pub fn page_number(&self) -> usize {
        self.offset / self.limit.max(1) + 1
    }

    /// Number of pages needed for `total` rows (at least one)
    pub fn page_count(&self, total: usize) -> usize {
        total.div_ceil(self.limit.max(1)).max(1)
    }

    pub fn can_prev(&self) -> bool {
        self.offset > 0
    }

    pub fn can_next(&self, total: usize) -> bool {
        self.offset + self.limit < total
    }

    /// Move to the previous page; returns whether the offset changed
    pub fn prev(&mut self) -> bool {
        if !self.can_prev() {
            return false;
        }
        self.offset = self.offset.saturating_sub(self.limit);
        true
    }

    /// Move to the next page; returns whether the offset changed
    pub fn next(&mut self, total: usize) -> bool {
        if !self.can_next(total) {
            return false;
        }
        self.offset += self.limit;
        true
    }

    /// Change the page size and go back to the first page
    pub fn set_limit(&mut self, limit: usize) {
        *self = Self::new(limit);
    }

    /// Go back to the first page
    pub fn reset(&mut self) {
        self.offset = 0;
    }

    /// Total to paginate against for a page of `shown` rows whose response
    /// reported `reported` rows.
    ///
    /// A `{count, items}` response carries the page length rather than the
    /// number of matches, so a full page of that shape may have more after it.
    pub fn effective_total(&self, reported: usize, shown: usize) -> usize {
        let seen = self.offset + shown;
        if reported == shown && shown == self.limit {
            seen + 1
        } else {
            reported.max(seen)
        }
    }

    /// Range of one-based row numbers displayed for `shown` rows
    pub fn visible_range(&self, shown: usize) -> Option<(usize, usize)> {
        (shown > 0).then(|| (self.offset + 1, self.offset + shown))
    }
}
