#[cfg(feature = "schema")]
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Largest page a caller may request.
pub const MAX_LIMIT: i64 = 1000;

/// Default page size.
const DEFAULT_LIMIT: i64 = 50;

/// `LIMIT` / `OFFSET` window of a list query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
pub struct OffsetPagination {
    pub limit: i64,
    pub offset: i64,
}

impl OffsetPagination {
    /// Creates a window, clamping the limit to `1..=MAX_LIMIT` and the offset to `>= 0`.
    pub fn new(limit: i64, offset: i64) -> Self {
        Self {
            limit: limit.clamp(1, MAX_LIMIT),
            offset: offset.max(0),
        }
    }

    /// Creates the window of a 1-based page.
    pub fn from_page(page: i64, page_size: i64) -> Self {
        let page_size = page_size.clamp(1, MAX_LIMIT);
        Self::new(page_size, (page.max(1) - 1).saturating_mul(page_size))
    }

    /// Returns the 1-based page number.
    #[inline]
    pub fn page_number(&self) -> i64 {
        self.offset / self.limit + 1
    }
}

impl Default for OffsetPagination {
    fn default() -> Self {
        Self::new(DEFAULT_LIMIT, 0)
    }
}

/// One page of results together with the total number of matches.
#[derive(Debug, Clone, PartialEq)]
pub struct OffsetPage<T> {
    pub items: Vec<T>,
    pub total: i64,
}

impl<T> OffsetPage<T> {
    pub fn new(items: Vec<T>, total: i64) -> Self {
        Self { items, total }
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> OffsetPage<U> {
        OffsetPage {
            items: self.items.into_iter().map(f).collect(),
            total: self.total,
        }
    }

    /// Returns whether rows exist past this page.
    pub fn has_more(&self, pagination: &OffsetPagination) -> bool {
        pagination.offset + (self.items.len() as i64) < self.total
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bounds_are_clamped() {
        assert_eq!(OffsetPagination::new(0, 10).limit, 1);
        assert_eq!(OffsetPagination::new(5000, 10).limit, MAX_LIMIT);
        assert_eq!(OffsetPagination::new(10, -3).offset, 0);
        assert_eq!(OffsetPagination::default().limit, 50);
    }

    #[test]
    fn pages_are_one_based() {
        let pagination = OffsetPagination::from_page(3, 20);
        assert_eq!(pagination.offset, 40);
        assert_eq!(pagination.page_number(), 3);
        assert_eq!(OffsetPagination::from_page(0, 20).offset, 0);
    }

    #[test]
    fn has_more_compares_against_total() {
        let pagination = OffsetPagination::new(2, 0);
        assert!(OffsetPage::new(vec![1, 2], 3).has_more(&pagination));
        assert!(!OffsetPage::new(vec![1, 2], 2).has_more(&pagination));
    }
}
