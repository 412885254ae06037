//! Response types for HTTP handlers.

use proptrack_postgres::types::{OffsetPage, OffsetPagination};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

mod accounts;
mod authentications;
mod errors;
mod files;
mod imports;
mod invoices;
mod monitors;
mod properties;
mod tenancies;
mod transactions;

pub use accounts::*;
pub use authentications::*;
pub use errors::*;
pub use files::*;
pub use imports::*;
pub use invoices::*;
pub use monitors::*;
pub use properties::*;
pub use tenancies::*;
pub use transactions::*;

/// Generic paginated response wrapper.
///
/// `total` counts every match of the query; `hasMore` tells whether rows
/// exist past this page.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[schemars(rename = "{T}sPage")]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    /// Items in this page.
    pub items: Vec<T>,
    /// Total count of items matching the query.
    pub total: i64,
    /// Number of items skipped.
    pub offset: i64,
    /// Maximum number of items in a page.
    pub limit: i64,
    /// Whether more items exist past this page.
    pub has_more: bool,
}

impl<T> Page<T> {
    /// Creates a page from a repository page, mapping items using `f`.
    pub fn from_offset_page<M, F>(page: OffsetPage<M>, pagination: OffsetPagination, f: F) -> Self
    where
        F: FnMut(M) -> T,
    {
        let has_more = page.has_more(&pagination);
        Self {
            items: page.items.into_iter().map(f).collect(),
            total: page.total,
            offset: pagination.offset,
            limit: pagination.limit,
            has_more,
        }
    }

    /// Maps items from one type to another.
    pub fn map<U, F>(self, f: F) -> Page<U>
    where
        F: FnMut(T) -> U,
    {
        Page {
            items: self.items.into_iter().map(f).collect(),
            total: self.total,
            offset: self.offset,
            limit: self.limit,
            has_more: self.has_more,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_reports_more_rows() {
        let pagination = OffsetPagination::new(2, 0);
        let page = Page::from_offset_page(OffsetPage::new(vec![1, 2], 5), pagination, |n| n * 10);

        assert_eq!(page.items, vec![10, 20]);
        assert_eq!(page.total, 5);
        assert!(page.has_more);
        assert!(!page.map(|n| n + 1).items.is_empty());
    }
}
