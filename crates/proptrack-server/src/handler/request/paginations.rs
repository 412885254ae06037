//! Offset pagination query parameters.

use proptrack_postgres::types::{MAX_LIMIT, OffsetPagination};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// `?offset=&limit=` of list endpoints.
///
/// Out of range values are clamped rather than rejected: the limit to
/// `1..=1000`, the offset to non-negative.
#[derive(Debug, Default, Clone, Copy, Serialize, Deserialize, JsonSchema)]
pub struct Pagination {
    /// The number of records to skip before starting to return results.
    pub offset: Option<u32>,

    /// The maximum number of records to return.
    pub limit: Option<u32>,
}

impl Pagination {
    /// Default pagination limit.
    const DEFAULT_LIMIT: u32 = 50;

    #[inline]
    pub fn new(offset: u32, limit: u32) -> Self {
        Self {
            offset: Some(offset),
            limit: Some(limit),
        }
    }

    pub fn offset(&self) -> u32 {
        self.offset.unwrap_or_default()
    }

    pub fn limit(&self) -> u32 {
        self.limit.unwrap_or(Self::DEFAULT_LIMIT)
    }
}

impl From<Pagination> for OffsetPagination {
    fn from(pagination: Pagination) -> Self {
        Self::new(
            i64::from(pagination.limit()).min(MAX_LIMIT),
            i64::from(pagination.offset()),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_apply() {
        let pagination = OffsetPagination::from(Pagination::default());
        assert_eq!(pagination.limit, 50);
        assert_eq!(pagination.offset, 0);
    }

    #[test]
    fn limit_is_clamped() {
        let pagination = OffsetPagination::from(Pagination::new(20, 100_000));
        assert_eq!(pagination.limit, MAX_LIMIT);
        assert_eq!(pagination.offset, 20);

        let pagination = OffsetPagination::from(Pagination::new(0, 0));
        assert_eq!(pagination.limit, 1);
    }
}
