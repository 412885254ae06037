//! Offset pagination for list queries.

mod offset;

pub use offset::{MAX_LIMIT, OffsetPage, OffsetPagination};
