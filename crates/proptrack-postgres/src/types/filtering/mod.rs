//! Optional filters accepted by list queries.

mod financials;
mod properties;

pub use financials::{InvoiceFilter, TransactionFilter};
pub use properties::{PropertyFilter, PropertyLocation};
