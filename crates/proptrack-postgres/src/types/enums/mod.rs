//! Enumerations backed by PostgreSQL enum types.

mod epc_rating;
mod file_category;
mod import_status;
mod invoice_status;
mod listing_status;
mod property_type;
mod tenancy_status;
mod tenure_type;
mod transaction_type;

pub use epc_rating::EpcRating;
pub use file_category::FileCategory;
pub use import_status::ImportStatus;
pub use invoice_status::InvoiceStatus;
pub use listing_status::ListingStatus;
pub use property_type::PropertyType;
pub use tenancy_status::TenancyStatus;
pub use tenure_type::TenureType;
pub use transaction_type::{TransactionCategory, TransactionType};
