//! Repository traits implemented for [`PgConnection`].
//!
//! Every trait method returns `impl Future + Send` so repositories can be
//! used from spawned tasks. Soft-deleted rows are never returned.
//!
//! [`PgConnection`]: crate::PgConnection

mod account;
mod file_upload;
mod invoice;
mod land_registry_import;
mod property;
mod tenancy_agreement;
mod transaction;

use diesel::sql_types::{Nullable, Numeric, Text};

pub use self::account::AccountRepository;
pub use self::file_upload::FileUploadRepository;
pub use self::invoice::InvoiceRepository;
pub use self::land_registry_import::LandRegistryImportRepository;
pub use self::property::{PriceStats, PropertyRepository, PropertyTypePriceStats};
pub use self::tenancy_agreement::TenancyAgreementRepository;
pub use self::transaction::TransactionRepository;
pub use crate::types::{OffsetPage, OffsetPagination};

diesel::define_sql_function! {
    /// SQL `upper(text)`, used for case-insensitive matching.
    fn upper(value: Nullable<Text>) -> Nullable<Text>;
}

// Diesel only orders `SqlOrd` types, which `Numeric` is not.
diesel::define_sql_function! {
    #[aggregate]
    #[sql_name = "min"]
    fn numeric_min(value: Nullable<Numeric>) -> Nullable<Numeric>;
}

diesel::define_sql_function! {
    #[aggregate]
    #[sql_name = "max"]
    fn numeric_max(value: Nullable<Numeric>) -> Nullable<Numeric>;
}

/// Current time as a diesel-compatible timestamp.
fn now() -> jiff_diesel::Timestamp {
    jiff::Timestamp::now().into()
}
