//! Database enumerations, constraint names, filters and pagination.

mod constraint;
mod enums;
mod filtering;
mod pagination;

pub use self::constraint::{
    AccountConstraints, ConstraintCategory, ConstraintViolation, FileUploadConstraints,
    InvoiceConstraints, LandRegistryImportConstraints, PropertyConstraints,
    TenancyAgreementConstraints, TransactionConstraints,
};
pub use self::enums::{
    EpcRating, FileCategory, ImportStatus, InvoiceStatus, ListingStatus, PropertyType,
    TenancyStatus, TenureType, TransactionCategory, TransactionType,
};
pub use self::filtering::{InvoiceFilter, PropertyFilter, PropertyLocation, TransactionFilter};
pub use self::pagination::{MAX_LIMIT, OffsetPage, OffsetPagination};
