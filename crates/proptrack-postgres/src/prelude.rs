//! Commonly used types, for glob import.
//!
//! ```rust,ignore
//! use proptrack_postgres::prelude::*;
//!
//! let client = PgConfig::new("postgresql://localhost/proptrack").build()?;
//! let mut conn = client.get_connection().await?;
//! let property = conn.find_property_by_id(property_id).await?;
//! ```

pub use crate::client::{PgClient, PgClientMigrationExt, PgConfig, PgConn, PgPoolStatus};
pub use crate::query::{
    AccountRepository, FileUploadRepository, InvoiceRepository, LandRegistryImportRepository,
    OffsetPagination, PropertyRepository, TenancyAgreementRepository, TransactionRepository,
};
pub use crate::types::{ConstraintCategory, ConstraintViolation};
pub use crate::{PgConnection, PgError, PgResult};
