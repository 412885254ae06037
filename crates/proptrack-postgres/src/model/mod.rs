//! Diesel models: one row type, one insert type and one changeset per table.

mod account;
mod file_upload;
mod invoice;
mod land_registry_import;
mod property;
mod tenancy_agreement;
mod transaction;

pub use account::{Account, NewAccount, UpdateAccount};
pub use file_upload::{FileUpload, NewFileUpload};
pub use invoice::{Invoice, NewInvoice, UpdateInvoice};
pub use land_registry_import::{LandRegistryImport, NewLandRegistryImport, UpdateLandRegistryImport};
pub use property::{NewProperty, Property, UpdateProperty};
pub use tenancy_agreement::{NewTenancyAgreement, TenancyAgreement, UpdateTenancyAgreement};
pub use transaction::{NewTransaction, Transaction, UpdateTransaction};
