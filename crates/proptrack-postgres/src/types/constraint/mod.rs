//! Typed names of every check constraint and unique index.
//!
//! PostgreSQL reports the name of a violated constraint; [`ConstraintViolation::new`]
//! turns it into a variant that handlers can map to a precise client error.

mod accounts;
mod file_uploads;
mod invoices;
mod land_registry_imports;
mod properties;
mod tenancy_agreements;
mod transactions;

use std::fmt;

use serde::{Deserialize, Serialize};

pub use self::accounts::AccountConstraints;
pub use self::file_uploads::FileUploadConstraints;
pub use self::invoices::InvoiceConstraints;
pub use self::land_registry_imports::LandRegistryImportConstraints;
pub use self::properties::PropertyConstraints;
pub use self::tenancy_agreements::TenancyAgreementConstraints;
pub use self::transactions::TransactionConstraints;

/// Any known constraint, grouped by table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum ConstraintViolation {
    Account(AccountConstraints),
    Property(PropertyConstraints),
    TenancyAgreement(TenancyAgreementConstraints),
    Invoice(InvoiceConstraints),
    Transaction(TransactionConstraints),
    FileUpload(FileUploadConstraints),
    LandRegistryImport(LandRegistryImportConstraints),
}

/// What kind of rule a constraint enforces.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ConstraintCategory {
    /// Format, length and range checks on a single column.
    Validation,
    /// Ordering between timestamps or dates.
    Chronological,
    /// Rules spanning several columns or rows.
    BusinessLogic,
    /// Unique indexes.
    Uniqueness,
}

impl ConstraintViolation {
    /// Parses a constraint name, returning `None` for unknown names.
    ///
    /// ```
    /// use proptrack_postgres::types::{ConstraintViolation, PropertyConstraints};
    ///
    /// assert_eq!(
    ///     ConstraintViolation::new("properties_postcode_format"),
    ///     Some(ConstraintViolation::Property(PropertyConstraints::PostcodeFormat)),
    /// );
    /// assert_eq!(ConstraintViolation::new("properties_pkey"), None);
    /// ```
    pub fn new(constraint: &str) -> Option<Self> {
        let table = Self::TABLES.into_iter().find(|table| {
            constraint
                .strip_prefix(table)
                .is_some_and(|rest| rest.starts_with('_'))
        })?;

        match table {
            "accounts" => AccountConstraints::new(constraint).map(Self::Account),
            "properties" => PropertyConstraints::new(constraint).map(Self::Property),
            "tenancy_agreements" => {
                TenancyAgreementConstraints::new(constraint).map(Self::TenancyAgreement)
            }
            "invoices" => InvoiceConstraints::new(constraint).map(Self::Invoice),
            "transactions" => TransactionConstraints::new(constraint).map(Self::Transaction),
            "file_uploads" => FileUploadConstraints::new(constraint).map(Self::FileUpload),
            "land_registry_imports" => {
                LandRegistryImportConstraints::new(constraint).map(Self::LandRegistryImport)
            }
            _ => None,
        }
    }

    const TABLES: [&'static str; 7] = [
        "accounts",
        "properties",
        "tenancy_agreements",
        "invoices",
        "transactions",
        "file_uploads",
        "land_registry_imports",
    ];

    /// Returns the table the constraint belongs to.
    pub fn table_name(&self) -> &'static str {
        match self {
            Self::Account(_) => "accounts",
            Self::Property(_) => "properties",
            Self::TenancyAgreement(_) => "tenancy_agreements",
            Self::Invoice(_) => "invoices",
            Self::Transaction(_) => "transactions",
            Self::FileUpload(_) => "file_uploads",
            Self::LandRegistryImport(_) => "land_registry_imports",
        }
    }

    pub fn constraint_category(&self) -> ConstraintCategory {
        match self {
            Self::Account(c) => c.categorize(),
            Self::Property(c) => c.categorize(),
            Self::TenancyAgreement(c) => c.categorize(),
            Self::Invoice(c) => c.categorize(),
            Self::Transaction(c) => c.categorize(),
            Self::FileUpload(c) => c.categorize(),
            Self::LandRegistryImport(c) => c.categorize(),
        }
    }
}

impl fmt::Display for ConstraintViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Account(c) => c.fmt(f),
            Self::Property(c) => c.fmt(f),
            Self::TenancyAgreement(c) => c.fmt(f),
            Self::Invoice(c) => c.fmt(f),
            Self::Transaction(c) => c.fmt(f),
            Self::FileUpload(c) => c.fmt(f),
            Self::LandRegistryImport(c) => c.fmt(f),
        }
    }
}

impl From<ConstraintViolation> for String {
    #[inline]
    fn from(value: ConstraintViolation) -> Self {
        value.to_string()
    }
}

impl TryFrom<String> for ConstraintViolation {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(&value).ok_or_else(|| format!("unknown constraint: {value}"))
    }
}

#[cfg(test)]
mod tests {
    use strum::IntoEnumIterator;

    use super::*;

    #[test]
    fn parses_known_constraints() {
        assert_eq!(
            ConstraintViolation::new("accounts_email_address_unique"),
            Some(ConstraintViolation::Account(
                AccountConstraints::EmailAddressUnique
            ))
        );
        assert_eq!(
            ConstraintViolation::new("tenancy_agreements_deposit_cap"),
            Some(ConstraintViolation::TenancyAgreement(
                TenancyAgreementConstraints::DepositCap
            ))
        );
        assert_eq!(
            ConstraintViolation::new("land_registry_imports_batch_size_range"),
            Some(ConstraintViolation::LandRegistryImport(
                LandRegistryImportConstraints::BatchSizeRange
            ))
        );
    }

    #[test]
    fn rejects_unknown_constraints() {
        assert_eq!(ConstraintViolation::new("properties_pkey"), None);
        assert_eq!(ConstraintViolation::new("propertiesx_paon_not_empty"), None);
        assert_eq!(ConstraintViolation::new(""), None);
    }

    #[test]
    fn every_name_round_trips_through_the_dispatcher() {
        for c in PropertyConstraints::iter() {
            let name = c.to_string();
            let violation = ConstraintViolation::new(&name).unwrap();
            assert_eq!(violation.to_string(), name);
            assert_eq!(violation.table_name(), "properties");
        }

        for c in InvoiceConstraints::iter() {
            let violation = ConstraintViolation::new(&c.to_string()).unwrap();
            assert_eq!(violation.table_name(), "invoices");
        }
    }

    #[test]
    fn categories() {
        let violation = ConstraintViolation::Invoice(InvoiceConstraints::DueAfterIssue);
        assert_eq!(
            violation.constraint_category(),
            ConstraintCategory::Chronological
        );

        let violation =
            ConstraintViolation::Property(PropertyConstraints::LandRegistryTransactionIdUnique);
        assert_eq!(violation.constraint_category(), ConstraintCategory::Uniqueness);
    }

    #[test]
    fn serializes_as_the_constraint_name() {
        let violation = ConstraintViolation::FileUpload(FileUploadConstraints::Sha256Format);
        let json = serde_json::to_string(&violation).unwrap();
        assert_eq!(json, "\"file_uploads_sha256_format\"");
    }
}
