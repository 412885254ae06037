//! Constraints of the `transactions` table.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

use super::ConstraintCategory;

/// Named constraints and unique indexes of `transactions`.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
#[derive(Serialize, Deserialize, Display, EnumIter, EnumString)]
#[serde(into = "String", try_from = "String")]
pub enum TransactionConstraints {
    #[strum(serialize = "transactions_amount_positive")]
    AmountPositive,
    #[strum(serialize = "transactions_description_length_max")]
    DescriptionLengthMax,
    #[strum(serialize = "transactions_reference_length_max")]
    ReferenceLengthMax,

    #[strum(serialize = "transactions_invoice_payment_unique")]
    InvoicePaymentUnique,

    #[strum(serialize = "transactions_updated_after_created")]
    UpdatedAfterCreated,
    #[strum(serialize = "transactions_deleted_after_created")]
    DeletedAfterCreated,
}

impl TransactionConstraints {
    /// Parses a constraint name reported by PostgreSQL.
    pub fn new(constraint: &str) -> Option<Self> {
        constraint.parse().ok()
    }

    pub fn categorize(&self) -> ConstraintCategory {
        match self {
            Self::AmountPositive
            | Self::DescriptionLengthMax
            | Self::ReferenceLengthMax => ConstraintCategory::Validation,
            Self::InvoicePaymentUnique => ConstraintCategory::Uniqueness,
            Self::UpdatedAfterCreated
            | Self::DeletedAfterCreated => ConstraintCategory::Chronological,
        }
    }
}

impl From<TransactionConstraints> for String {
    #[inline]
    fn from(value: TransactionConstraints) -> Self {
        value.to_string()
    }
}

impl TryFrom<String> for TransactionConstraints {
    type Error = strum::ParseError;

    #[inline]
    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}
