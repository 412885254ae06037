//! Constraints of the `invoices` table.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

use super::ConstraintCategory;

/// Named constraints and unique indexes of `invoices`.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
#[derive(Serialize, Deserialize, Display, EnumIter, EnumString)]
#[serde(into = "String", try_from = "String")]
pub enum InvoiceConstraints {
    #[strum(serialize = "invoices_invoice_number_format")]
    InvoiceNumberFormat,
    #[strum(serialize = "invoices_recipient_name_length")]
    RecipientNameLength,
    #[strum(serialize = "invoices_net_amount_non_negative")]
    NetAmountNonNegative,
    #[strum(serialize = "invoices_tax_amount_non_negative")]
    TaxAmountNonNegative,
    #[strum(serialize = "invoices_currency_format")]
    CurrencyFormat,

    #[strum(serialize = "invoices_total_amount_consistent")]
    TotalAmountConsistent,
    #[strum(serialize = "invoices_paid_status_consistency")]
    PaidStatusConsistency,

    #[strum(serialize = "invoices_account_invoice_number_unique")]
    AccountInvoiceNumberUnique,

    #[strum(serialize = "invoices_due_after_issue")]
    DueAfterIssue,
    #[strum(serialize = "invoices_updated_after_created")]
    UpdatedAfterCreated,
    #[strum(serialize = "invoices_deleted_after_created")]
    DeletedAfterCreated,
}

impl InvoiceConstraints {
    /// Parses a constraint name reported by PostgreSQL.
    pub fn new(constraint: &str) -> Option<Self> {
        constraint.parse().ok()
    }

    pub fn categorize(&self) -> ConstraintCategory {
        match self {
            Self::InvoiceNumberFormat
            | Self::RecipientNameLength
            | Self::NetAmountNonNegative
            | Self::TaxAmountNonNegative
            | Self::CurrencyFormat => ConstraintCategory::Validation,
            Self::TotalAmountConsistent
            | Self::PaidStatusConsistency => ConstraintCategory::BusinessLogic,
            Self::AccountInvoiceNumberUnique => ConstraintCategory::Uniqueness,
            Self::DueAfterIssue
            | Self::UpdatedAfterCreated
            | Self::DeletedAfterCreated => ConstraintCategory::Chronological,
        }
    }
}

impl From<InvoiceConstraints> for String {
    #[inline]
    fn from(value: InvoiceConstraints) -> Self {
        value.to_string()
    }
}

impl TryFrom<String> for InvoiceConstraints {
    type Error = strum::ParseError;

    #[inline]
    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}
