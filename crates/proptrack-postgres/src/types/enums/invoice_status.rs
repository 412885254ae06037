//! Invoice status enumeration.

use diesel_derive_enum::DbEnum;
#[cfg(feature = "schema")]
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

/// Payment status of an invoice.
///
/// This enumeration corresponds to the `INVOICE_STATUS` PostgreSQL enum.
#[derive(Debug, Default, Clone, Copy, Eq, PartialEq, Hash)]
#[derive(Serialize, Deserialize, DbEnum, Display, EnumIter, EnumString)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
#[ExistingTypePath = "crate::schema::sql_types::InvoiceStatus"]
pub enum InvoiceStatus {
    #[db_rename = "draft"]
    #[serde(rename = "draft")]
    #[strum(serialize = "draft")]
    #[default]
    Draft,

    #[db_rename = "issued"]
    #[serde(rename = "issued")]
    #[strum(serialize = "issued")]
    Issued,

    #[db_rename = "paid"]
    #[serde(rename = "paid")]
    #[strum(serialize = "paid")]
    Paid,

    #[db_rename = "overdue"]
    #[serde(rename = "overdue")]
    #[strum(serialize = "overdue")]
    Overdue,

    #[db_rename = "cancelled"]
    #[serde(rename = "cancelled")]
    #[strum(serialize = "cancelled")]
    Cancelled,
}

impl InvoiceStatus {
    /// Statuses in which an invoice can still be changed or paid.
    pub const EDITABLE: [Self; 3] = [Self::Draft, Self::Issued, Self::Overdue];

    /// Returns whether money is still owed on the invoice.
    #[inline]
    pub fn is_outstanding(self) -> bool {
        matches!(self, Self::Issued | Self::Overdue)
    }

    /// Returns whether the invoice can still be edited.
    #[inline]
    pub fn is_editable(self) -> bool {
        Self::EDITABLE.contains(&self)
    }
}

#[cfg(test)]
mod tests {
    use strum::IntoEnumIterator;

    use super::*;

    #[test]
    fn only_unsettled_invoices_are_editable() {
        let editable: Vec<_> = InvoiceStatus::iter().filter(|s| s.is_editable()).collect();
        assert_eq!(editable, InvoiceStatus::EDITABLE);
        assert!(!InvoiceStatus::Paid.is_editable());
        assert!(!InvoiceStatus::Cancelled.is_editable());
    }
}
