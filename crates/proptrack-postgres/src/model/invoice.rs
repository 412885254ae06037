//! Invoice models.

use bigdecimal::BigDecimal;
use diesel::prelude::*;
use jiff_diesel::{Date, Timestamp};
use uuid::Uuid;

use crate::schema::invoices;
use crate::types::InvoiceStatus;

/// Invoice raised by an account, usually to a tenant.
#[derive(Debug, Clone, PartialEq, Queryable, Selectable)]
#[diesel(table_name = invoices)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Invoice {
    pub id: Uuid,
    pub account_id: Uuid,
    pub property_id: Option<Uuid>,
    pub tenancy_id: Option<Uuid>,
    /// Unique per account, e.g. `INV-000042`.
    pub invoice_number: String,
    pub recipient_name: String,
    pub recipient_email: Option<String>,
    pub description: Option<String>,
    pub net_amount: BigDecimal,
    /// VAT or other tax.
    pub tax_amount: BigDecimal,
    /// Always `net_amount + tax_amount`.
    pub total_amount: BigDecimal,
    /// ISO 4217 code.
    pub currency: String,
    pub status: InvoiceStatus,
    pub issue_date: Date,
    pub due_date: Date,
    /// Set exactly when the status is `paid`.
    pub paid_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
    pub deleted_at: Option<Timestamp>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = invoices)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct NewInvoice {
    pub account_id: Uuid,
    pub property_id: Option<Uuid>,
    pub tenancy_id: Option<Uuid>,
    pub invoice_number: String,
    pub recipient_name: String,
    pub recipient_email: Option<String>,
    pub description: Option<String>,
    pub net_amount: BigDecimal,
    pub tax_amount: BigDecimal,
    pub total_amount: BigDecimal,
    pub currency: String,
    pub status: InvoiceStatus,
    pub issue_date: Date,
    pub due_date: Date,
}

#[derive(Debug, Default, Clone, PartialEq, AsChangeset)]
#[diesel(table_name = invoices)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct UpdateInvoice {
    pub property_id: Option<Option<Uuid>>,
    pub tenancy_id: Option<Option<Uuid>>,
    pub recipient_name: Option<String>,
    pub recipient_email: Option<Option<String>>,
    pub description: Option<Option<String>>,
    pub net_amount: Option<BigDecimal>,
    pub tax_amount: Option<BigDecimal>,
    pub total_amount: Option<BigDecimal>,
    pub status: Option<InvoiceStatus>,
    pub issue_date: Option<Date>,
    pub due_date: Option<Date>,
    pub paid_at: Option<Option<Timestamp>>,
}

impl Invoice {
    #[inline]
    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }

    #[inline]
    pub fn is_paid(&self) -> bool {
        self.status == InvoiceStatus::Paid
    }

    /// Returns whether the invoice is unpaid past its due date on `today`.
    pub fn is_overdue(&self, today: jiff::civil::Date) -> bool {
        self.status.is_outstanding() && jiff::civil::Date::from(self.due_date) < today
    }
}
