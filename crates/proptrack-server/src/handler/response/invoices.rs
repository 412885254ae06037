//! Invoice response types.

use bigdecimal::BigDecimal;
use jiff::civil::Date;
use jiff::{Timestamp, Zoned};
use proptrack_postgres::model;
use proptrack_postgres::types::InvoiceStatus;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::Transaction;

/// Represents an invoice.
#[must_use]
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Invoice {
    pub invoice_id: Uuid,
    pub invoice_number: String,
    pub property_id: Option<Uuid>,
    pub tenancy_id: Option<Uuid>,

    pub recipient_name: String,
    pub recipient_email: Option<String>,
    pub description: Option<String>,

    pub net_amount: BigDecimal,
    pub tax_amount: BigDecimal,
    pub total_amount: BigDecimal,
    pub currency: String,

    pub status: InvoiceStatus,
    /// Outstanding and past its due date.
    pub is_overdue: bool,
    pub issue_date: Date,
    pub due_date: Date,
    pub paid_at: Option<Timestamp>,

    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Invoice {
    pub fn from_model(invoice: model::Invoice) -> Self {
        let today = Zoned::now().date();
        Self::from_model_on(invoice, today)
    }

    /// Renders the invoice as seen on `today`.
    pub fn from_model_on(invoice: model::Invoice, today: Date) -> Self {
        Self {
            is_overdue: invoice.is_overdue(today),
            invoice_id: invoice.id,
            invoice_number: invoice.invoice_number,
            property_id: invoice.property_id,
            tenancy_id: invoice.tenancy_id,

            recipient_name: invoice.recipient_name,
            recipient_email: invoice.recipient_email,
            description: invoice.description,

            net_amount: invoice.net_amount,
            tax_amount: invoice.tax_amount,
            total_amount: invoice.total_amount,
            currency: invoice.currency,

            status: invoice.status,
            issue_date: invoice.issue_date.into(),
            due_date: invoice.due_date.into(),
            paid_at: invoice.paid_at.map(Into::into),

            created_at: invoice.created_at.into(),
            updated_at: invoice.updated_at.into(),
        }
    }
}

/// Response of `POST /invoices/{invoiceId}/pay/`.
#[must_use]
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct InvoicePayment {
    /// The invoice, now paid.
    pub invoice: Invoice,
    /// The income transaction booked for the payment.
    pub transaction: Transaction,
}

/// Paginated list of invoices.
pub type InvoicesPage = super::Page<Invoice>;
