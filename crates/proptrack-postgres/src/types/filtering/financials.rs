use jiff::civil::Date;
use uuid::Uuid;

use crate::types::{InvoiceStatus, TransactionCategory, TransactionType};

/// Filter for an account's invoices.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InvoiceFilter {
    pub status: Option<InvoiceStatus>,
    pub property_id: Option<Uuid>,
    pub tenancy_id: Option<Uuid>,
}

/// Filter for an account's transactions. Date bounds are inclusive.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TransactionFilter {
    pub from: Option<Date>,
    pub to: Option<Date>,
    pub transaction_type: Option<TransactionType>,
    pub category: Option<TransactionCategory>,
    pub property_id: Option<Uuid>,
}
