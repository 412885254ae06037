//! Transaction response types.

use bigdecimal::BigDecimal;
use jiff::Timestamp;
use jiff::civil::Date;
use proptrack_postgres::model;
use proptrack_postgres::types::{TransactionCategory, TransactionType};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Represents a recorded income or expense.
#[must_use]
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub transaction_id: Uuid,
    pub property_id: Option<Uuid>,
    /// Invoice this payment settled.
    pub invoice_id: Option<Uuid>,
    pub transaction_type: TransactionType,
    pub category: TransactionCategory,
    pub amount: BigDecimal,
    pub description: Option<String>,
    pub reference: Option<String>,
    pub transaction_date: Date,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Transaction {
    pub fn from_model(transaction: model::Transaction) -> Self {
        Self {
            transaction_id: transaction.id,
            property_id: transaction.property_id,
            invoice_id: transaction.invoice_id,
            transaction_type: transaction.transaction_type,
            category: transaction.category,
            amount: transaction.amount,
            description: transaction.description,
            reference: transaction.reference,
            transaction_date: transaction.transaction_date.into(),
            created_at: transaction.created_at.into(),
            updated_at: transaction.updated_at.into(),
        }
    }
}

/// Paginated list of transactions.
pub type TransactionsPage = super::Page<Transaction>;
