//! Financial transaction models.

use bigdecimal::BigDecimal;
use diesel::prelude::*;
use jiff_diesel::{Date, Timestamp};
use uuid::Uuid;

use crate::schema::transactions;
use crate::types::{TransactionCategory, TransactionType};

/// Money received or paid out by an account.
#[derive(Debug, Clone, PartialEq, Queryable, Selectable)]
#[diesel(table_name = transactions)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Transaction {
    pub id: Uuid,
    pub account_id: Uuid,
    pub property_id: Option<Uuid>,
    /// Invoice settled by this transaction.
    pub invoice_id: Option<Uuid>,
    pub transaction_type: TransactionType,
    pub category: TransactionCategory,
    /// Always positive; the direction comes from `transaction_type`.
    pub amount: BigDecimal,
    pub description: Option<String>,
    pub reference: Option<String>,
    pub transaction_date: Date,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
    pub deleted_at: Option<Timestamp>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = transactions)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct NewTransaction {
    pub account_id: Uuid,
    pub property_id: Option<Uuid>,
    pub invoice_id: Option<Uuid>,
    pub transaction_type: TransactionType,
    pub category: TransactionCategory,
    pub amount: BigDecimal,
    pub description: Option<String>,
    pub reference: Option<String>,
    pub transaction_date: Date,
}

#[derive(Debug, Default, Clone, PartialEq, AsChangeset)]
#[diesel(table_name = transactions)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct UpdateTransaction {
    pub property_id: Option<Option<Uuid>>,
    pub transaction_type: Option<TransactionType>,
    pub category: Option<TransactionCategory>,
    pub amount: Option<BigDecimal>,
    pub description: Option<Option<String>>,
    pub reference: Option<Option<String>>,
    pub transaction_date: Option<Date>,
}

impl Transaction {
    #[inline]
    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }

    #[inline]
    pub fn is_income(&self) -> bool {
        self.transaction_type == TransactionType::Income
    }
}
