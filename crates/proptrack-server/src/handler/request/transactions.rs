//! Transaction request types.

use bigdecimal::BigDecimal;
use jiff::civil::Date;
use proptrack_postgres::model::{NewTransaction, UpdateTransaction as UpdateTransactionModel};
use proptrack_postgres::types::{TransactionCategory, TransactionFilter, TransactionType};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::{Validate, ValidationError};

use super::validations::{non_blank, validate_positive_amount, validation_error};

/// Request payload for recording income or an expense.
#[must_use]
#[derive(Debug, Serialize, Deserialize, Validate, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateTransaction {
    pub property_id: Option<Uuid>,
    pub transaction_type: TransactionType,
    #[serde(default)]
    pub category: TransactionCategory,
    /// Always positive; the type decides the direction.
    #[validate(custom(function = "validate_positive_amount"))]
    pub amount: BigDecimal,
    #[validate(length(max = 1000))]
    pub description: Option<String>,
    #[validate(length(min = 1, max = 200))]
    pub reference: Option<String>,
    pub transaction_date: Date,
}

impl CreateTransaction {
    /// Converts this request into a database model.
    pub fn into_model(self, account_id: Uuid) -> NewTransaction {
        NewTransaction {
            account_id,
            property_id: self.property_id,
            invoice_id: None,
            transaction_type: self.transaction_type,
            category: self.category,
            amount: self.amount,
            description: non_blank(self.description),
            reference: non_blank(self.reference),
            transaction_date: self.transaction_date.into(),
        }
    }
}

/// Request payload for correcting a transaction.
#[must_use]
#[derive(Debug, Default, Serialize, Deserialize, Validate, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTransaction {
    pub property_id: Option<Uuid>,
    pub transaction_type: Option<TransactionType>,
    pub category: Option<TransactionCategory>,
    #[validate(custom(function = "validate_positive_amount"))]
    pub amount: Option<BigDecimal>,
    #[validate(length(max = 1000))]
    pub description: Option<String>,
    #[validate(length(min = 1, max = 200))]
    pub reference: Option<String>,
    pub transaction_date: Option<Date>,
}

impl UpdateTransaction {
    /// Converts this request into a database changeset.
    pub fn into_model(self) -> UpdateTransactionModel {
        UpdateTransactionModel {
            property_id: self.property_id.map(Some),
            transaction_type: self.transaction_type,
            category: self.category,
            amount: self.amount,
            description: self.description.map(|v| non_blank(Some(v))),
            reference: self.reference.map(|v| non_blank(Some(v))),
            transaction_date: self.transaction_date.map(Into::into),
        }
    }
}

/// Filters of `GET /transactions/`. Date bounds are inclusive.
#[must_use]
#[derive(Debug, Default, Clone, Copy, Serialize, Deserialize, Validate, JsonSchema)]
#[serde(rename_all = "camelCase")]
#[validate(schema(function = "validate_query_range"))]
pub struct TransactionQuery {
    pub from: Option<Date>,
    pub to: Option<Date>,
    pub transaction_type: Option<TransactionType>,
    pub category: Option<TransactionCategory>,
    pub property_id: Option<Uuid>,
}

fn validate_query_range(query: &TransactionQuery) -> Result<(), ValidationError> {
    check_range(query.from, query.to)
}

/// Rejects a `from` bound after the `to` bound.
pub(super) fn check_range(from: Option<Date>, to: Option<Date>) -> Result<(), ValidationError> {
    match (from, to) {
        (Some(from), Some(to)) if from > to => Err(validation_error(
            "date_range",
            "`from` must not be after `to`",
        )),
        _ => Ok(()),
    }
}

impl From<TransactionQuery> for TransactionFilter {
    fn from(query: TransactionQuery) -> Self {
        Self {
            from: query.from,
            to: query.to,
            transaction_type: query.transaction_type,
            category: query.category,
            property_id: query.property_id,
        }
    }
}

#[cfg(test)]
mod tests {
    use jiff::civil::date;

    use super::*;

    #[test]
    fn zero_amount_is_rejected() {
        let request = CreateTransaction {
            property_id: None,
            transaction_type: TransactionType::Expense,
            category: TransactionCategory::Maintenance,
            amount: BigDecimal::from(0),
            description: Some("Boiler service".into()),
            reference: None,
            transaction_date: date(2024, 5, 2),
        };
        assert!(request.validate().is_err());
    }

    #[test]
    fn reversed_range_is_rejected() {
        let query = TransactionQuery {
            from: Some(date(2024, 4, 6)),
            to: Some(date(2024, 4, 5)),
            ..TransactionQuery::default()
        };
        assert!(query.validate().is_err());

        let filter = TransactionFilter::from(TransactionQuery {
            from: Some(date(2024, 4, 6)),
            ..TransactionQuery::default()
        });
        assert_eq!(filter.from, Some(date(2024, 4, 6)));
        assert_eq!(filter.to, None);
    }
}
