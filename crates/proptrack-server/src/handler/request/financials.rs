//! Financial report request types.

use jiff::civil::Date;
use proptrack_postgres::types::TransactionFilter;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::{Validate, ValidationError};

use super::transactions::check_range;

/// Query of `GET /financials/summary/`. Date bounds are inclusive.
#[must_use]
#[derive(Debug, Default, Clone, Copy, Serialize, Deserialize, Validate, JsonSchema)]
#[serde(rename_all = "camelCase")]
#[validate(schema(function = "validate_summary_range"))]
pub struct FinancialSummaryQuery {
    pub from: Option<Date>,
    pub to: Option<Date>,
    /// Restricts the summary to one property.
    pub property_id: Option<Uuid>,
}

fn validate_summary_range(query: &FinancialSummaryQuery) -> Result<(), ValidationError> {
    check_range(query.from, query.to)
}

impl From<FinancialSummaryQuery> for TransactionFilter {
    fn from(query: FinancialSummaryQuery) -> Self {
        Self {
            from: query.from,
            to: query.to,
            property_id: query.property_id,
            ..Self::default()
        }
    }
}
