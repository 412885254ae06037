//! Invoice request types.

use bigdecimal::{BigDecimal, Zero};
use jiff::civil::Date;
use proptrack_postgres::model::{NewInvoice, UpdateInvoice as UpdateInvoiceModel};
use proptrack_postgres::types::{InvoiceFilter, InvoiceStatus};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::{Validate, ValidationError};

use super::validations::{
    non_blank, validate_currency, validate_non_negative_amount, validation_error,
};

/// Default currency of invoices.
const DEFAULT_CURRENCY: &str = "GBP";

fn check_dates(issue_date: Date, due_date: Date) -> Result<(), ValidationError> {
    if due_date < issue_date {
        return Err(validation_error(
            "invoice_dates",
            "The due date cannot be before the issue date",
        ));
    }
    Ok(())
}

fn check_initial_status(status: &InvoiceStatus) -> Result<(), ValidationError> {
    match status {
        InvoiceStatus::Draft | InvoiceStatus::Issued => Ok(()),
        _ => Err(validation_error(
            "invoice_status",
            "New invoices are either draft or issued",
        )),
    }
}

/// Request payload for creating an invoice.
#[must_use]
#[derive(Debug, Serialize, Deserialize, Validate, JsonSchema)]
#[serde(rename_all = "camelCase")]
#[validate(schema(function = "validate_create_dates"))]
pub struct CreateInvoice {
    pub property_id: Option<Uuid>,
    pub tenancy_id: Option<Uuid>,

    #[validate(length(min = 1, max = 200))]
    pub recipient_name: String,
    #[validate(email)]
    pub recipient_email: Option<String>,
    #[validate(length(max = 5000))]
    pub description: Option<String>,

    /// Amount before tax.
    #[validate(custom(function = "validate_non_negative_amount"))]
    pub net_amount: BigDecimal,
    /// VAT or other tax; defaults to zero.
    #[validate(custom(function = "validate_non_negative_amount"))]
    pub tax_amount: Option<BigDecimal>,
    /// ISO 4217 code; defaults to GBP.
    #[validate(custom(function = "validate_currency"))]
    pub currency: Option<String>,
    /// `draft` (default) or `issued`.
    #[validate(custom(function = "check_initial_status"))]
    pub status: Option<InvoiceStatus>,

    pub issue_date: Date,
    pub due_date: Date,
}

fn validate_create_dates(request: &CreateInvoice) -> Result<(), ValidationError> {
    check_dates(request.issue_date, request.due_date)
}

impl CreateInvoice {
    /// Converts this request into a database model.
    ///
    /// The total is always the sum of net and tax amounts.
    pub fn into_model(self, account_id: Uuid, invoice_number: String) -> NewInvoice {
        let tax_amount = self.tax_amount.unwrap_or_else(BigDecimal::zero);
        NewInvoice {
            account_id,
            property_id: self.property_id,
            tenancy_id: self.tenancy_id,
            invoice_number,
            recipient_name: self.recipient_name.trim().to_owned(),
            recipient_email: non_blank(self.recipient_email),
            description: non_blank(self.description),
            total_amount: &self.net_amount + &tax_amount,
            net_amount: self.net_amount,
            tax_amount,
            currency: self
                .currency
                .unwrap_or_else(|| DEFAULT_CURRENCY.to_owned()),
            status: self.status.unwrap_or_default(),
            issue_date: self.issue_date.into(),
            due_date: self.due_date.into(),
        }
    }
}

/// Request payload for updating an invoice that is not yet paid or cancelled.
///
/// Payments go through `POST /invoices/{invoiceId}/pay/` instead.
#[must_use]
#[derive(Debug, Default, Serialize, Deserialize, Validate, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateInvoice {
    pub property_id: Option<Uuid>,
    pub tenancy_id: Option<Uuid>,

    #[validate(length(min = 1, max = 200))]
    pub recipient_name: Option<String>,
    #[validate(email)]
    pub recipient_email: Option<String>,
    #[validate(length(max = 5000))]
    pub description: Option<String>,

    #[validate(custom(function = "validate_non_negative_amount"))]
    pub net_amount: Option<BigDecimal>,
    #[validate(custom(function = "validate_non_negative_amount"))]
    pub tax_amount: Option<BigDecimal>,
    /// `draft`, `issued`, `overdue` or `cancelled`.
    pub status: Option<InvoiceStatus>,

    pub issue_date: Option<Date>,
    pub due_date: Option<Date>,
}

impl UpdateInvoice {
    /// Checks the dates that result from applying this update.
    pub fn validate_dates(&self, issue_date: Date, due_date: Date) -> Result<(), ValidationError> {
        check_dates(
            self.issue_date.unwrap_or(issue_date),
            self.due_date.unwrap_or(due_date),
        )
    }

    /// Converts this request into a database changeset.
    ///
    /// When either amount changes, the total is recomputed from the stored
    /// `net_amount` and `tax_amount`.
    pub fn into_model(self, net_amount: &BigDecimal, tax_amount: &BigDecimal) -> UpdateInvoiceModel {
        let total_amount = (self.net_amount.is_some() || self.tax_amount.is_some()).then(|| {
            self.net_amount.as_ref().unwrap_or(net_amount)
                + self.tax_amount.as_ref().unwrap_or(tax_amount)
        });

        UpdateInvoiceModel {
            property_id: self.property_id.map(Some),
            tenancy_id: self.tenancy_id.map(Some),
            recipient_name: self.recipient_name.map(|v| v.trim().to_owned()),
            recipient_email: self.recipient_email.map(|v| non_blank(Some(v))),
            description: self.description.map(|v| non_blank(Some(v))),
            net_amount: self.net_amount,
            tax_amount: self.tax_amount,
            total_amount,
            status: self.status,
            issue_date: self.issue_date.map(Into::into),
            due_date: self.due_date.map(Into::into),
            paid_at: None,
        }
    }
}

/// Request payload for recording a payment.
#[must_use]
#[derive(Debug, Default, Serialize, Deserialize, Validate, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct PayInvoice {
    /// Date the money arrived; defaults to today.
    pub paid_on: Option<Date>,
    /// Bank or payment reference.
    #[validate(length(min = 1, max = 200))]
    pub reference: Option<String>,
}

/// Filters of `GET /invoices/`.
#[must_use]
#[derive(Debug, Default, Clone, Copy, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceQuery {
    pub status: Option<InvoiceStatus>,
    pub property_id: Option<Uuid>,
    pub tenancy_id: Option<Uuid>,
}

impl From<InvoiceQuery> for InvoiceFilter {
    fn from(query: InvoiceQuery) -> Self {
        Self {
            status: query.status,
            property_id: query.property_id,
            tenancy_id: query.tenancy_id,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use jiff::civil::date;

    use super::*;

    fn create_request() -> anyhow::Result<CreateInvoice> {
        Ok(CreateInvoice {
            property_id: None,
            tenancy_id: None,
            recipient_name: "Jane Eyre".into(),
            recipient_email: None,
            description: Some("Rent for October".into()),
            net_amount: BigDecimal::from_str("1000.00")?,
            tax_amount: Some(BigDecimal::from_str("200.00")?),
            currency: None,
            status: None,
            issue_date: date(2024, 10, 1),
            due_date: date(2024, 10, 14),
        })
    }

    #[test]
    fn total_is_net_plus_tax() -> anyhow::Result<()> {
        let invoice = create_request()?.into_model(Uuid::nil(), "INV-000001".into());
        assert_eq!(invoice.total_amount, BigDecimal::from(1200));
        assert_eq!(invoice.currency, "GBP");
        assert_eq!(invoice.status, InvoiceStatus::Draft);
        Ok(())
    }

    #[test]
    fn due_date_cannot_precede_issue_date() -> anyhow::Result<()> {
        let request = CreateInvoice {
            due_date: date(2024, 9, 30),
            ..create_request()?
        };
        assert!(request.validate().is_err());
        Ok(())
    }

    #[test]
    fn new_invoices_cannot_start_paid() -> anyhow::Result<()> {
        let request = CreateInvoice {
            status: Some(InvoiceStatus::Paid),
            ..create_request()?
        };
        assert!(request.validate().is_err());
        Ok(())
    }

    #[test]
    fn update_recomputes_total() {
        let update = UpdateInvoice {
            tax_amount: Some(BigDecimal::from(50)),
            ..UpdateInvoice::default()
        };

        let changeset = update.into_model(&BigDecimal::from(500), &BigDecimal::from(100));
        assert_eq!(changeset.total_amount, Some(BigDecimal::from(550)));

        let untouched = UpdateInvoice::default().into_model(&BigDecimal::from(1), &BigDecimal::from(1));
        assert_eq!(untouched.total_amount, None);
    }
}
