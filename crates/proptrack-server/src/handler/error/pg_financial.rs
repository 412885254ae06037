//! Invoice and transaction constraint violation error handlers.

use proptrack_postgres::types::{InvoiceConstraints, TransactionConstraints};

use crate::handler::{Error, ErrorKind};

impl From<InvoiceConstraints> for Error<'static> {
    fn from(c: InvoiceConstraints) -> Self {
        let error = match c {
            InvoiceConstraints::InvoiceNumberFormat => ErrorKind::BadRequest
                .with_message("Invoice number must be 3 to 32 upper-case letters, digits or dashes"),
            InvoiceConstraints::RecipientNameLength => ErrorKind::BadRequest
                .with_message("Recipient name must be between 2 and 128 characters long"),
            InvoiceConstraints::NetAmountNonNegative => {
                ErrorKind::BadRequest.with_message("Net amount cannot be negative")
            }
            InvoiceConstraints::TaxAmountNonNegative => {
                ErrorKind::BadRequest.with_message("Tax amount cannot be negative")
            }
            InvoiceConstraints::CurrencyFormat => ErrorKind::BadRequest
                .with_message("Currency must be a three letter ISO code"),
            InvoiceConstraints::TotalAmountConsistent => ErrorKind::BadRequest
                .with_message("Total amount must equal net amount plus tax"),
            InvoiceConstraints::PaidStatusConsistency => ErrorKind::BadRequest
                .with_message("Only paid invoices can have a payment date")
                .with_suggestion("Use the pay endpoint to record a payment"),
            InvoiceConstraints::AccountInvoiceNumberUnique => ErrorKind::Conflict
                .with_message("An invoice with this number already exists"),
            InvoiceConstraints::DueAfterIssue => ErrorKind::BadRequest
                .with_message("Due date cannot be before the issue date"),
            InvoiceConstraints::UpdatedAfterCreated | InvoiceConstraints::DeletedAfterCreated => {
                ErrorKind::InternalServerError.into_error()
            }
        };

        error.with_resource("invoice")
    }
}

impl From<TransactionConstraints> for Error<'static> {
    fn from(c: TransactionConstraints) -> Self {
        let error = match c {
            TransactionConstraints::AmountPositive => {
                ErrorKind::BadRequest.with_message("Amount must be positive")
            }
            TransactionConstraints::DescriptionLengthMax => ErrorKind::BadRequest
                .with_message("Description cannot exceed 1024 characters"),
            TransactionConstraints::ReferenceLengthMax => {
                ErrorKind::BadRequest.with_message("Reference cannot exceed 128 characters")
            }
            TransactionConstraints::InvoicePaymentUnique => {
                ErrorKind::Conflict.with_message("The invoice has already been paid")
            }
            TransactionConstraints::UpdatedAfterCreated
            | TransactionConstraints::DeletedAfterCreated => {
                ErrorKind::InternalServerError.into_error()
            }
        };

        error.with_resource("transaction")
    }
}
