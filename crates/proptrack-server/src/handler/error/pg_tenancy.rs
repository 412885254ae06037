//! Tenancy agreement constraint violation error handlers.

use proptrack_postgres::types::TenancyAgreementConstraints;

use crate::handler::{Error, ErrorKind};

impl From<TenancyAgreementConstraints> for Error<'static> {
    fn from(c: TenancyAgreementConstraints) -> Self {
        let error = match c {
            TenancyAgreementConstraints::TenantNameLength => ErrorKind::BadRequest
                .with_message("Tenant name must be between 2 and 128 characters long"),
            TenancyAgreementConstraints::MonthlyRentPositive => {
                ErrorKind::BadRequest.with_message("Monthly rent must be positive")
            }
            TenancyAgreementConstraints::DepositNonNegative => {
                ErrorKind::BadRequest.with_message("Deposit cannot be negative")
            }
            TenancyAgreementConstraints::RentDueDayRange => {
                ErrorKind::BadRequest.with_message("Rent due day must be between 1 and 28")
            }
            TenancyAgreementConstraints::DepositCap => ErrorKind::BadRequest
                .with_message("Deposit cannot exceed five weeks of rent"),
            TenancyAgreementConstraints::EndAfterStart => {
                ErrorKind::BadRequest.with_message("End date must be after the start date")
            }
            TenancyAgreementConstraints::ActivePropertyUnique => ErrorKind::Conflict
                .with_message("The property already has an active tenancy")
                .with_suggestion("Terminate the current tenancy first"),
            TenancyAgreementConstraints::UpdatedAfterCreated
            | TenancyAgreementConstraints::DeletedAfterCreated => {
                ErrorKind::InternalServerError.into_error()
            }
        };

        error.with_resource("tenancy")
    }
}
