//! Tenancy agreement request types.

use bigdecimal::{BigDecimal, Zero};
use jiff::civil::Date;
use proptrack_postgres::model::{NewTenancyAgreement, UpdateTenancyAgreement};
use proptrack_postgres::types::TenancyStatus;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::{Validate, ValidationError};

use super::validations::{
    non_blank, validate_non_negative_amount, validate_positive_amount, validation_error,
};

/// Request payload for creating a tenancy agreement.
#[must_use]
#[derive(Debug, Serialize, Deserialize, Validate, JsonSchema)]
#[serde(rename_all = "camelCase")]
#[validate(schema(function = "validate_create_dates"))]
pub struct CreateTenancy {
    /// Let property; must belong to the caller.
    pub property_id: Uuid,

    #[validate(length(min = 2, max = 200))]
    pub tenant_name: String,
    #[validate(email)]
    pub tenant_email: Option<String>,
    #[validate(length(min = 7, max = 20))]
    pub tenant_phone: Option<String>,

    pub start_date: Date,
    /// Exclusive end of a fixed term; `None` for a periodic tenancy.
    pub end_date: Option<Date>,

    #[validate(custom(function = "validate_positive_amount"))]
    pub monthly_rent: BigDecimal,
    #[validate(custom(function = "validate_non_negative_amount"))]
    pub deposit_amount: Option<BigDecimal>,
    /// Deposit protection scheme, e.g. DPS, MyDeposits or TDS.
    #[validate(length(min = 1, max = 100))]
    pub deposit_scheme: Option<String>,
    /// Day of the month rent is due.
    #[validate(range(min = 1, max = 28))]
    pub rent_due_day: Option<i32>,
    /// `draft` (default) or `active`.
    pub status: Option<TenancyStatus>,
    #[validate(length(max = 5000))]
    pub notes: Option<String>,
}

fn validate_create_dates(request: &CreateTenancy) -> Result<(), ValidationError> {
    check_term(request.start_date, request.end_date)
}

fn check_term(start_date: Date, end_date: Option<Date>) -> Result<(), ValidationError> {
    match end_date {
        Some(end_date) if end_date <= start_date => Err(validation_error(
            "tenancy_term",
            "The end date must be after the start date",
        )),
        _ => Ok(()),
    }
}

impl CreateTenancy {
    /// Converts this request into a database model for `landlord_id`.
    pub fn into_model(self, landlord_id: Uuid) -> NewTenancyAgreement {
        NewTenancyAgreement {
            property_id: self.property_id,
            landlord_id,
            tenant_name: self.tenant_name.trim().to_owned(),
            tenant_email: non_blank(self.tenant_email).map(|email| email.to_lowercase()),
            tenant_phone: non_blank(self.tenant_phone),
            start_date: self.start_date.into(),
            end_date: self.end_date.map(Into::into),
            monthly_rent: self.monthly_rent,
            deposit_amount: self.deposit_amount.unwrap_or_else(BigDecimal::zero),
            deposit_scheme: non_blank(self.deposit_scheme),
            rent_due_day: self.rent_due_day.unwrap_or(1),
            status: self.status.unwrap_or_default(),
            notes: non_blank(self.notes),
        }
    }
}

/// Request payload for updating a tenancy agreement.
#[must_use]
#[derive(Debug, Default, Serialize, Deserialize, Validate, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTenancy {
    #[validate(length(min = 2, max = 200))]
    pub tenant_name: Option<String>,
    #[validate(email)]
    pub tenant_email: Option<String>,
    #[validate(length(min = 7, max = 20))]
    pub tenant_phone: Option<String>,

    pub start_date: Option<Date>,
    pub end_date: Option<Date>,

    #[validate(custom(function = "validate_positive_amount"))]
    pub monthly_rent: Option<BigDecimal>,
    #[validate(custom(function = "validate_non_negative_amount"))]
    pub deposit_amount: Option<BigDecimal>,
    #[validate(length(min = 1, max = 100))]
    pub deposit_scheme: Option<String>,
    #[validate(range(min = 1, max = 28))]
    pub rent_due_day: Option<i32>,
    pub status: Option<TenancyStatus>,
    #[validate(length(max = 5000))]
    pub notes: Option<String>,
}

impl UpdateTenancy {
    /// Checks the term that results from applying this update to the
    /// stored dates.
    pub fn validate_term(
        &self,
        start_date: Date,
        end_date: Option<Date>,
    ) -> Result<(), ValidationError> {
        check_term(
            self.start_date.unwrap_or(start_date),
            self.end_date.or(end_date),
        )
    }

    /// Converts this request into a database changeset.
    pub fn into_model(self) -> UpdateTenancyAgreement {
        UpdateTenancyAgreement {
            tenant_name: self.tenant_name.map(|v| v.trim().to_owned()),
            tenant_email: self
                .tenant_email
                .map(|v| non_blank(Some(v)).map(|email| email.to_lowercase())),
            tenant_phone: self.tenant_phone.map(|v| non_blank(Some(v))),
            start_date: self.start_date.map(Into::into),
            end_date: self.end_date.map(|date| Some(date.into())),
            monthly_rent: self.monthly_rent,
            deposit_amount: self.deposit_amount,
            deposit_scheme: self.deposit_scheme.map(|v| non_blank(Some(v))),
            rent_due_day: self.rent_due_day,
            status: self.status,
            notes: self.notes.map(|v| non_blank(Some(v))),
        }
    }
}

/// Request payload for terminating a tenancy early.
#[must_use]
#[derive(Debug, Default, Serialize, Deserialize, Validate, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct TerminateTenancy {
    /// Last day of the tenancy; defaults to today.
    pub end_date: Option<Date>,
    #[validate(length(max = 5000))]
    pub reason: Option<String>,
}

/// Filters of `GET /tenancies/`.
#[must_use]
#[derive(Debug, Default, Clone, Copy, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct TenancyQuery {
    pub property_id: Option<Uuid>,
    pub status: Option<TenancyStatus>,
}

#[cfg(test)]
mod tests {
    use jiff::civil::date;

    use super::*;

    fn create_request() -> CreateTenancy {
        CreateTenancy {
            property_id: Uuid::new_v4(),
            tenant_name: "Jane Eyre".into(),
            tenant_email: Some("Jane@Thornfield.co.uk".into()),
            tenant_phone: None,
            start_date: date(2024, 9, 1),
            end_date: Some(date(2025, 9, 1)),
            monthly_rent: BigDecimal::from(1450),
            deposit_amount: None,
            deposit_scheme: None,
            rent_due_day: None,
            status: None,
            notes: None,
        }
    }

    #[test]
    fn create_applies_defaults() {
        let landlord_id = Uuid::new_v4();
        let tenancy = create_request().into_model(landlord_id);

        assert_eq!(tenancy.landlord_id, landlord_id);
        assert_eq!(tenancy.rent_due_day, 1);
        assert_eq!(tenancy.status, TenancyStatus::Draft);
        assert!(tenancy.deposit_amount.is_zero());
        assert_eq!(tenancy.tenant_email.as_deref(), Some("jane@thornfield.co.uk"));
    }

    #[test]
    fn end_must_follow_start() {
        let request = CreateTenancy {
            end_date: Some(date(2024, 9, 1)),
            ..create_request()
        };
        assert!(request.validate().is_err());
        assert!(create_request().validate().is_ok());
    }

    #[test]
    fn update_term_uses_stored_dates() {
        let update = UpdateTenancy {
            end_date: Some(date(2024, 1, 1)),
            ..UpdateTenancy::default()
        };
        assert!(update.validate_term(date(2024, 6, 1), None).is_err());
        assert!(update.validate_term(date(2023, 6, 1), None).is_ok());
    }
}
