//! Tenancy agreement response types.

use bigdecimal::BigDecimal;
use jiff::Timestamp;
use jiff::civil::Date;
use proptrack_postgres::model::TenancyAgreement;
use proptrack_postgres::types::TenancyStatus;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Represents a tenancy agreement.
#[must_use]
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Tenancy {
    pub tenancy_id: Uuid,
    pub property_id: Uuid,
    pub landlord_id: Uuid,

    pub tenant_name: String,
    pub tenant_email: Option<String>,
    pub tenant_phone: Option<String>,

    pub start_date: Date,
    pub end_date: Option<Date>,
    pub monthly_rent: BigDecimal,
    pub deposit_amount: BigDecimal,
    pub deposit_scheme: Option<String>,
    pub rent_due_day: i32,
    pub status: TenancyStatus,
    pub notes: Option<String>,

    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Tenancy {
    pub fn from_model(tenancy: TenancyAgreement) -> Self {
        Self {
            tenancy_id: tenancy.id,
            property_id: tenancy.property_id,
            landlord_id: tenancy.landlord_id,

            tenant_name: tenancy.tenant_name,
            tenant_email: tenancy.tenant_email,
            tenant_phone: tenancy.tenant_phone,

            start_date: tenancy.start_date.into(),
            end_date: tenancy.end_date.map(Into::into),
            monthly_rent: tenancy.monthly_rent,
            deposit_amount: tenancy.deposit_amount,
            deposit_scheme: tenancy.deposit_scheme,
            rent_due_day: tenancy.rent_due_day,
            status: tenancy.status,
            notes: tenancy.notes,

            created_at: tenancy.created_at.into(),
            updated_at: tenancy.updated_at.into(),
        }
    }
}

/// Paginated list of tenancies.
pub type TenanciesPage = super::Page<Tenancy>;
