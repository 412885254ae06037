//! Tenancy agreement models.

use bigdecimal::BigDecimal;
use diesel::prelude::*;
use jiff_diesel::{Date, Timestamp};
use uuid::Uuid;

use crate::schema::tenancy_agreements;
use crate::types::TenancyStatus;

/// Assured shorthold tenancy (or similar) between a landlord and a tenant.
#[derive(Debug, Clone, PartialEq, Queryable, Selectable)]
#[diesel(table_name = tenancy_agreements)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct TenancyAgreement {
    pub id: Uuid,
    pub property_id: Uuid,
    pub landlord_id: Uuid,
    pub tenant_name: String,
    pub tenant_email: Option<String>,
    pub tenant_phone: Option<String>,
    pub start_date: Date,
    /// `None` for a periodic tenancy.
    pub end_date: Option<Date>,
    pub monthly_rent: BigDecimal,
    /// At most five weeks' rent.
    pub deposit_amount: BigDecimal,
    /// Government-backed deposit protection scheme.
    pub deposit_scheme: Option<String>,
    /// Day of month the rent falls due (1-28).
    pub rent_due_day: i32,
    pub status: TenancyStatus,
    pub notes: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
    pub deleted_at: Option<Timestamp>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = tenancy_agreements)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct NewTenancyAgreement {
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
}

#[derive(Debug, Default, Clone, PartialEq, AsChangeset)]
#[diesel(table_name = tenancy_agreements)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct UpdateTenancyAgreement {
    pub tenant_name: Option<String>,
    pub tenant_email: Option<Option<String>>,
    pub tenant_phone: Option<Option<String>>,
    pub start_date: Option<Date>,
    pub end_date: Option<Option<Date>>,
    pub monthly_rent: Option<BigDecimal>,
    pub deposit_amount: Option<BigDecimal>,
    pub deposit_scheme: Option<Option<String>>,
    pub rent_due_day: Option<i32>,
    pub status: Option<TenancyStatus>,
    pub notes: Option<Option<String>>,
}

impl TenancyAgreement {
    #[inline]
    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }

    #[inline]
    pub fn is_terminal(&self) -> bool {
        self.status.is_final()
    }

    /// Returns whether the tenancy covers `date`.
    pub fn is_in_force_on(&self, date: jiff::civil::Date) -> bool {
        let start = jiff::civil::Date::from(self.start_date);
        let end = self.end_date.map(jiff::civil::Date::from);
        start <= date && end.is_none_or(|end| date < end)
    }
}
