//! Constraints of the `tenancy_agreements` table.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

use super::ConstraintCategory;

/// Named constraints and unique indexes of `tenancy_agreements`.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
#[derive(Serialize, Deserialize, Display, EnumIter, EnumString)]
#[serde(into = "String", try_from = "String")]
pub enum TenancyAgreementConstraints {
    #[strum(serialize = "tenancy_agreements_tenant_name_length")]
    TenantNameLength,
    #[strum(serialize = "tenancy_agreements_monthly_rent_positive")]
    MonthlyRentPositive,
    #[strum(serialize = "tenancy_agreements_deposit_non_negative")]
    DepositNonNegative,
    #[strum(serialize = "tenancy_agreements_rent_due_day_range")]
    RentDueDayRange,

    /// Deposit exceeds five weeks' rent (Tenant Fees Act 2019).
    #[strum(serialize = "tenancy_agreements_deposit_cap")]
    DepositCap,

    /// A property can have at most one active tenancy.
    #[strum(serialize = "tenancy_agreements_active_property_unique")]
    ActivePropertyUnique,

    #[strum(serialize = "tenancy_agreements_end_after_start")]
    EndAfterStart,
    #[strum(serialize = "tenancy_agreements_updated_after_created")]
    UpdatedAfterCreated,
    #[strum(serialize = "tenancy_agreements_deleted_after_created")]
    DeletedAfterCreated,
}

impl TenancyAgreementConstraints {
    /// Parses a constraint name reported by PostgreSQL.
    pub fn new(constraint: &str) -> Option<Self> {
        constraint.parse().ok()
    }

    pub fn categorize(&self) -> ConstraintCategory {
        match self {
            Self::TenantNameLength
            | Self::MonthlyRentPositive
            | Self::DepositNonNegative
            | Self::RentDueDayRange => ConstraintCategory::Validation,
            Self::DepositCap => ConstraintCategory::BusinessLogic,
            Self::ActivePropertyUnique => ConstraintCategory::Uniqueness,
            Self::EndAfterStart
            | Self::UpdatedAfterCreated
            | Self::DeletedAfterCreated => ConstraintCategory::Chronological,
        }
    }
}

impl From<TenancyAgreementConstraints> for String {
    #[inline]
    fn from(value: TenancyAgreementConstraints) -> Self {
        value.to_string()
    }
}

impl TryFrom<String> for TenancyAgreementConstraints {
    type Error = strum::ParseError;

    #[inline]
    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}
