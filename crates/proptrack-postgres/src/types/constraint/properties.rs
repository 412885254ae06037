//! Constraints of the `properties` table.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

use super::ConstraintCategory;

/// Named constraints and unique indexes of `properties`.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
#[derive(Serialize, Deserialize, Display, EnumIter, EnumString)]
#[serde(into = "String", try_from = "String")]
pub enum PropertyConstraints {
    #[strum(serialize = "properties_paon_not_empty")]
    PaonNotEmpty,
    #[strum(serialize = "properties_town_not_empty")]
    TownNotEmpty,
    #[strum(serialize = "properties_postcode_format")]
    PostcodeFormat,
    #[strum(serialize = "properties_bedrooms_range")]
    BedroomsRange,
    #[strum(serialize = "properties_bathrooms_range")]
    BathroomsRange,
    #[strum(serialize = "properties_floor_area_positive")]
    FloorAreaPositive,
    #[strum(serialize = "properties_asking_price_positive")]
    AskingPricePositive,
    #[strum(serialize = "properties_monthly_rent_positive")]
    MonthlyRentPositive,
    #[strum(serialize = "properties_last_sale_price_positive")]
    LastSalePricePositive,
    #[strum(serialize = "properties_ppd_category_values")]
    PpdCategoryValues,

    #[strum(serialize = "properties_land_registry_transaction_id_unique")]
    LandRegistryTransactionIdUnique,

    #[strum(serialize = "properties_updated_after_created")]
    UpdatedAfterCreated,
    #[strum(serialize = "properties_deleted_after_created")]
    DeletedAfterCreated,
}

impl PropertyConstraints {
    /// Parses a constraint name reported by PostgreSQL.
    pub fn new(constraint: &str) -> Option<Self> {
        constraint.parse().ok()
    }

    pub fn categorize(&self) -> ConstraintCategory {
        match self {
            Self::PaonNotEmpty
            | Self::TownNotEmpty
            | Self::PostcodeFormat
            | Self::BedroomsRange
            | Self::BathroomsRange
            | Self::FloorAreaPositive
            | Self::AskingPricePositive
            | Self::MonthlyRentPositive
            | Self::LastSalePricePositive
            | Self::PpdCategoryValues => ConstraintCategory::Validation,
            Self::LandRegistryTransactionIdUnique => ConstraintCategory::Uniqueness,
            Self::UpdatedAfterCreated
            | Self::DeletedAfterCreated => ConstraintCategory::Chronological,
        }
    }
}

impl From<PropertyConstraints> for String {
    #[inline]
    fn from(value: PropertyConstraints) -> Self {
        value.to_string()
    }
}

impl TryFrom<String> for PropertyConstraints {
    type Error = strum::ParseError;

    #[inline]
    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}
