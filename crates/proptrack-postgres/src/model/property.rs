//! Property models.
//!
//! A property is either managed by an account (`owner_id` set) or was
//! created by a Land Registry import, in which case it only carries the
//! address and the last recorded sale.

use bigdecimal::BigDecimal;
use diesel::prelude::*;
use jiff_diesel::{Date, Timestamp};
use uuid::Uuid;

use crate::schema::properties;
use crate::types::{EpcRating, ListingStatus, PropertyType, TenureType};

/// A residential or commercial property.
#[derive(Debug, Clone, PartialEq, Queryable, Selectable)]
#[diesel(table_name = properties)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Property {
    pub id: Uuid,
    /// Managing account; `None` for imported market data.
    pub owner_id: Option<Uuid>,
    pub display_name: Option<String>,
    pub description: Option<String>,
    /// Primary addressable object name, usually the house number or name.
    pub paon: String,
    /// Secondary addressable object name, such as a flat number.
    pub saon: Option<String>,
    pub street: Option<String>,
    pub locality: Option<String>,
    pub town: String,
    pub district: Option<String>,
    pub county: Option<String>,
    /// Upper-case postcode with a single space, e.g. `SW1A 1AA`.
    pub postcode: String,
    pub property_type: PropertyType,
    pub tenure: TenureType,
    pub is_new_build: bool,
    pub bedrooms: Option<i32>,
    pub bathrooms: Option<i32>,
    pub floor_area_sqm: Option<BigDecimal>,
    pub epc_rating: Option<EpcRating>,
    pub listing_status: ListingStatus,
    pub asking_price: Option<BigDecimal>,
    pub monthly_rent: Option<BigDecimal>,
    pub last_sale_price: Option<BigDecimal>,
    pub last_sale_date: Option<Date>,
    /// Price Paid Data transaction identifier of the last recorded sale.
    pub land_registry_transaction_id: Option<String>,
    /// Price Paid Data category, `A` (standard) or `B` (additional).
    pub ppd_category: Option<String>,
    /// Import that created or last updated the row.
    pub import_id: Option<Uuid>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
    pub deleted_at: Option<Timestamp>,
}

/// New property.
#[derive(Debug, Default, Clone, Insertable)]
#[diesel(table_name = properties)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct NewProperty {
    pub owner_id: Option<Uuid>,
    pub display_name: Option<String>,
    pub description: Option<String>,
    pub paon: String,
    pub saon: Option<String>,
    pub street: Option<String>,
    pub locality: Option<String>,
    pub town: String,
    pub district: Option<String>,
    pub county: Option<String>,
    pub postcode: String,
    pub property_type: PropertyType,
    pub tenure: TenureType,
    pub is_new_build: bool,
    pub bedrooms: Option<i32>,
    pub bathrooms: Option<i32>,
    pub floor_area_sqm: Option<BigDecimal>,
    pub epc_rating: Option<EpcRating>,
    pub listing_status: ListingStatus,
    pub asking_price: Option<BigDecimal>,
    pub monthly_rent: Option<BigDecimal>,
    pub last_sale_price: Option<BigDecimal>,
    pub last_sale_date: Option<Date>,
    pub land_registry_transaction_id: Option<String>,
    pub ppd_category: Option<String>,
    pub import_id: Option<Uuid>,
}

/// Changes to a property.
///
/// For nullable columns `Some(None)` clears the value.
#[derive(Debug, Default, Clone, PartialEq, AsChangeset)]
#[diesel(table_name = properties)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct UpdateProperty {
    pub display_name: Option<Option<String>>,
    pub description: Option<Option<String>>,
    pub paon: Option<String>,
    pub saon: Option<Option<String>>,
    pub street: Option<Option<String>>,
    pub locality: Option<Option<String>>,
    pub town: Option<String>,
    pub district: Option<Option<String>>,
    pub county: Option<Option<String>>,
    pub postcode: Option<String>,
    pub property_type: Option<PropertyType>,
    pub tenure: Option<TenureType>,
    pub is_new_build: Option<bool>,
    pub bedrooms: Option<Option<i32>>,
    pub bathrooms: Option<Option<i32>>,
    pub floor_area_sqm: Option<Option<BigDecimal>>,
    pub epc_rating: Option<Option<EpcRating>>,
    pub listing_status: Option<ListingStatus>,
    pub asking_price: Option<Option<BigDecimal>>,
    pub monthly_rent: Option<Option<BigDecimal>>,
    pub last_sale_price: Option<Option<BigDecimal>>,
    pub last_sale_date: Option<Option<Date>>,
    pub land_registry_transaction_id: Option<Option<String>>,
    pub ppd_category: Option<Option<String>>,
    pub import_id: Option<Option<Uuid>>,
}

impl Property {
    #[inline]
    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }

    /// Returns whether the property is imported market data with no owner.
    #[inline]
    pub fn is_unowned(&self) -> bool {
        self.owner_id.is_none()
    }

    /// Returns whether `account_id` manages this property.
    #[inline]
    pub fn is_owned_by(&self, account_id: Uuid) -> bool {
        self.owner_id == Some(account_id)
    }

    /// Formats the address on one line, e.g. `Flat 2, 10 Downing Street, London, SW1A 2AA`.
    pub fn address_line(&self) -> String {
        let building = match &self.street {
            Some(street) => format!("{} {}", self.paon, street),
            None => self.paon.clone(),
        };

        [
            self.saon.as_deref(),
            Some(building.as_str()),
            self.locality.as_deref(),
            Some(self.town.as_str()),
            Some(self.postcode.as_str()),
        ]
        .into_iter()
        .flatten()
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(", ")
    }

    /// Returns the outward code of the postcode, e.g. `SW1A` for `SW1A 2AA`.
    pub fn postcode_district(&self) -> &str {
        self.postcode
            .split_once(' ')
            .map_or(self.postcode.as_str(), |(outward, _)| outward)
    }
}

impl UpdateProperty {
    /// Returns whether the change touches the address columns.
    pub fn changes_address(&self) -> bool {
        self.paon.is_some()
            || self.saon.is_some()
            || self.street.is_some()
            || self.town.is_some()
            || self.postcode.is_some()
    }
}
