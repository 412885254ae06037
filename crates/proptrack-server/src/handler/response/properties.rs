//! Property response types.

use bigdecimal::BigDecimal;
use jiff::Timestamp;
use jiff::civil::Date;
use proptrack_postgres::model;
use proptrack_postgres::types::{EpcRating, ListingStatus, PropertyType, TenureType};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Postal address of a property, in Price Paid Data terms.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct PropertyAddress {
    /// House number or name.
    pub paon: String,
    /// Flat or unit within the building.
    pub saon: Option<String>,
    pub street: Option<String>,
    pub locality: Option<String>,
    pub town: String,
    pub district: Option<String>,
    pub county: Option<String>,
    pub postcode: String,
    /// The address on a single line.
    pub formatted: String,
}

/// Most recent recorded sale.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct PropertySale {
    pub price: BigDecimal,
    pub date: Option<Date>,
    /// Land Registry transaction identifier, when imported.
    pub transaction_id: Option<String>,
}

/// Represents a property.
#[must_use]
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Property {
    pub property_id: Uuid,
    /// Owning account; absent for records created by an import.
    pub owner_id: Option<Uuid>,
    pub display_name: Option<String>,
    pub description: Option<String>,
    pub address: PropertyAddress,

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
    pub last_sale: Option<PropertySale>,
    /// Import that created or last updated the record.
    pub import_id: Option<Uuid>,

    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Property {
    pub fn from_model(property: model::Property) -> Self {
        let formatted = property.address_line();
        let last_sale = property.last_sale_price.map(|price| PropertySale {
            price,
            date: property.last_sale_date.map(Into::into),
            transaction_id: property.land_registry_transaction_id,
        });

        Self {
            property_id: property.id,
            owner_id: property.owner_id,
            display_name: property.display_name,
            description: property.description,
            address: PropertyAddress {
                paon: property.paon,
                saon: property.saon,
                street: property.street,
                locality: property.locality,
                town: property.town,
                district: property.district,
                county: property.county,
                postcode: property.postcode,
                formatted,
            },

            property_type: property.property_type,
            tenure: property.tenure,
            is_new_build: property.is_new_build,
            bedrooms: property.bedrooms,
            bathrooms: property.bathrooms,
            floor_area_sqm: property.floor_area_sqm,
            epc_rating: property.epc_rating,

            listing_status: property.listing_status,
            asking_price: property.asking_price,
            monthly_rent: property.monthly_rent,
            last_sale,
            import_id: property.import_id,

            created_at: property.created_at.into(),
            updated_at: property.updated_at.into(),
        }
    }
}

/// Paginated list of properties.
pub type PropertiesPage = super::Page<Property>;
