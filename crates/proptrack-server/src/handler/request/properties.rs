//! Property request types.

use bigdecimal::BigDecimal;
use proptrack_postgres::model::{NewProperty, UpdateProperty as UpdatePropertyModel};
use proptrack_postgres::types::{
    EpcRating, ListingStatus, PropertyFilter, PropertyType, TenureType,
};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use super::validations::{
    non_blank, validate_non_negative_amount, validate_positive_amount, validate_postcode,
};
use crate::service::postcode::normalize_postcode;

/// Upper-cases and re-spaces a postcode that already passed validation.
fn postcode(value: String) -> String {
    normalize_postcode(&value).unwrap_or_else(|| value.trim().to_uppercase())
}

/// Request payload for creating a property.
#[must_use]
#[derive(Debug, Default, Serialize, Deserialize, Validate, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateProperty {
    /// Friendly name such as "Riverside flat".
    #[validate(length(min = 1, max = 200))]
    pub display_name: Option<String>,
    #[validate(length(max = 5000))]
    pub description: Option<String>,

    /// Primary addressable object name: house number or name.
    #[validate(length(min = 1, max = 100))]
    pub paon: String,
    /// Secondary addressable object name, such as a flat number.
    #[validate(length(min = 1, max = 100))]
    pub saon: Option<String>,
    #[validate(length(min = 1, max = 200))]
    pub street: Option<String>,
    #[validate(length(min = 1, max = 100))]
    pub locality: Option<String>,
    #[validate(length(min = 1, max = 100))]
    pub town: String,
    #[validate(length(min = 1, max = 100))]
    pub district: Option<String>,
    #[validate(length(min = 1, max = 100))]
    pub county: Option<String>,
    /// UK postcode; stored upper-cased with a single space.
    #[validate(custom(function = "validate_postcode"))]
    pub postcode: String,

    pub property_type: PropertyType,
    #[serde(default)]
    pub tenure: Option<TenureType>,
    #[serde(default)]
    pub is_new_build: bool,
    #[validate(range(min = 0, max = 50))]
    pub bedrooms: Option<i32>,
    #[validate(range(min = 0, max = 50))]
    pub bathrooms: Option<i32>,
    #[validate(custom(function = "validate_positive_amount"))]
    pub floor_area_sqm: Option<BigDecimal>,
    pub epc_rating: Option<EpcRating>,
    pub listing_status: Option<ListingStatus>,

    #[validate(custom(function = "validate_positive_amount"))]
    pub asking_price: Option<BigDecimal>,
    #[validate(custom(function = "validate_positive_amount"))]
    pub monthly_rent: Option<BigDecimal>,
}

impl CreateProperty {
    /// Converts this request into a database model owned by `owner_id`.
    pub fn into_model(self, owner_id: Uuid) -> NewProperty {
        NewProperty {
            owner_id: Some(owner_id),
            display_name: non_blank(self.display_name),
            description: non_blank(self.description),
            paon: self.paon.trim().to_owned(),
            saon: non_blank(self.saon),
            street: non_blank(self.street),
            locality: non_blank(self.locality),
            town: self.town.trim().to_owned(),
            district: non_blank(self.district),
            county: non_blank(self.county),
            postcode: postcode(self.postcode),
            property_type: self.property_type,
            tenure: self.tenure.unwrap_or_default(),
            is_new_build: self.is_new_build,
            bedrooms: self.bedrooms,
            bathrooms: self.bathrooms,
            floor_area_sqm: self.floor_area_sqm,
            epc_rating: self.epc_rating,
            listing_status: self.listing_status.unwrap_or_default(),
            asking_price: self.asking_price,
            monthly_rent: self.monthly_rent,
            ..NewProperty::default()
        }
    }
}

/// Request payload for updating a property. Absent fields stay unchanged.
#[must_use]
#[derive(Debug, Default, Serialize, Deserialize, Validate, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProperty {
    #[validate(length(min = 1, max = 200))]
    pub display_name: Option<String>,
    #[validate(length(max = 5000))]
    pub description: Option<String>,

    #[validate(length(min = 1, max = 100))]
    pub paon: Option<String>,
    #[validate(length(min = 1, max = 100))]
    pub saon: Option<String>,
    #[validate(length(min = 1, max = 200))]
    pub street: Option<String>,
    #[validate(length(min = 1, max = 100))]
    pub locality: Option<String>,
    #[validate(length(min = 1, max = 100))]
    pub town: Option<String>,
    #[validate(length(min = 1, max = 100))]
    pub district: Option<String>,
    #[validate(length(min = 1, max = 100))]
    pub county: Option<String>,
    #[validate(custom(function = "validate_postcode"))]
    pub postcode: Option<String>,

    pub property_type: Option<PropertyType>,
    pub tenure: Option<TenureType>,
    pub is_new_build: Option<bool>,
    #[validate(range(min = 0, max = 50))]
    pub bedrooms: Option<i32>,
    #[validate(range(min = 0, max = 50))]
    pub bathrooms: Option<i32>,
    #[validate(custom(function = "validate_positive_amount"))]
    pub floor_area_sqm: Option<BigDecimal>,
    pub epc_rating: Option<EpcRating>,
    pub listing_status: Option<ListingStatus>,

    #[validate(custom(function = "validate_positive_amount"))]
    pub asking_price: Option<BigDecimal>,
    #[validate(custom(function = "validate_positive_amount"))]
    pub monthly_rent: Option<BigDecimal>,
}

impl UpdateProperty {
    /// Converts this request into a database changeset.
    pub fn into_model(self) -> UpdatePropertyModel {
        UpdatePropertyModel {
            display_name: self.display_name.map(|v| non_blank(Some(v))),
            description: self.description.map(|v| non_blank(Some(v))),
            paon: self.paon.map(|v| v.trim().to_owned()),
            saon: self.saon.map(|v| non_blank(Some(v))),
            street: self.street.map(|v| non_blank(Some(v))),
            locality: self.locality.map(|v| non_blank(Some(v))),
            town: self.town.map(|v| v.trim().to_owned()),
            district: self.district.map(|v| non_blank(Some(v))),
            county: self.county.map(|v| non_blank(Some(v))),
            postcode: self.postcode.map(postcode),
            property_type: self.property_type,
            tenure: self.tenure,
            is_new_build: self.is_new_build,
            bedrooms: self.bedrooms.map(Some),
            bathrooms: self.bathrooms.map(Some),
            floor_area_sqm: self.floor_area_sqm.map(Some),
            epc_rating: self.epc_rating.map(Some),
            listing_status: self.listing_status,
            asking_price: self.asking_price.map(Some),
            monthly_rent: self.monthly_rent.map(Some),
            ..UpdatePropertyModel::default()
        }
    }
}

/// Filters of `GET /properties/`.
#[must_use]
#[derive(Debug, Default, Clone, Serialize, Deserialize, Validate, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct PropertyQuery {
    /// Town, compared case-insensitively.
    #[validate(length(min = 1, max = 100))]
    pub town: Option<String>,
    /// Postcode prefix, e.g. `SW1A` or `M1 1`.
    #[validate(length(min = 1, max = 8))]
    pub postcode: Option<String>,
    pub property_type: Option<PropertyType>,
    pub listing_status: Option<ListingStatus>,
    #[validate(custom(function = "validate_non_negative_amount"))]
    pub min_price: Option<BigDecimal>,
    #[validate(custom(function = "validate_non_negative_amount"))]
    pub max_price: Option<BigDecimal>,
    #[validate(range(min = 0, max = 50))]
    pub min_bedrooms: Option<i32>,
    /// Owner to list; only honoured for administrators.
    pub owner_id: Option<Uuid>,
    /// Also list imported properties, which have no owner.
    #[serde(default)]
    pub include_imported: bool,
}

impl PropertyQuery {
    /// Builds the repository filter. `owner_id` of `None` lists every owner.
    pub fn into_filter(self, owner_id: Option<Uuid>) -> PropertyFilter {
        PropertyFilter {
            owner_id,
            include_unowned: self.include_imported,
            town: non_blank(self.town),
            postcode_prefix: non_blank(self.postcode),
            property_type: self.property_type,
            listing_status: self.listing_status,
            min_price: self.min_price,
            max_price: self.max_price,
            min_bedrooms: self.min_bedrooms,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn imported_properties_are_opt_in() -> anyhow::Result<()> {
        let owner_id = Uuid::new_v4();

        let filter = PropertyQuery::default().into_filter(Some(owner_id));
        assert!(!filter.include_unowned);

        let query: PropertyQuery = serde_json::from_value(serde_json::json!({
            "includeImported": true,
            "town": " "
        }))?;
        let filter = query.into_filter(Some(owner_id));
        assert!(filter.include_unowned);
        assert_eq!(filter.owner_id, Some(owner_id));
        assert_eq!(filter.town, None);
        Ok(())
    }

    fn create_request() -> CreateProperty {
        CreateProperty {
            paon: " 221B ".into(),
            street: Some("Baker Street".into()),
            saon: Some("   ".into()),
            town: "London".into(),
            postcode: "nw1 6xe".into(),
            property_type: PropertyType::FlatMaisonette,
            bedrooms: Some(2),
            ..CreateProperty::default()
        }
    }

    #[test]
    fn create_normalises_address() {
        let owner_id = Uuid::new_v4();
        let property = create_request().into_model(owner_id);

        assert_eq!(property.owner_id, Some(owner_id));
        assert_eq!(property.paon, "221B");
        assert_eq!(property.saon, None);
        assert_eq!(property.postcode, "NW1 6XE");
        assert_eq!(property.listing_status, ListingStatus::default());
        assert_eq!(property.tenure, TenureType::default());
    }

    #[test]
    fn invalid_postcode_is_rejected() {
        let request = CreateProperty {
            postcode: "NOT A POSTCODE".into(),
            ..create_request()
        };
        assert!(request.validate().is_err());
        assert!(create_request().validate().is_ok());
    }

    #[test]
    fn update_leaves_absent_fields_alone() {
        let update = UpdateProperty {
            bedrooms: Some(4),
            postcode: Some("sw1a2aa".into()),
            ..UpdateProperty::default()
        }
        .into_model();

        assert_eq!(update.bedrooms, Some(Some(4)));
        assert_eq!(update.postcode.as_deref(), Some("SW1A 2AA"));
        assert_eq!(update.town, None);
        assert_eq!(update.asking_price, None);
        assert!(update.changes_address());
    }
}
