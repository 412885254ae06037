use bigdecimal::BigDecimal;
use uuid::Uuid;

use crate::types::{ListingStatus, PropertyType};

/// Filter for property listings. Unset fields match everything.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PropertyFilter {
    /// Only properties owned by this account.
    pub owner_id: Option<Uuid>,
    /// With `owner_id`, also match imported properties that have no owner.
    pub include_unowned: bool,
    /// Town, compared case-insensitively.
    pub town: Option<String>,
    /// Postcode prefix such as `SW1A` or `SW1A 1`.
    pub postcode_prefix: Option<String>,
    pub property_type: Option<PropertyType>,
    pub listing_status: Option<ListingStatus>,
    /// Lower bound on the asking price.
    pub min_price: Option<BigDecimal>,
    /// Upper bound on the asking price.
    pub max_price: Option<BigDecimal>,
    pub min_bedrooms: Option<i32>,
}

impl PropertyFilter {
    /// Returns the postcode prefix normalised to upper case with single spaces.
    pub fn normalized_postcode_prefix(&self) -> Option<String> {
        let prefix = self.postcode_prefix.as_deref()?.trim();
        if prefix.is_empty() {
            return None;
        }

        Some(prefix.split_whitespace().collect::<Vec<_>>().join(" ").to_uppercase())
    }
}

/// Area over which sale prices are aggregated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PropertyLocation {
    /// Outward code of a postcode, for example `SW1A`.
    PostcodeDistrict(String),
    /// Post town, compared case-insensitively.
    Town(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn postcode_prefix_is_normalised() {
        let filter = PropertyFilter {
            postcode_prefix: Some("  sw1a   1 ".into()),
            ..Default::default()
        };
        assert_eq!(filter.normalized_postcode_prefix().as_deref(), Some("SW1A 1"));

        let blank = PropertyFilter {
            postcode_prefix: Some("   ".into()),
            ..Default::default()
        };
        assert_eq!(blank.normalized_postcode_prefix(), None);
    }
}
