//! Valuation request types.

use proptrack_postgres::types::{EpcRating, PropertyLocation, PropertyType, TenureType};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use super::validations::{non_blank, validation_error};
use crate::service::postcode::postcode_district;
use crate::service::valuation::ValuationInput;

/// Accepts a full postcode or an outward code on its own.
fn validate_postcode_or_district(value: &str) -> Result<(), ValidationError> {
    match postcode_district(value) {
        Some(_) => Ok(()),
        None => Err(validation_error(
            "postcode",
            "Must be a UK postcode or postcode district",
        )),
    }
}

/// Request payload of `POST /valuations/estimate/`.
#[must_use]
#[derive(Debug, Clone, Serialize, Deserialize, Validate, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct EstimateValuation {
    /// Full postcode or postcode district, e.g. `M1 1AE` or `M1`.
    #[validate(custom(function = "validate_postcode_or_district"))]
    pub postcode: String,
    pub property_type: PropertyType,
    #[validate(range(min = 0, max = 50))]
    pub bedrooms: Option<i32>,
    #[serde(default)]
    pub is_new_build: bool,
    #[serde(default)]
    pub tenure: TenureType,
    pub epc_rating: Option<EpcRating>,
}

impl From<EstimateValuation> for ValuationInput {
    fn from(request: EstimateValuation) -> Self {
        Self {
            postcode: request.postcode,
            property_type: request.property_type,
            bedrooms: request.bedrooms,
            is_new_build: request.is_new_build,
            tenure: request.tenure,
            epc_rating: request.epc_rating,
        }
    }
}

/// Query of `GET /valuations/market-analysis/`.
///
/// One of `postcode` and `town` is required; the postcode wins when both
/// are given.
#[must_use]
#[derive(Debug, Default, Clone, Serialize, Deserialize, Validate, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct MarketAnalysisQuery {
    /// Full postcode or postcode district.
    #[validate(custom(function = "validate_postcode_or_district"))]
    pub postcode: Option<String>,
    #[validate(length(min = 1, max = 100))]
    pub town: Option<String>,
    pub property_type: Option<PropertyType>,
}

impl MarketAnalysisQuery {
    /// Area to analyse, or `None` when neither postcode nor town is given.
    pub fn location(&self) -> Option<PropertyLocation> {
        if let Some(district) = self.postcode.as_deref().and_then(postcode_district) {
            return Some(PropertyLocation::PostcodeDistrict(district));
        }

        non_blank(self.town.clone()).map(PropertyLocation::Town)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn postcode_wins_over_town() {
        let query = MarketAnalysisQuery {
            postcode: Some("sw1a 1aa".into()),
            town: Some("London".into()),
            property_type: None,
        };
        assert_eq!(
            query.location(),
            Some(PropertyLocation::PostcodeDistrict("SW1A".into()))
        );
    }

    #[test]
    fn town_alone_is_enough() {
        let query = MarketAnalysisQuery {
            town: Some(" Leeds ".into()),
            ..MarketAnalysisQuery::default()
        };
        assert_eq!(query.location(), Some(PropertyLocation::Town("Leeds".into())));
        assert_eq!(MarketAnalysisQuery::default().location(), None);
    }

    #[test]
    fn district_is_a_valid_estimate_postcode() {
        let request = EstimateValuation {
            postcode: "M1".into(),
            property_type: PropertyType::Terraced,
            bedrooms: Some(3),
            is_new_build: false,
            tenure: TenureType::Freehold,
            epc_rating: None,
        };
        assert!(request.validate().is_ok());

        let invalid = EstimateValuation {
            postcode: "12345".into(),
            ..request
        };
        assert!(invalid.validate().is_err());
    }
}
