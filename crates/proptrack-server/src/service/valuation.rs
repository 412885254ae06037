//! Property valuation and local market analysis.
//!
//! Both work from last-sale prices recorded on properties, most of which
//! come from Land Registry imports.

use bigdecimal::{BigDecimal, FromPrimitive, ToPrimitive};
use proptrack_postgres::PgConnection;
use proptrack_postgres::query::{PriceStats, PropertyRepository, PropertyTypePriceStats};
use proptrack_postgres::types::{EpcRating, PropertyLocation, PropertyType, TenureType};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use strum::Display;

use crate::Result;
use crate::service::postcode::{postcode_area, postcode_district};

const TRACING_TARGET: &str = "proptrack_server::service::valuation";

/// Comparables needed before their average replaces the national base.
pub const MIN_COMPARABLES: i64 = 3;

/// Comparables needed for a `high` confidence estimate.
pub const HIGH_CONFIDENCE_COMPARABLES: i64 = 10;

/// National average across all property types, in pounds.
pub const NATIONAL_AVERAGE_PRICE: i64 = 285_000;

const BEDROOM_ADJUSTMENT_PERCENT: f64 = 8.0;
const BASELINE_BEDROOMS: i32 = 3;
const NEW_BUILD_PERCENT: f64 = 5.0;
const LEASEHOLD_PERCENT: f64 = -5.0;
const EFFICIENT_EPC_PERCENT: f64 = 3.0;
const INEFFICIENT_EPC_PERCENT: f64 = -4.0;
const RANGE_PERCENT: f64 = 10.0;
const ROUND_TO: f64 = 1000.0;

/// Postcode areas grouped by price level.
const LOCATION_MULTIPLIERS: &[(&[&str], f64)] = &[
    (&["EC", "WC", "W", "SW"], 2.2),
    (&["E", "N", "NW", "SE"], 1.6),
    (
        &["BR", "CR", "DA", "EN", "HA", "IG", "KT", "RM", "SM", "TW", "UB"],
        1.4,
    ),
    (
        &["AL", "BN", "CB", "GU", "HP", "OX", "RG", "RH", "SL", "WD"],
        1.3,
    ),
    (&["BA", "BS", "CM", "CT", "ME", "MK", "PO", "SG", "SO", "TN"], 1.1),
    (&["B", "CV", "LE", "LS", "M", "NG", "NR", "WR", "YO"], 0.9),
    (
        &["BB", "BD", "BL", "CA", "DH", "DL", "DN", "HD", "HU", "HX", "L", "NE", "OL", "S", "SR", "ST", "TS", "WF", "WN"],
        0.75,
    ),
    (&["CF", "LL", "NP", "SA", "SY"], 0.8),
];

/// National base price for a property type, in pounds.
pub fn national_base_price(property_type: PropertyType) -> i64 {
    match property_type {
        PropertyType::Detached => 450_000,
        PropertyType::SemiDetached => 290_000,
        PropertyType::Terraced => 255_000,
        PropertyType::FlatMaisonette => 225_000,
        PropertyType::Other => 265_000,
    }
}

/// Price multiplier of a postcode area such as `SW` or `M`. Unknown areas are `1.0`.
pub fn location_multiplier(area: &str) -> f64 {
    let area = area.to_ascii_uppercase();
    LOCATION_MULTIPLIERS
        .iter()
        .find(|(areas, _)| areas.contains(&area.as_str()))
        .map_or(1.0, |(_, multiplier)| *multiplier)
}

/// How much an estimate can be trusted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema, Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Confidence {
    High,
    Medium,
    Low,
}

impl Confidence {
    pub fn from_comparables(count: i64) -> Self {
        match count {
            c if c >= HIGH_CONFIDENCE_COMPARABLES => Self::High,
            c if c >= MIN_COMPARABLES => Self::Medium,
            _ => Self::Low,
        }
    }
}

/// Where an estimate's base price came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum BasePriceSource {
    /// Average last sale of comparable properties.
    Comparables,
    /// National base price scaled by the location multiplier.
    NationalAverage,
}

/// Property characteristics to value.
#[derive(Debug, Clone, PartialEq)]
pub struct ValuationInput {
    /// Full postcode or postcode district.
    pub postcode: String,
    pub property_type: PropertyType,
    pub bedrooms: Option<i32>,
    pub is_new_build: bool,
    pub tenure: TenureType,
    pub epc_rating: Option<EpcRating>,
}

/// One percentage adjustment applied to the base price.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ValuationAdjustment {
    pub factor: String,
    pub percentage: f64,
}

/// Estimated value of a property.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ValuationEstimate {
    pub estimated_value: BigDecimal,
    pub range_low: BigDecimal,
    pub range_high: BigDecimal,
    pub base_price: BigDecimal,
    pub base_price_source: BasePriceSource,
    pub location_multiplier: f64,
    pub adjustments: Vec<ValuationAdjustment>,
    pub postcode_district: String,
    pub comparables: i64,
    pub confidence: Confidence,
}

/// Position of local prices against the national base.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum MarketIndicator {
    /// At least 20% above.
    Premium,
    /// 5% to 20% above.
    AboveAverage,
    /// Within 5%.
    Average,
    /// More than 5% below.
    BelowAverage,
    /// No recorded sales.
    InsufficientData,
}

impl MarketIndicator {
    fn from_ratio(ratio: f64) -> Self {
        match ratio {
            r if r >= 1.2 => Self::Premium,
            r if r >= 1.05 => Self::AboveAverage,
            r if r > 0.95 => Self::Average,
            _ => Self::BelowAverage,
        }
    }
}

/// Sale prices of one property type in the analysed area.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct PropertyTypeBreakdown {
    pub property_type: PropertyType,
    pub count: i64,
    pub average_price: Option<BigDecimal>,
}

impl From<PropertyTypePriceStats> for PropertyTypeBreakdown {
    fn from(stats: PropertyTypePriceStats) -> Self {
        Self {
            property_type: stats.property_type,
            count: stats.count,
            average_price: stats.average.map(round_to_pound),
        }
    }
}

/// Sale prices in a postcode district or town.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct MarketAnalysis {
    /// District or town the figures cover.
    pub location: String,
    pub property_type: Option<PropertyType>,
    pub sales_count: i64,
    pub average_price: Option<BigDecimal>,
    pub min_price: Option<BigDecimal>,
    pub max_price: Option<BigDecimal>,
    pub national_base_price: BigDecimal,
    /// Average price over the national base, as a percentage difference.
    pub difference_from_national_percent: Option<f64>,
    pub market_indicator: MarketIndicator,
    pub by_property_type: Vec<PropertyTypeBreakdown>,
}

fn round_to_pound(value: BigDecimal) -> BigDecimal {
    value.round(0)
}

fn round_to_thousand(value: f64) -> BigDecimal {
    let rounded = (value / ROUND_TO).round() * ROUND_TO;
    BigDecimal::from_f64(rounded).unwrap_or_default().round(0)
}

/// Valuation estimates and market analysis.
#[derive(Debug, Clone, Copy, Default)]
pub struct ValuationService;

impl ValuationService {
    pub fn new() -> Self {
        Self
    }

    /// Values `input` against sale statistics of comparable properties.
    ///
    /// Returns `None` if the postcode is not a valid postcode or district.
    pub fn estimate(&self, input: &ValuationInput, comparables: &PriceStats) -> Option<ValuationEstimate> {
        let district = postcode_district(&input.postcode)?;
        let area = postcode_area(&district);

        let comparable_average = comparables
            .average
            .as_ref()
            .filter(|_| comparables.count >= MIN_COMPARABLES)
            .and_then(ToPrimitive::to_f64);

        // Local sale prices already carry the location premium.
        let (base_price, source, multiplier) = match comparable_average {
            Some(average) => (average, BasePriceSource::Comparables, 1.0),
            None => (
                national_base_price(input.property_type) as f64,
                BasePriceSource::NationalAverage,
                location_multiplier(&area),
            ),
        };

        let adjustments = Self::adjustments(input);
        let total_percent: f64 = adjustments.iter().map(|a| a.percentage).sum();
        let value = base_price * multiplier * (1.0 + total_percent / 100.0);

        let estimate = ValuationEstimate {
            estimated_value: round_to_thousand(value),
            range_low: round_to_thousand(value * (1.0 - RANGE_PERCENT / 100.0)),
            range_high: round_to_thousand(value * (1.0 + RANGE_PERCENT / 100.0)),
            base_price: round_to_thousand(base_price),
            base_price_source: source,
            location_multiplier: multiplier,
            adjustments,
            postcode_district: district,
            comparables: comparables.count,
            confidence: Confidence::from_comparables(comparables.count),
        };

        Some(estimate)
    }

    fn adjustments(input: &ValuationInput) -> Vec<ValuationAdjustment> {
        let mut adjustments = Vec::new();
        let mut push = |factor: &str, percentage: f64| {
            if percentage != 0.0 {
                adjustments.push(ValuationAdjustment {
                    factor: factor.to_owned(),
                    percentage,
                });
            }
        };

        if let Some(bedrooms) = input.bedrooms {
            let difference = bedrooms - BASELINE_BEDROOMS;
            push("bedrooms", f64::from(difference) * BEDROOM_ADJUSTMENT_PERCENT);
        }
        if input.is_new_build {
            push("new_build", NEW_BUILD_PERCENT);
        }
        if input.tenure == TenureType::Leasehold {
            push("leasehold", LEASEHOLD_PERCENT);
        }
        match input.epc_rating {
            Some(EpcRating::A | EpcRating::B) => push("epc_rating", EFFICIENT_EPC_PERCENT),
            Some(EpcRating::F | EpcRating::G) => push("epc_rating", INEFFICIENT_EPC_PERCENT),
            _ => {}
        }

        adjustments
    }

    /// Summarises sale statistics of `location`.
    pub fn analyse(
        &self,
        location: &PropertyLocation,
        property_type: Option<PropertyType>,
        stats: PriceStats,
        by_type: Vec<PropertyTypePriceStats>,
    ) -> MarketAnalysis {
        let national = property_type.map_or(NATIONAL_AVERAGE_PRICE, national_base_price);

        let ratio = stats
            .average
            .as_ref()
            .filter(|_| stats.count > 0)
            .and_then(ToPrimitive::to_f64)
            .map(|average| average / national as f64);

        let location = match location {
            PropertyLocation::PostcodeDistrict(district) => district.clone(),
            PropertyLocation::Town(town) => town.to_uppercase(),
        };

        MarketAnalysis {
            location,
            property_type,
            sales_count: stats.count,
            average_price: stats.average.map(round_to_pound),
            min_price: stats.min,
            max_price: stats.max,
            national_base_price: BigDecimal::from(national),
            difference_from_national_percent: ratio
                .map(|ratio| ((ratio - 1.0) * 1000.0).round() / 10.0),
            market_indicator: ratio.map_or(MarketIndicator::InsufficientData, MarketIndicator::from_ratio),
            by_property_type: by_type.into_iter().map(Into::into).collect(),
        }
    }

    /// Loads comparables for `input` and values it.
    pub async fn estimate_property(
        &self,
        conn: &mut PgConnection,
        input: &ValuationInput,
    ) -> Result<Option<ValuationEstimate>> {
        let Some(district) = postcode_district(&input.postcode) else {
            return Ok(None);
        };

        let location = PropertyLocation::PostcodeDistrict(district);
        let comparables = conn
            .property_price_stats(&location, Some(input.property_type))
            .await?;

        let estimate = self.estimate(input, &comparables);
        if let Some(estimate) = &estimate {
            tracing::debug!(
                target: TRACING_TARGET,
                district = %estimate.postcode_district,
                comparables = estimate.comparables,
                confidence = %estimate.confidence,
                "property valued"
            );
        }

        Ok(estimate)
    }

    /// Loads sale statistics of `location` and summarises them.
    pub async fn market_analysis(
        &self,
        conn: &mut PgConnection,
        location: PropertyLocation,
        property_type: Option<PropertyType>,
    ) -> Result<MarketAnalysis> {
        let stats = conn.property_price_stats(&location, property_type).await?;
        let by_type = conn.property_price_stats_by_type(&location).await?;

        tracing::debug!(target: TRACING_TARGET, sales = stats.count, "market analysed");
        Ok(self.analyse(&location, property_type, stats, by_type))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input() -> ValuationInput {
        ValuationInput {
            postcode: "M1 1AE".into(),
            property_type: PropertyType::Terraced,
            bedrooms: Some(3),
            is_new_build: false,
            tenure: TenureType::Freehold,
            epc_rating: None,
        }
    }

    fn stats(count: i64, average: i64) -> PriceStats {
        PriceStats {
            count,
            average: Some(BigDecimal::from(average)),
            min: Some(BigDecimal::from(average / 2)),
            max: Some(BigDecimal::from(average * 2)),
        }
    }

    #[test]
    fn few_comparables_fall_back_to_national_base() -> anyhow::Result<()> {
        let input = ValuationInput {
            property_type: PropertyType::Detached,
            ..input()
        };
        let estimate = ValuationService::new()
            .estimate(&input, &stats(2, 999_000))
            .ok_or_else(|| anyhow::anyhow!("postcode should be valid"))?;

        // 450,000 * 0.9 for Manchester.
        assert_eq!(estimate.base_price_source, BasePriceSource::NationalAverage);
        assert_eq!(estimate.estimated_value, BigDecimal::from(405_000));
        assert_eq!(estimate.confidence, Confidence::Low);
        assert_eq!(estimate.postcode_district, "M1");
        Ok(())
    }

    #[test]
    fn comparables_set_the_base_price() -> anyhow::Result<()> {
        let estimate = ValuationService::new()
            .estimate(&input(), &stats(12, 300_000))
            .ok_or_else(|| anyhow::anyhow!("postcode should be valid"))?;

        assert_eq!(estimate.base_price_source, BasePriceSource::Comparables);
        assert_eq!(estimate.location_multiplier, 1.0);
        assert_eq!(estimate.estimated_value, BigDecimal::from(300_000));
        assert_eq!(estimate.range_low, BigDecimal::from(270_000));
        assert_eq!(estimate.range_high, BigDecimal::from(330_000));
        assert_eq!(estimate.confidence, Confidence::High);
        assert!(estimate.adjustments.is_empty());
        Ok(())
    }

    #[test]
    fn adjustments_are_summed() -> anyhow::Result<()> {
        let input = ValuationInput {
            bedrooms: Some(5),
            is_new_build: true,
            tenure: TenureType::Leasehold,
            epc_rating: Some(EpcRating::B),
            ..input()
        };

        let estimate = ValuationService::new()
            .estimate(&input, &stats(5, 200_000))
            .ok_or_else(|| anyhow::anyhow!("postcode should be valid"))?;

        // +16% bedrooms, +5% new build, -5% leasehold, +3% EPC.
        assert_eq!(estimate.adjustments.len(), 4);
        assert_eq!(estimate.estimated_value, BigDecimal::from(238_000));
        assert_eq!(estimate.confidence, Confidence::Medium);
        Ok(())
    }

    #[test]
    fn invalid_postcode_has_no_estimate() {
        let input = ValuationInput {
            postcode: "NOWHERE".into(),
            ..input()
        };
        assert!(ValuationService::new().estimate(&input, &PriceStats::default()).is_none());
    }

    #[test]
    fn location_multipliers() {
        assert_eq!(location_multiplier("SW"), 2.2);
        assert_eq!(location_multiplier("rg"), 1.3);
        assert_eq!(location_multiplier("ZE"), 1.0);
    }

    #[test]
    fn market_indicator_follows_national_base() {
        let service = ValuationService::new();
        let location = PropertyLocation::PostcodeDistrict("SW1A".into());

        let analysis = service.analyse(&location, Some(PropertyType::Detached), stats(4, 900_000), Vec::new());
        assert_eq!(analysis.market_indicator, MarketIndicator::Premium);
        assert_eq!(analysis.difference_from_national_percent, Some(100.0));

        let empty = service.analyse(&location, None, PriceStats::default(), Vec::new());
        assert_eq!(empty.market_indicator, MarketIndicator::InsufficientData);
        assert_eq!(empty.national_base_price, BigDecimal::from(NATIONAL_AVERAGE_PRICE));
    }
}
