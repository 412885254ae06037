//! Property type enumeration mirroring the Price Paid Data classification.

use diesel_derive_enum::DbEnum;
#[cfg(feature = "schema")]
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

/// Built form of a property.
///
/// This enumeration corresponds to the `PROPERTY_TYPE` PostgreSQL enum. The
/// variants match the single-letter codes used by HM Land Registry in the
/// Price Paid Data (`D`, `S`, `T`, `F`, `O`).
#[derive(Debug, Default, Clone, Copy, Eq, PartialEq, Hash)]
#[derive(Serialize, Deserialize, DbEnum, Display, EnumIter, EnumString)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
#[ExistingTypePath = "crate::schema::sql_types::PropertyType"]
pub enum PropertyType {
    /// Detached house.
    #[db_rename = "detached"]
    #[serde(rename = "detached")]
    #[strum(serialize = "detached")]
    Detached,

    /// Semi-detached house.
    #[db_rename = "semi_detached"]
    #[serde(rename = "semi_detached")]
    #[strum(serialize = "semi_detached")]
    SemiDetached,

    /// Terraced house.
    #[db_rename = "terraced"]
    #[serde(rename = "terraced")]
    #[strum(serialize = "terraced")]
    Terraced,

    /// Flat or maisonette.
    #[db_rename = "flat_maisonette"]
    #[serde(rename = "flat_maisonette")]
    #[strum(serialize = "flat_maisonette")]
    FlatMaisonette,

    /// Anything else, including commercial and mixed-use premises.
    #[db_rename = "other"]
    #[serde(rename = "other")]
    #[strum(serialize = "other")]
    #[default]
    Other,
}

impl PropertyType {
    /// Parses a Price Paid Data property type code.
    pub fn from_ppd_code(code: &str) -> Option<Self> {
        match code.trim() {
            "D" | "d" => Some(Self::Detached),
            "S" | "s" => Some(Self::SemiDetached),
            "T" | "t" => Some(Self::Terraced),
            "F" | "f" => Some(Self::FlatMaisonette),
            "O" | "o" => Some(Self::Other),
            _ => None,
        }
    }

    /// Returns the Price Paid Data code of this property type.
    pub fn ppd_code(self) -> &'static str {
        match self {
            Self::Detached => "D",
            Self::SemiDetached => "S",
            Self::Terraced => "T",
            Self::FlatMaisonette => "F",
            Self::Other => "O",
        }
    }

    /// Returns whether this is a house (as opposed to a flat or other premises).
    #[inline]
    pub fn is_house(self) -> bool {
        matches!(self, Self::Detached | Self::SemiDetached | Self::Terraced)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ppd_codes_map_both_ways() {
        for code in ["D", "S", "T", "F", "O"] {
            let property_type = PropertyType::from_ppd_code(code).unwrap();
            assert_eq!(property_type.ppd_code(), code);
        }
    }

    #[test]
    fn unknown_ppd_code_is_rejected() {
        assert_eq!(PropertyType::from_ppd_code("X"), None);
        assert_eq!(PropertyType::from_ppd_code(""), None);
    }

    #[test]
    fn serializes_as_snake_case() {
        let json = serde_json::to_string(&PropertyType::SemiDetached).unwrap();
        assert_eq!(json, "\"semi_detached\"");
        assert_eq!(
            "flat_maisonette".parse::<PropertyType>().unwrap(),
            PropertyType::FlatMaisonette
        );
    }
}
