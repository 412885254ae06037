//! Energy Performance Certificate rating.

use diesel_derive_enum::DbEnum;
#[cfg(feature = "schema")]
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

/// EPC energy-efficiency band, from `A` (most efficient) to `G`.
///
/// This enumeration corresponds to the `EPC_RATING` PostgreSQL enum.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, PartialOrd, Ord)]
#[derive(Serialize, Deserialize, DbEnum, Display, EnumIter, EnumString)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
#[ExistingTypePath = "crate::schema::sql_types::EpcRating"]
#[strum(ascii_case_insensitive)]
pub enum EpcRating {
    #[db_rename = "a"]
    #[serde(rename = "A", alias = "a")]
    #[strum(serialize = "A")]
    A,
    #[db_rename = "b"]
    #[serde(rename = "B", alias = "b")]
    #[strum(serialize = "B")]
    B,
    #[db_rename = "c"]
    #[serde(rename = "C", alias = "c")]
    #[strum(serialize = "C")]
    C,
    #[db_rename = "d"]
    #[serde(rename = "D", alias = "d")]
    #[strum(serialize = "D")]
    D,
    #[db_rename = "e"]
    #[serde(rename = "E", alias = "e")]
    #[strum(serialize = "E")]
    E,
    #[db_rename = "f"]
    #[serde(rename = "F", alias = "f")]
    #[strum(serialize = "F")]
    F,
    #[db_rename = "g"]
    #[serde(rename = "G", alias = "g")]
    #[strum(serialize = "G")]
    G,
}

impl EpcRating {
    /// Minimum band a privately rented home must reach (Minimum Energy
    /// Efficiency Standards).
    pub const MINIMUM_FOR_LETTING: Self = Self::E;

    /// Returns whether a property with this rating may be let.
    #[inline]
    pub fn meets_letting_standard(self) -> bool {
        self <= Self::MINIMUM_FOR_LETTING
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bands_are_ordered_best_first() {
        assert!(EpcRating::A < EpcRating::G);
        assert!(EpcRating::E.meets_letting_standard());
        assert!(!EpcRating::F.meets_letting_standard());
    }

    #[test]
    fn parses_either_case() {
        assert_eq!("c".parse::<EpcRating>().unwrap(), EpcRating::C);
        assert_eq!("C".parse::<EpcRating>().unwrap(), EpcRating::C);
    }
}
