//! Listing status enumeration for properties.

use diesel_derive_enum::DbEnum;
#[cfg(feature = "schema")]
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

/// Market status of a property listing.
///
/// This enumeration corresponds to the `LISTING_STATUS` PostgreSQL enum.
#[derive(Debug, Default, Clone, Copy, Eq, PartialEq, Hash)]
#[derive(Serialize, Deserialize, DbEnum, Display, EnumIter, EnumString)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
#[ExistingTypePath = "crate::schema::sql_types::ListingStatus"]
pub enum ListingStatus {
    /// Not yet published.
    #[db_rename = "draft"]
    #[serde(rename = "draft")]
    #[strum(serialize = "draft")]
    #[default]
    Draft,

    /// On the market for sale or to let.
    #[db_rename = "available"]
    #[serde(rename = "available")]
    #[strum(serialize = "available")]
    Available,

    /// An offer has been accepted, sale not completed.
    #[db_rename = "under_offer"]
    #[serde(rename = "under_offer")]
    #[strum(serialize = "under_offer")]
    UnderOffer,

    /// A tenant has been agreed, tenancy not started.
    #[db_rename = "let_agreed"]
    #[serde(rename = "let_agreed")]
    #[strum(serialize = "let_agreed")]
    LetAgreed,

    /// Occupied under a tenancy.
    #[db_rename = "let"]
    #[serde(rename = "let")]
    #[strum(serialize = "let")]
    Let,

    /// Sale completed.
    #[db_rename = "sold"]
    #[serde(rename = "sold")]
    #[strum(serialize = "sold")]
    Sold,

    /// Withdrawn from the market.
    #[db_rename = "off_market"]
    #[serde(rename = "off_market")]
    #[strum(serialize = "off_market")]
    OffMarket,
}

impl ListingStatus {
    /// Returns whether the property is currently marketed.
    #[inline]
    pub fn is_on_market(self) -> bool {
        matches!(self, Self::Available | Self::UnderOffer | Self::LetAgreed)
    }
}
