//! Tenure enumeration.

use diesel_derive_enum::DbEnum;
#[cfg(feature = "schema")]
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

/// Legal tenure under which a property is held.
///
/// This enumeration corresponds to the `TENURE_TYPE` PostgreSQL enum and to
/// the `duration` column of the Price Paid Data (`F`, `L`, `U`).
#[derive(Debug, Default, Clone, Copy, Eq, PartialEq, Hash)]
#[derive(Serialize, Deserialize, DbEnum, Display, EnumIter, EnumString)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
#[ExistingTypePath = "crate::schema::sql_types::TenureType"]
pub enum TenureType {
    /// Freehold.
    #[db_rename = "freehold"]
    #[serde(rename = "freehold")]
    #[strum(serialize = "freehold")]
    Freehold,

    /// Leasehold, including leases of more than seven years.
    #[db_rename = "leasehold"]
    #[serde(rename = "leasehold")]
    #[strum(serialize = "leasehold")]
    Leasehold,

    /// Tenure not recorded.
    #[db_rename = "unknown"]
    #[serde(rename = "unknown")]
    #[strum(serialize = "unknown")]
    #[default]
    Unknown,
}

impl TenureType {
    /// Parses a Price Paid Data duration code.
    pub fn from_ppd_code(code: &str) -> Option<Self> {
        match code.trim() {
            "F" | "f" => Some(Self::Freehold),
            "L" | "l" => Some(Self::Leasehold),
            "U" | "u" => Some(Self::Unknown),
            _ => None,
        }
    }
}
