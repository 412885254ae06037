//! Uploaded file category enumeration.

use diesel_derive_enum::DbEnum;
#[cfg(feature = "schema")]
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

/// What an uploaded file is used for.
///
/// This enumeration corresponds to the `FILE_CATEGORY` PostgreSQL enum.
#[derive(Debug, Default, Clone, Copy, Eq, PartialEq, Hash)]
#[derive(Serialize, Deserialize, DbEnum, Display, EnumIter, EnumString)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
#[ExistingTypePath = "crate::schema::sql_types::FileCategory"]
pub enum FileCategory {
    #[db_rename = "document"]
    #[serde(rename = "document")]
    #[strum(serialize = "document")]
    Document,

    #[db_rename = "image"]
    #[serde(rename = "image")]
    #[strum(serialize = "image")]
    Image,

    #[db_rename = "floor_plan"]
    #[serde(rename = "floor_plan")]
    #[strum(serialize = "floor_plan")]
    FloorPlan,

    /// Compliance certificates such as EPC, gas safety or EICR.
    #[db_rename = "certificate"]
    #[serde(rename = "certificate")]
    #[strum(serialize = "certificate")]
    Certificate,

    #[db_rename = "contract"]
    #[serde(rename = "contract")]
    #[strum(serialize = "contract")]
    Contract,

    #[db_rename = "other"]
    #[serde(rename = "other")]
    #[strum(serialize = "other")]
    #[default]
    Other,
}
