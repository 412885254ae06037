//! Bulk import job status enumeration.

use diesel_derive_enum::DbEnum;
#[cfg(feature = "schema")]
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

/// Status of a Land Registry import job.
///
/// This enumeration corresponds to the `IMPORT_STATUS` PostgreSQL enum.
#[derive(Debug, Default, Clone, Copy, Eq, PartialEq, Hash)]
#[derive(Serialize, Deserialize, DbEnum, Display, EnumIter, EnumString)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
#[ExistingTypePath = "crate::schema::sql_types::ImportStatus"]
pub enum ImportStatus {
    /// Accepted, waiting for the worker to start.
    #[db_rename = "pending"]
    #[serde(rename = "pending")]
    #[strum(serialize = "pending")]
    #[default]
    Pending,

    /// Rows are being read and written.
    #[db_rename = "processing"]
    #[serde(rename = "processing")]
    #[strum(serialize = "processing")]
    Processing,

    /// All rows were processed and the changes committed.
    #[db_rename = "completed"]
    #[serde(rename = "completed")]
    #[strum(serialize = "completed")]
    Completed,

    /// An unexpected error aborted the import; nothing was committed.
    #[db_rename = "failed"]
    #[serde(rename = "failed")]
    #[strum(serialize = "failed")]
    Failed,

    /// Cancelled on request; nothing was committed.
    #[db_rename = "cancelled"]
    #[serde(rename = "cancelled")]
    #[strum(serialize = "cancelled")]
    Cancelled,
}

impl ImportStatus {
    /// Returns whether the import has finished, successfully or not.
    #[inline]
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Failed | Self::Cancelled)
    }

    /// Returns whether the import can still be cancelled.
    #[inline]
    pub fn is_cancellable(self) -> bool {
        !self.is_terminal()
    }
}
