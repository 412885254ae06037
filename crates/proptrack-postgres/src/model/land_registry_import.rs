//! Land Registry import job models.

use diesel::prelude::*;
use jiff_diesel::Timestamp;
use uuid::Uuid;

use crate::schema::land_registry_imports;
use crate::types::ImportStatus;

/// Persistent record of a Price Paid Data import.
///
/// Live progress is tracked in memory while the import runs; the row holds
/// the outcome once it finishes.
#[derive(Debug, Clone, PartialEq, Queryable, Selectable)]
#[diesel(table_name = land_registry_imports)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct LandRegistryImport {
    pub id: Uuid,
    /// Account that started the import; `None` for command-line imports.
    pub account_id: Option<Uuid>,
    pub file_name: String,
    pub status: ImportStatus,
    pub batch_size: i32,
    pub update_existing: bool,
    pub total_rows: i32,
    pub processed_rows: i32,
    pub inserted_rows: i32,
    pub updated_rows: i32,
    pub skipped_rows: i32,
    pub deleted_rows: i32,
    pub failed_rows: i32,
    /// JSON array of row error messages, capped in length.
    pub row_errors: serde_json::Value,
    pub failure_reason: Option<String>,
    pub started_at: Option<Timestamp>,
    pub completed_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

#[derive(Debug, Default, Clone, Insertable)]
#[diesel(table_name = land_registry_imports)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct NewLandRegistryImport {
    pub id: Uuid,
    pub account_id: Option<Uuid>,
    pub file_name: String,
    pub status: ImportStatus,
    pub batch_size: i32,
    pub update_existing: bool,
}

#[derive(Debug, Default, Clone, PartialEq, AsChangeset)]
#[diesel(table_name = land_registry_imports)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct UpdateLandRegistryImport {
    pub status: Option<ImportStatus>,
    pub total_rows: Option<i32>,
    pub processed_rows: Option<i32>,
    pub inserted_rows: Option<i32>,
    pub updated_rows: Option<i32>,
    pub skipped_rows: Option<i32>,
    pub deleted_rows: Option<i32>,
    pub failed_rows: Option<i32>,
    pub row_errors: Option<serde_json::Value>,
    pub failure_reason: Option<Option<String>>,
    pub started_at: Option<Option<Timestamp>>,
    pub completed_at: Option<Option<Timestamp>>,
}

impl LandRegistryImport {
    #[inline]
    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }

    /// Returns the stored row error messages.
    pub fn row_error_messages(&self) -> Vec<String> {
        match &self.row_errors {
            serde_json::Value::Array(values) => values
                .iter()
                .filter_map(|value| value.as_str().map(str::to_owned))
                .collect(),
            _ => Vec::new(),
        }
    }
}
