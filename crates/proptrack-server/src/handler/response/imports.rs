//! Land Registry import response types.

use jiff::Timestamp;
use proptrack_postgres::model::LandRegistryImport;
use proptrack_postgres::types::ImportStatus;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::service::import::TrackedImport;

/// Row counters of an import.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ImportProgress {
    /// Data lines read so far, header excluded.
    pub total_rows: u64,
    pub processed_rows: u64,
    pub inserted_rows: u64,
    pub updated_rows: u64,
    pub skipped_rows: u64,
    pub deleted_rows: u64,
    pub failed_rows: u64,
}

/// Represents a Land Registry import.
///
/// While the import runs, counters come from the live tracker; once it
/// finishes they come from the stored row.
#[must_use]
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Import {
    pub import_id: Uuid,
    pub file_name: String,
    pub status: ImportStatus,
    pub batch_size: i32,
    pub update_existing: bool,
    pub progress: ImportProgress,
    /// `row N: ...` messages for rejected lines.
    pub row_errors: Vec<String>,
    pub failure_reason: Option<String>,
    pub started_at: Option<Timestamp>,
    pub completed_at: Option<Timestamp>,
    pub created_at: Timestamp,
}

fn counter(value: i32) -> u64 {
    u64::try_from(value).unwrap_or_default()
}

impl Import {
    pub fn from_model(import: LandRegistryImport) -> Self {
        let row_errors = import.row_error_messages();
        Self {
            import_id: import.id,
            file_name: import.file_name,
            status: import.status,
            batch_size: import.batch_size,
            update_existing: import.update_existing,
            progress: ImportProgress {
                total_rows: counter(import.total_rows),
                processed_rows: counter(import.processed_rows),
                inserted_rows: counter(import.inserted_rows),
                updated_rows: counter(import.updated_rows),
                skipped_rows: counter(import.skipped_rows),
                deleted_rows: counter(import.deleted_rows),
                failed_rows: counter(import.failed_rows),
            },
            row_errors,
            failure_reason: import.failure_reason,
            started_at: import.started_at.map(Into::into),
            completed_at: import.completed_at.map(Into::into),
            created_at: import.created_at.into(),
        }
    }

    /// Stored row overlaid with the tracker's live state.
    ///
    /// A row that is already terminal wins over the tracker.
    pub fn with_tracked(import: LandRegistryImport, tracked: Option<TrackedImport>) -> Self {
        let is_terminal = import.is_terminal();
        let mut response = Self::from_model(import);

        let Some(tracked) = tracked.filter(|_| !is_terminal) else {
            return response;
        };

        let summary = tracked.summary;
        response.status = tracked.status;
        response.started_at = response.started_at.or(Some(tracked.started_at));
        response.progress = ImportProgress {
            total_rows: summary.total_rows,
            processed_rows: summary.processed_rows,
            inserted_rows: summary.inserted_rows,
            updated_rows: summary.updated_rows,
            skipped_rows: summary.skipped_rows,
            deleted_rows: summary.deleted_rows,
            failed_rows: summary.failed_rows,
        };
        response.row_errors = summary.row_errors;
        response
    }
}

/// Paginated list of imports.
pub type ImportsPage = super::Page<Import>;

#[cfg(test)]
mod tests {
    use jiff::Timestamp;

    use super::*;
    use crate::service::import::ImportTracker;

    fn import_row(status: ImportStatus) -> LandRegistryImport {
        let now = Timestamp::now();
        LandRegistryImport {
            id: Uuid::now_v7(),
            account_id: None,
            file_name: "pp-2024.csv".to_owned(),
            status,
            batch_size: 500,
            update_existing: true,
            total_rows: 10,
            processed_rows: 10,
            inserted_rows: 7,
            updated_rows: 1,
            skipped_rows: 0,
            deleted_rows: 0,
            failed_rows: 2,
            row_errors: serde_json::json!(["row 3: invalid price", "row 8: invalid date"]),
            failure_reason: None,
            started_at: Some(now.into()),
            completed_at: Some(now.into()),
            created_at: now.into(),
            updated_at: now.into(),
        }
    }

    #[test]
    fn stored_counters_are_reported() {
        let import = Import::from_model(import_row(ImportStatus::Completed));
        assert_eq!(import.progress.inserted_rows, 7);
        assert_eq!(import.progress.failed_rows, 2);
        assert_eq!(import.row_errors.len(), 2);
    }

    #[tokio::test]
    async fn live_progress_overrides_pending_row() -> anyhow::Result<()> {
        let row = import_row(ImportStatus::Pending);
        let tracker = ImportTracker::new();
        tracker.register(row.id, None, "pp-2024.csv").await;
        tracker.set_status(row.id, ImportStatus::Processing).await;

        let tracked = tracker.get(row.id).await;
        let import = Import::with_tracked(row, tracked);

        assert_eq!(import.status, ImportStatus::Processing);
        assert_eq!(import.progress, ImportProgress::default());
        Ok(())
    }

    #[tokio::test]
    async fn terminal_row_ignores_tracker() -> anyhow::Result<()> {
        let row = import_row(ImportStatus::Completed);
        let tracker = ImportTracker::new();
        tracker.register(row.id, None, "pp-2024.csv").await;

        let tracked = tracker.get(row.id).await;
        let import = Import::with_tracked(row, tracked);

        assert_eq!(import.status, ImportStatus::Completed);
        assert_eq!(import.progress.inserted_rows, 7);
        Ok(())
    }
}
