//! HM Land Registry Price Paid Data import.
//!
//! A CSV file is streamed through [`PricePaidReader`], each row is
//! validated into a [`PricePaidRecord`], and valid records are upserted in
//! batches by an [`ImportPipeline`]. [`ImportJob`] runs the pipeline inside
//! a single database transaction and keeps the `land_registry_imports` row
//! and the [`ImportTracker`] in step with it.

mod error;
mod pipeline;
mod reader;
mod record;
mod tracker;
mod writer;

use std::fs::File;
use std::io::{Cursor, Read};
use std::path::PathBuf;

use bytes::Bytes;
use jiff::Timestamp;
use proptrack_postgres::PgClient;
use proptrack_postgres::model::{
    LandRegistryImport, NewLandRegistryImport, UpdateLandRegistryImport,
};
use proptrack_postgres::query::LandRegistryImportRepository;
use proptrack_postgres::types::ImportStatus;
use tokio::task::JoinHandle;
use uuid::Uuid;

pub use self::error::{ImportError, ImportResult};
pub use self::pipeline::{
    DEFAULT_BATCH_SIZE, DEFAULT_MAX_ROW_ERRORS, ImportOptions, ImportPipeline, ImportSummary,
    MAX_BATCH_SIZE,
};
pub use self::reader::{PRICE_PAID_COLUMNS, PricePaidReader, ReadRow};
pub use self::record::{PpdCategory, PricePaidRecord, PricePaidRow, RecordStatus, RowErrors};
pub use self::tracker::{FINISHED_RETENTION, ImportTracker, TrackedImport};
pub use self::writer::{ImportWriter, UpsertAction, UpsertOutcome};

const TRACING_TARGET: &str = "proptrack_server::service::import";

/// CSV data of an import.
#[derive(Debug, Clone)]
pub enum ImportSource {
    /// An upload held in memory.
    Bytes(Bytes),
    /// A local file, read in chunks while the import runs.
    File(PathBuf),
}

impl ImportSource {
    fn open(&self) -> ImportResult<Box<dyn Read + Send>> {
        match self {
            Self::Bytes(data) => Ok(Box::new(Cursor::new(data.clone()))),
            Self::File(path) => Ok(Box::new(File::open(path)?)),
        }
    }

    /// Size in bytes, when known up front.
    pub fn byte_len(&self) -> Option<u64> {
        match self {
            Self::Bytes(data) => Some(data.len() as u64),
            Self::File(path) => std::fs::metadata(path).ok().map(|meta| meta.len()),
        }
    }
}

impl From<Bytes> for ImportSource {
    fn from(data: Bytes) -> Self {
        Self::Bytes(data)
    }
}

fn saturating_i32(value: u64) -> i32 {
    i32::try_from(value).unwrap_or(i32::MAX)
}

impl ImportSummary {
    /// Changeset writing the final state of an import.
    pub fn to_final_update(
        &self,
        status: ImportStatus,
        failure_reason: Option<String>,
    ) -> UpdateLandRegistryImport {
        UpdateLandRegistryImport {
            status: Some(status),
            total_rows: Some(saturating_i32(self.total_rows)),
            processed_rows: Some(saturating_i32(self.processed_rows)),
            inserted_rows: Some(saturating_i32(self.inserted_rows)),
            updated_rows: Some(saturating_i32(self.updated_rows)),
            skipped_rows: Some(saturating_i32(self.skipped_rows)),
            deleted_rows: Some(saturating_i32(self.deleted_rows)),
            failed_rows: Some(saturating_i32(self.failed_rows)),
            row_errors: Some(serde_json::Value::from(self.row_errors.clone())),
            failure_reason: Some(failure_reason),
            completed_at: Some(Some(Timestamp::now().into())),
            ..UpdateLandRegistryImport::default()
        }
    }
}

/// One import, from its database row to its final status.
pub struct ImportJob {
    pg_client: PgClient,
    tracker: ImportTracker,
    pipeline: ImportPipeline,
    source: ImportSource,
}

impl ImportJob {
    /// Records the import as `pending` and registers it with the tracker.
    ///
    /// `account_id` is `None` for imports started from the command line.
    pub async fn create(
        pg_client: PgClient,
        tracker: ImportTracker,
        options: ImportOptions,
        account_id: Option<Uuid>,
        file_name: impl Into<String>,
        source: impl Into<ImportSource>,
    ) -> ImportResult<(Self, LandRegistryImport)> {
        let file_name = file_name.into();
        let source = source.into();
        let pipeline = ImportPipeline::new(options)?;
        let import_id = pipeline.options().import_id;

        let new_import = NewLandRegistryImport {
            id: import_id,
            account_id,
            file_name: file_name.clone(),
            status: ImportStatus::Pending,
            batch_size: saturating_i32(pipeline.options().batch_size as u64),
            update_existing: pipeline.options().update_existing,
        };

        let mut conn = pg_client.get_connection().await?;
        let import = conn.create_import(new_import).await?;
        drop(conn);

        let cancellation = tracker.register(import_id, account_id, file_name).await;
        let pipeline = pipeline
            .with_cancellation(cancellation)
            .with_tracker(tracker.clone());

        tracing::info!(
            target: TRACING_TARGET,
            %import_id,
            bytes = source.byte_len(),
            "import created"
        );

        let job = Self {
            pg_client,
            tracker,
            pipeline,
            source,
        };

        Ok((job, import))
    }

    pub fn import_id(&self) -> Uuid {
        self.pipeline.options().import_id
    }

    /// Runs the import to completion.
    ///
    /// Every write happens in one transaction: a cancelled or failed import
    /// leaves the properties table untouched. The final status, counters
    /// and row errors are always written to the import row.
    pub async fn run(self) -> ImportResult<ImportSummary> {
        let import_id = self.import_id();
        let result = self.execute().await;

        // Failures before the final write leave the tracker entry unfinished.
        if let Err(error) = &result {
            let unfinished = self
                .tracker
                .get(import_id)
                .await
                .is_some_and(|tracked| tracked.finished_at.is_none());
            if unfinished {
                self.tracker
                    .finish(import_id, error.terminal_status(), ImportSummary::default())
                    .await;
            }
        }

        result
    }

    async fn execute(&self) -> ImportResult<ImportSummary> {
        let import_id = self.import_id();
        let source = self.source.open()?;
        let mut conn = self.pg_client.get_connection().await?;

        conn.update_import(
            import_id,
            UpdateLandRegistryImport {
                status: Some(ImportStatus::Processing),
                started_at: Some(Some(Timestamp::now().into())),
                ..UpdateLandRegistryImport::default()
            },
        )
        .await?;
        self.tracker
            .set_status(import_id, ImportStatus::Processing)
            .await;

        let pipeline = &self.pipeline;
        let result = conn
            .transaction(|conn| Box::pin(async move { pipeline.run(source, &mut **conn).await }))
            .await;

        let (status, summary, failure_reason) = match &result {
            Ok(summary) => (ImportStatus::Completed, summary.clone(), None),
            Err(error) => {
                let progress = self
                    .tracker
                    .get(import_id)
                    .await
                    .map(|tracked| tracked.summary)
                    .unwrap_or_default();
                (
                    error.terminal_status(),
                    progress.rolled_back(),
                    Some(error.to_string()),
                )
            }
        };

        conn.update_import(import_id, summary.to_final_update(status, failure_reason))
            .await?;
        self.tracker.finish(import_id, status, summary).await;

        match &result {
            Ok(summary) => tracing::info!(
                target: TRACING_TARGET,
                %import_id,
                inserted = summary.inserted_rows,
                failed = summary.failed_rows,
                "import completed"
            ),
            Err(error) => tracing::warn!(
                target: TRACING_TARGET,
                %import_id,
                %status,
                error = %error,
                "import did not complete"
            ),
        }

        result
    }

    /// Runs the import on a background task.
    pub fn spawn(self) -> JoinHandle<()> {
        let import_id = self.import_id();
        tokio::spawn(async move {
            if let Err(error) = self.run().await {
                tracing::debug!(
                    target: TRACING_TARGET,
                    %import_id,
                    error = %error,
                    "background import ended with an error"
                );
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::service::test_state::service_state;

    #[test]
    fn final_update_carries_counts_and_errors() {
        let summary = ImportSummary {
            total_rows: 3,
            processed_rows: 3,
            inserted_rows: 2,
            failed_rows: 1,
            row_errors: vec!["row 2: price is required".into()],
            ..ImportSummary::default()
        };

        let update = summary.to_final_update(ImportStatus::Completed, None);
        assert_eq!(update.status, Some(ImportStatus::Completed));
        assert_eq!(update.inserted_rows, Some(2));
        assert_eq!(update.failure_reason, Some(None));
        assert_eq!(
            update.row_errors,
            Some(serde_json::json!(["row 2: price is required"]))
        );
        assert!(update.completed_at.is_some_and(|at| at.is_some()));
    }

    #[test]
    fn counters_saturate() {
        assert_eq!(saturating_i32(u64::MAX), i32::MAX);
        assert_eq!(saturating_i32(42), 42);
    }

    #[tokio::test]
    async fn unreachable_database_fails_the_tracked_import() -> anyhow::Result<()> {
        let import_id = Uuid::new_v4();
        let tracker = ImportTracker::new();
        let cancellation = tracker.register(import_id, None, "pp.csv").await;

        let pipeline = ImportPipeline::new(ImportOptions::new(import_id))?
            .with_cancellation(cancellation)
            .with_tracker(tracker.clone());
        let job = ImportJob {
            pg_client: service_state()?.postgres,
            tracker: tracker.clone(),
            pipeline,
            source: ImportSource::Bytes(Bytes::from_static(
                b"{T1},250000,2023-01-31,RG1 8DU,S,N,F,1,,,,READING,,,A,A\n",
            )),
        };

        let result = job.run().await;
        assert!(matches!(result, Err(ImportError::Database(_))));

        let tracked = tracker.get(import_id).await;
        assert_eq!(tracked.as_ref().map(|t| t.status), Some(ImportStatus::Failed));
        assert!(tracked.is_some_and(|t| t.finished_at.is_some()));
        Ok(())
    }

    #[test]
    fn file_sources_are_read_from_disk() -> anyhow::Result<()> {
        let mut file = tempfile::NamedTempFile::new()?;
        std::io::Write::write_all(&mut file, b"{T1},250000\n")?;

        let source = ImportSource::File(file.path().to_path_buf());
        assert_eq!(source.byte_len(), Some(12));

        let mut contents = String::new();
        source.open()?.read_to_string(&mut contents)?;
        assert_eq!(contents, "{T1},250000\n");

        let missing = ImportSource::File(file.path().with_extension("missing"));
        assert!(matches!(missing.open(), Err(ImportError::Io(_))));
        Ok(())
    }
}
