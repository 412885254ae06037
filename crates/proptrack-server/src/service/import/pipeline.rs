//! Batching, progress and cancellation around the reader and the writer.

use std::io::Read;

use serde::Serialize;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use super::error::{ImportError, ImportResult};
use super::reader::{PricePaidReader, ReadRow};
use super::record::PricePaidRecord;
use super::tracker::ImportTracker;
use super::writer::{ImportWriter, UpsertOutcome};

const TRACING_TARGET: &str = "proptrack_server::service::import::pipeline";

/// Largest accepted batch size.
pub const MAX_BATCH_SIZE: usize = 5000;

/// Batch size used when none is given.
pub const DEFAULT_BATCH_SIZE: usize = 500;

/// Row error messages kept in a summary when none is given.
pub const DEFAULT_MAX_ROW_ERRORS: usize = 1000;

/// Parameters of one import run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportOptions {
    pub import_id: Uuid,
    pub batch_size: usize,
    pub update_existing: bool,
    /// Messages beyond this are dropped; the rows still count as failed.
    pub max_row_errors: usize,
}

impl ImportOptions {
    pub fn new(import_id: Uuid) -> Self {
        Self {
            import_id,
            batch_size: DEFAULT_BATCH_SIZE,
            update_existing: false,
            max_row_errors: DEFAULT_MAX_ROW_ERRORS,
        }
    }

    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size;
        self
    }

    pub fn with_update_existing(mut self, update_existing: bool) -> Self {
        self.update_existing = update_existing;
        self
    }

    pub fn with_max_row_errors(mut self, max_row_errors: usize) -> Self {
        self.max_row_errors = max_row_errors;
        self
    }
}

/// Counters of an import.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportSummary {
    /// Data lines read, header excluded.
    pub total_rows: u64,
    /// Lines validated and either written or rejected.
    pub processed_rows: u64,
    pub inserted_rows: u64,
    pub updated_rows: u64,
    pub skipped_rows: u64,
    pub deleted_rows: u64,
    pub failed_rows: u64,
    /// `row N: ...` messages for rejected lines.
    pub row_errors: Vec<String>,
}

impl ImportSummary {
    fn record_failure(&mut self, line: u64, message: impl AsRef<str>, max_row_errors: usize) {
        self.processed_rows += 1;
        self.failed_rows += 1;
        if self.row_errors.len() < max_row_errors {
            self.row_errors
                .push(format!("row {line}: {}", message.as_ref()));
        }
    }

    fn record_outcome(&mut self, outcome: UpsertOutcome) {
        self.processed_rows += 1;
        match outcome {
            UpsertOutcome::Inserted => self.inserted_rows += 1,
            UpsertOutcome::Updated => self.updated_rows += 1,
            UpsertOutcome::Skipped => self.skipped_rows += 1,
            UpsertOutcome::Deleted => self.deleted_rows += 1,
        }
    }

    /// Same counters with every write undone, as after a rollback.
    pub fn rolled_back(mut self) -> Self {
        self.inserted_rows = 0;
        self.updated_rows = 0;
        self.deleted_rows = 0;
        self
    }
}

/// Streams a Price Paid Data file through an [`ImportWriter`].
///
/// Rows are validated one by one and written in batches. Invalid rows are
/// reported in the summary and never abort the run; cancellation and
/// writer failures do.
#[derive(Debug, Clone)]
pub struct ImportPipeline {
    options: ImportOptions,
    cancellation: CancellationToken,
    tracker: Option<ImportTracker>,
}

impl ImportPipeline {
    pub fn new(options: ImportOptions) -> ImportResult<Self> {
        if !(1..=MAX_BATCH_SIZE).contains(&options.batch_size) {
            return Err(ImportError::InvalidBatchSize(options.batch_size));
        }

        Ok(Self {
            options,
            cancellation: CancellationToken::new(),
            tracker: None,
        })
    }

    /// Stops the run before the next batch once `cancellation` fires.
    pub fn with_cancellation(mut self, cancellation: CancellationToken) -> Self {
        self.cancellation = cancellation;
        self
    }

    /// Publishes progress to `tracker` after every batch.
    pub fn with_tracker(mut self, tracker: ImportTracker) -> Self {
        self.tracker = Some(tracker);
        self
    }

    pub fn options(&self) -> &ImportOptions {
        &self.options
    }

    pub fn cancellation(&self) -> &CancellationToken {
        &self.cancellation
    }

    /// Reads `source` to the end and writes its valid rows through `writer`.
    #[tracing::instrument(
        skip_all,
        target = TRACING_TARGET,
        fields(import_id = %self.options.import_id, batch_size = self.options.batch_size)
    )]
    pub async fn run<R, W>(&self, source: R, writer: &mut W) -> ImportResult<ImportSummary>
    where
        R: Read + Send,
        W: ImportWriter,
    {
        let mut reader = PricePaidReader::new(source);
        let mut summary = ImportSummary::default();
        let mut batch = Vec::with_capacity(self.options.batch_size);

        while let Some(item) = reader.next_row()? {
            summary.total_rows += 1;

            match item {
                ReadRow::Invalid { line, message } => {
                    summary.record_failure(line, message, self.options.max_row_errors);
                }
                ReadRow::Row { line, row } => match PricePaidRecord::try_from(row) {
                    Ok(record) => batch.push(record),
                    Err(errors) => {
                        summary.record_failure(line, errors.to_string(), self.options.max_row_errors);
                    }
                },
            }

            if batch.len() >= self.options.batch_size {
                self.write_batch(&mut batch, writer, &mut summary).await?;
            }
        }

        if !batch.is_empty() {
            self.write_batch(&mut batch, writer, &mut summary).await?;
        }

        if self.cancellation.is_cancelled() {
            return Err(ImportError::Cancelled);
        }

        self.publish(&summary).await;
        tracing::info!(
            target: TRACING_TARGET,
            total = summary.total_rows,
            inserted = summary.inserted_rows,
            updated = summary.updated_rows,
            skipped = summary.skipped_rows,
            deleted = summary.deleted_rows,
            failed = summary.failed_rows,
            "import file processed"
        );

        Ok(summary)
    }

    async fn write_batch<W: ImportWriter>(
        &self,
        batch: &mut Vec<PricePaidRecord>,
        writer: &mut W,
        summary: &mut ImportSummary,
    ) -> ImportResult<()> {
        if self.cancellation.is_cancelled() {
            tracing::info!(
                target: TRACING_TARGET,
                processed = summary.processed_rows,
                "import cancelled between batches"
            );
            return Err(ImportError::Cancelled);
        }

        for record in batch.drain(..) {
            let outcome = writer
                .upsert_record(&record, self.options.import_id, self.options.update_existing)
                .await?;
            summary.record_outcome(outcome);
        }

        tracing::debug!(
            target: TRACING_TARGET,
            processed = summary.processed_rows,
            "batch written"
        );

        self.publish(summary).await;
        tokio::task::yield_now().await;
        Ok(())
    }

    async fn publish(&self, summary: &ImportSummary) {
        if let Some(tracker) = &self.tracker {
            tracker.update(self.options.import_id, summary).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use proptrack_postgres::types::ImportStatus;

    use super::*;
    use crate::service::import::record::RecordStatus;

    /// Keeps the latest transaction per address in memory.
    #[derive(Default)]
    struct MemoryWriter {
        sales: HashMap<(String, String), String>,
        writes: usize,
        cancel_after: Option<(usize, CancellationToken)>,
    }

    impl ImportWriter for MemoryWriter {
        async fn upsert_record(
            &mut self,
            record: &PricePaidRecord,
            _import_id: Uuid,
            update_existing: bool,
        ) -> ImportResult<UpsertOutcome> {
            self.writes += 1;
            if let Some((after, token)) = &self.cancel_after {
                if self.writes >= *after {
                    token.cancel();
                }
            }

            let key = (record.paon.clone(), record.postcode.clone());
            let outcome = match (self.sales.get(&key), record.record_status) {
                (None, RecordStatus::Delete) => UpsertOutcome::Skipped,
                (None, _) => {
                    self.sales.insert(key, record.transaction_id.clone());
                    UpsertOutcome::Inserted
                }
                (Some(id), RecordStatus::Delete) if *id == record.transaction_id => {
                    self.sales.remove(&key);
                    UpsertOutcome::Deleted
                }
                (Some(id), RecordStatus::Addition) if *id == record.transaction_id => {
                    UpsertOutcome::Skipped
                }
                (Some(_), RecordStatus::Delete) => UpsertOutcome::Skipped,
                (Some(_), _) if update_existing => {
                    self.sales.insert(key, record.transaction_id.clone());
                    UpsertOutcome::Updated
                }
                (Some(_), _) => UpsertOutcome::Skipped,
            };

            Ok(outcome)
        }
    }

    fn line(id: &str, paon: &str, status: &str) -> String {
        format!("{id},250000,2023-01-31 00:00,RG1 8DU,S,N,F,{paon},,ACACIA AVENUE,,READING,READING,BERKSHIRE,A,{status}\n")
    }

    #[tokio::test]
    async fn rows_are_counted_by_outcome() -> anyhow::Result<()> {
        let data = [
            line("{T1}", "1", "A"),
            line("{T2}", "2", "A"),
            line("{T1}", "1", "A"),
            line("{T3}", "1", "C"),
            line("{T2}", "2", "D"),
            "{T4},free,2023-01-31,RG1 8DU,S,N,F,3,,,,READING,,,A,A\n".to_owned(),
            "{T5},1\n".to_owned(),
        ]
        .concat();

        let options = ImportOptions::new(Uuid::new_v4())
            .with_batch_size(2)
            .with_update_existing(true);
        let pipeline = ImportPipeline::new(options)?;

        let mut writer = MemoryWriter::default();
        let summary = pipeline.run(data.as_bytes(), &mut writer).await?;

        assert_eq!(summary.total_rows, 7);
        assert_eq!(summary.processed_rows, 7);
        assert_eq!(summary.inserted_rows, 2);
        assert_eq!(summary.skipped_rows, 1);
        assert_eq!(summary.updated_rows, 1);
        assert_eq!(summary.deleted_rows, 1);
        assert_eq!(summary.failed_rows, 2);
        assert_eq!(summary.row_errors.len(), 2);
        assert!(summary.row_errors[0].starts_with("row 6: price 'free'"));
        assert!(summary.row_errors[1].starts_with("row 7: expected 16 columns"));
        Ok(())
    }

    #[tokio::test]
    async fn corrections_are_skipped_without_update_existing() -> anyhow::Result<()> {
        let data = [line("{T1}", "1", "A"), line("{T2}", "1", "C")].concat();
        let pipeline = ImportPipeline::new(ImportOptions::new(Uuid::new_v4()))?;

        let summary = pipeline.run(data.as_bytes(), &mut MemoryWriter::default()).await?;
        assert_eq!(summary.inserted_rows, 1);
        assert_eq!(summary.skipped_rows, 1);
        assert_eq!(summary.updated_rows, 0);
        Ok(())
    }

    #[tokio::test]
    async fn row_error_messages_are_capped() -> anyhow::Result<()> {
        let data = "bad\n".repeat(5);
        let options = ImportOptions::new(Uuid::new_v4()).with_max_row_errors(2);
        let pipeline = ImportPipeline::new(options)?;

        let summary = pipeline.run(data.as_bytes(), &mut MemoryWriter::default()).await?;
        assert_eq!(summary.failed_rows, 5);
        assert_eq!(summary.row_errors.len(), 2);
        Ok(())
    }

    #[tokio::test]
    async fn cancellation_stops_before_the_next_batch() -> anyhow::Result<()> {
        let data: String = (1..=6).map(|n| line(&format!("{{T{n}}}"), &n.to_string(), "A")).collect();

        let token = CancellationToken::new();
        let options = ImportOptions::new(Uuid::new_v4()).with_batch_size(2);
        let pipeline = ImportPipeline::new(options)?.with_cancellation(token.clone());

        let mut writer = MemoryWriter {
            cancel_after: Some((2, token)),
            ..MemoryWriter::default()
        };

        let result = pipeline.run(data.as_bytes(), &mut writer).await;
        assert!(matches!(result, Err(ImportError::Cancelled)));
        assert_eq!(writer.writes, 2);
        Ok(())
    }

    #[tokio::test]
    async fn progress_reaches_the_tracker() -> anyhow::Result<()> {
        let import_id = Uuid::new_v4();
        let tracker = ImportTracker::new();
        tracker.register(import_id, None, "pp.csv").await;
        tracker.set_status(import_id, ImportStatus::Processing).await;

        let data = [line("{T1}", "1", "A"), line("{T2}", "2", "A")].concat();
        let pipeline = ImportPipeline::new(ImportOptions::new(import_id).with_batch_size(1))?
            .with_tracker(tracker.clone());

        pipeline.run(data.as_bytes(), &mut MemoryWriter::default()).await?;

        let tracked = tracker.get(import_id).await;
        assert_eq!(tracked.map(|t| t.summary.inserted_rows), Some(2));
        Ok(())
    }

    #[test]
    fn batch_size_is_bounded() {
        let id = Uuid::new_v4();
        assert!(ImportPipeline::new(ImportOptions::new(id).with_batch_size(0)).is_err());
        assert!(ImportPipeline::new(ImportOptions::new(id).with_batch_size(5001)).is_err());
        assert!(ImportPipeline::new(ImportOptions::new(id).with_batch_size(5000)).is_ok());
    }

    #[test]
    fn rollback_clears_write_counts() {
        let summary = ImportSummary {
            total_rows: 4,
            processed_rows: 4,
            inserted_rows: 2,
            updated_rows: 1,
            failed_rows: 1,
            ..ImportSummary::default()
        }
        .rolled_back();

        assert_eq!(summary.inserted_rows + summary.updated_rows, 0);
        assert_eq!(summary.failed_rows, 1);
    }
}
