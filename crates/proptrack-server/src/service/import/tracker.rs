//! In-memory registry of running and recently finished imports.

use std::collections::HashMap;
use std::sync::Arc;

use jiff::{SignedDuration, Timestamp};
use proptrack_postgres::types::ImportStatus;
use tokio::sync::RwLock;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use super::error::{ImportError, ImportResult};
use super::pipeline::ImportSummary;

const TRACING_TARGET: &str = "proptrack_server::service::import::tracker";

/// How long finished imports stay in the tracker.
pub const FINISHED_RETENTION: SignedDuration = SignedDuration::from_hours(1);

/// Live state of one import.
#[derive(Debug, Clone)]
pub struct TrackedImport {
    pub import_id: Uuid,
    pub account_id: Option<Uuid>,
    pub file_name: String,
    pub status: ImportStatus,
    pub summary: ImportSummary,
    pub started_at: Timestamp,
    pub finished_at: Option<Timestamp>,
    cancellation: CancellationToken,
}

impl TrackedImport {
    /// Token that stops the pipeline before its next batch.
    pub fn cancellation(&self) -> &CancellationToken {
        &self.cancellation
    }
}

/// Progress and cancellation of imports, keyed by import id.
///
/// Cheap to clone; every clone shares the same map. The final outcome of
/// each import is also written to its database row, so entries can be
/// dropped once they are old.
#[derive(Debug, Clone, Default)]
pub struct ImportTracker {
    inner: Arc<RwLock<HashMap<Uuid, TrackedImport>>>,
}

impl ImportTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts tracking an import as `pending` and returns its cancellation token.
    pub async fn register(
        &self,
        import_id: Uuid,
        account_id: Option<Uuid>,
        file_name: impl Into<String>,
    ) -> CancellationToken {
        self.prune(FINISHED_RETENTION).await;

        let cancellation = CancellationToken::new();
        let tracked = TrackedImport {
            import_id,
            account_id,
            file_name: file_name.into(),
            status: ImportStatus::Pending,
            summary: ImportSummary::default(),
            started_at: Timestamp::now(),
            finished_at: None,
            cancellation: cancellation.clone(),
        };

        self.inner.write().await.insert(import_id, tracked);
        tracing::debug!(target: TRACING_TARGET, %import_id, "import registered");
        cancellation
    }

    pub async fn set_status(&self, import_id: Uuid, status: ImportStatus) {
        if let Some(tracked) = self.inner.write().await.get_mut(&import_id) {
            tracked.status = status;
        }
    }

    /// Replaces the progress counters of an import.
    pub async fn update(&self, import_id: Uuid, summary: &ImportSummary) {
        if let Some(tracked) = self.inner.write().await.get_mut(&import_id) {
            tracked.summary.clone_from(summary);
        }
    }

    /// Records the final status and summary.
    pub async fn finish(&self, import_id: Uuid, status: ImportStatus, summary: ImportSummary) {
        if let Some(tracked) = self.inner.write().await.get_mut(&import_id) {
            tracked.status = status;
            tracked.summary = summary;
            tracked.finished_at = Some(Timestamp::now());
        }
    }

    pub async fn get(&self, import_id: Uuid) -> Option<TrackedImport> {
        self.inner.read().await.get(&import_id).cloned()
    }

    /// Imports started by `account_id`, newest first.
    pub async fn list_for_account(&self, account_id: Uuid) -> Vec<TrackedImport> {
        let mut imports: Vec<_> = self
            .inner
            .read()
            .await
            .values()
            .filter(|tracked| tracked.account_id == Some(account_id))
            .cloned()
            .collect();

        imports.sort_by(|a, b| b.started_at.cmp(&a.started_at));
        imports
    }

    /// Requests cancellation of a pending or processing import.
    pub async fn cancel(&self, import_id: Uuid) -> ImportResult<()> {
        let guard = self.inner.read().await;
        let tracked = guard
            .get(&import_id)
            .ok_or(ImportError::NotFound(import_id))?;

        if !tracked.status.is_cancellable() {
            return Err(ImportError::NotCancellable {
                import_id,
                status: tracked.status,
            });
        }

        tracked.cancellation.cancel();
        tracing::info!(target: TRACING_TARGET, %import_id, "import cancellation requested");
        Ok(())
    }

    pub async fn remove(&self, import_id: Uuid) -> Option<TrackedImport> {
        self.inner.write().await.remove(&import_id)
    }

    /// Drops finished imports older than `max_age`. Returns how many were dropped.
    pub async fn prune(&self, max_age: SignedDuration) -> usize {
        let now = Timestamp::now();
        let mut guard = self.inner.write().await;
        let before = guard.len();

        guard.retain(|_, tracked| match tracked.finished_at {
            Some(finished_at) => now.duration_since(finished_at) < max_age,
            None => true,
        });

        let pruned = before - guard.len();
        if pruned > 0 {
            tracing::debug!(target: TRACING_TARGET, pruned, "pruned finished imports");
        }
        pruned
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn registered_import_is_pending() {
        let tracker = ImportTracker::new();
        let import_id = Uuid::new_v4();
        let account_id = Uuid::new_v4();

        tracker.register(import_id, Some(account_id), "pp-2023.csv").await;

        let tracked = tracker.get(import_id).await;
        assert!(tracked.is_some_and(|t| t.status == ImportStatus::Pending));
        assert_eq!(tracker.list_for_account(account_id).await.len(), 1);
        assert!(tracker.list_for_account(Uuid::new_v4()).await.is_empty());
    }

    #[tokio::test]
    async fn cancel_fires_the_token() -> anyhow::Result<()> {
        let tracker = ImportTracker::new();
        let import_id = Uuid::new_v4();

        let token = tracker.register(import_id, None, "pp.csv").await;
        tracker.set_status(import_id, ImportStatus::Processing).await;
        tracker.cancel(import_id).await?;

        assert!(token.is_cancelled());
        Ok(())
    }

    #[tokio::test]
    async fn finished_import_cannot_be_cancelled() {
        let tracker = ImportTracker::new();
        let import_id = Uuid::new_v4();

        tracker.register(import_id, None, "pp.csv").await;
        tracker
            .finish(import_id, ImportStatus::Completed, ImportSummary::default())
            .await;

        let result = tracker.cancel(import_id).await;
        assert!(matches!(
            result,
            Err(ImportError::NotCancellable {
                status: ImportStatus::Completed,
                ..
            })
        ));
    }

    #[tokio::test]
    async fn unknown_import_is_not_found() {
        let tracker = ImportTracker::new();
        let import_id = Uuid::new_v4();

        let result = tracker.cancel(import_id).await;
        assert!(matches!(result, Err(ImportError::NotFound(id)) if id == import_id));
    }

    #[tokio::test]
    async fn prune_drops_only_finished_imports() {
        let tracker = ImportTracker::new();
        let running = Uuid::new_v4();
        let finished = Uuid::new_v4();

        tracker.register(running, None, "a.csv").await;
        tracker.register(finished, None, "b.csv").await;
        tracker
            .finish(finished, ImportStatus::Failed, ImportSummary::default())
            .await;

        assert_eq!(tracker.prune(SignedDuration::ZERO).await, 1);
        assert!(tracker.get(running).await.is_some());
        assert!(tracker.get(finished).await.is_none());
    }

    #[tokio::test]
    async fn progress_is_replaced() {
        let tracker = ImportTracker::new();
        let import_id = Uuid::new_v4();
        tracker.register(import_id, None, "pp.csv").await;

        let summary = ImportSummary {
            total_rows: 10,
            processed_rows: 10,
            inserted_rows: 7,
            failed_rows: 3,
            ..ImportSummary::default()
        };
        tracker.update(import_id, &summary).await;

        let tracked = tracker.get(import_id).await;
        assert_eq!(tracked.map(|t| t.summary), Some(summary));
        assert!(tracker.remove(import_id).await.is_some());
    }
}
