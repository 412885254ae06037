use super::{MigrationResult, MigrationStatus, migration_status, run_pending_migrations};
use crate::{PgClient, PgResult};

/// Migration operations on a [`PgClient`].
pub trait PgClientMigrationExt {
    /// Applies every embedded migration that has not run yet.
    ///
    /// Calling it on an up-to-date database is a no-op.
    fn run_pending_migrations(&self) -> impl Future<Output = PgResult<MigrationResult>> + Send;

    /// Lists applied and pending migration versions.
    fn migration_status(&self) -> impl Future<Output = PgResult<MigrationStatus>> + Send;
}

impl PgClientMigrationExt for PgClient {
    async fn run_pending_migrations(&self) -> PgResult<MigrationResult> {
        run_pending_migrations(self).await
    }

    async fn migration_status(&self) -> PgResult<MigrationStatus> {
        migration_status(self).await
    }
}
