use std::time::Instant;

use diesel::migration::MigrationName;
use diesel::pg::Pg;
use diesel_async::async_connection_wrapper::AsyncConnectionWrapper;
use diesel_migrations::MigrationHarness;
use tokio::task::spawn_blocking;

use super::{MigrationResult, MigrationStatus, custom_hooks};
use crate::client::PooledConnection;
use crate::{MIGRATIONS, PgClient, PgError, PgResult, TRACING_TARGET_MIGRATION};

type BlockingConnection = AsyncConnectionWrapper<PooledConnection>;

/// Applies all pending embedded migrations.
///
/// The synchronous migration harness runs on the blocking thread pool over
/// a wrapped pooled connection.
#[tracing::instrument(skip(pg), target = TRACING_TARGET_MIGRATION)]
pub async fn run_pending_migrations(pg: &PgClient) -> PgResult<MigrationResult> {
    let started = Instant::now();
    let mut conn = pg.get_pooled_connection().await?;
    custom_hooks::pre_migrate(&mut conn)?;

    let mut wrapped: BlockingConnection = conn.into();
    let (wrapped, versions) = spawn_blocking(move || {
        let versions = wrapped
            .run_pending_migrations(MIGRATIONS)
            .map(|applied| applied.iter().map(ToString::to_string).collect::<Vec<_>>());
        (wrapped, versions)
    })
    .await
    .map_err(|e| PgError::Migration(e.into()))?;

    let mut wrapped = wrapped;
    custom_hooks::post_migrate(&mut wrapped);

    let processed_versions = versions.map_err(|error| {
        tracing::error!(target: TRACING_TARGET_MIGRATION, %error, "migrations failed");
        PgError::Migration(error)
    })?;

    let result = MigrationResult {
        duration: started.elapsed(),
        processed_versions,
    };

    tracing::info!(
        target: TRACING_TARGET_MIGRATION,
        applied = result.processed_versions.len(),
        duration = ?result.duration,
        "database schema is up to date"
    );

    Ok(result)
}

/// Lists applied and pending migrations without changing anything.
pub async fn migration_status(pg: &PgClient) -> PgResult<MigrationStatus> {
    let conn = pg.get_pooled_connection().await?;
    let mut wrapped: BlockingConnection = conn.into();

    spawn_blocking(move || {
        let applied = MigrationHarness::<Pg>::applied_migrations(&mut wrapped)
            .map_err(PgError::Migration)?;
        let pending = wrapped
            .pending_migrations(MIGRATIONS)
            .map_err(PgError::Migration)?;

        Ok(MigrationStatus {
            applied_versions: applied.iter().map(ToString::to_string).collect(),
            pending_versions: pending.iter().map(|m| m.name().version().to_string()).collect(),
        })
    })
    .await
    .map_err(|e| PgError::Migration(e.into()))?
}
