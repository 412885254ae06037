//! Hooks around a migration run.

use diesel_async::AsyncPgConnection;
use diesel_async::pooled_connection::PoolableConnection;

use crate::{PgError, PgResult, TRACING_TARGET_MIGRATION};

/// Refuses to migrate over a broken connection.
pub fn pre_migrate(conn: &mut AsyncPgConnection) -> PgResult<()> {
    if conn.is_broken() {
        tracing::error!(target: TRACING_TARGET_MIGRATION, "connection is broken before migrating");
        return Err(PgError::Migration("connection is broken".into()));
    }

    tracing::debug!(target: TRACING_TARGET_MIGRATION, "starting migrations");
    Ok(())
}

/// Reports a connection that broke while migrating.
pub fn post_migrate(conn: &mut AsyncPgConnection) {
    if conn.is_broken() {
        tracing::warn!(target: TRACING_TARGET_MIGRATION, "connection broke while migrating");
    }
}
