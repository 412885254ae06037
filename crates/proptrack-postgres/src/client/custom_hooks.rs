//! Connection setup callback and deadpool lifecycle hooks.

use std::time::Instant;

use deadpool::managed::{HookResult, Metrics};
use diesel::ConnectionResult;
use diesel_async::pooled_connection::{PoolError, PoolableConnection};
use diesel_async::{AsyncConnection, AsyncPgConnection};
use futures::FutureExt;
use futures::future::BoxFuture;

use crate::TRACING_TARGET_CONNECTION;
use crate::client::PgConfig;

/// Establishes a new connection, logging how long it took.
///
/// Installed as the `custom_setup` of the diesel connection manager.
pub fn setup_callback<C>(addr: &str) -> BoxFuture<'_, ConnectionResult<C>>
where
    C: AsyncConnection + 'static,
{
    let started = Instant::now();
    let masked = PgConfig::mask_url(addr);

    async move {
        let result = C::establish(addr).await;
        let elapsed_ms = started.elapsed().as_millis();

        match &result {
            Ok(_) => tracing::debug!(
                target: TRACING_TARGET_CONNECTION,
                addr = %masked,
                elapsed_ms,
                "established database connection"
            ),
            Err(error) => tracing::error!(
                target: TRACING_TARGET_CONNECTION,
                addr = %masked,
                elapsed_ms,
                error = %error,
                "failed to establish database connection"
            ),
        }

        result
    }
    .boxed()
}

/// Called once a new connection has been added to the pool.
pub fn post_create(conn: &mut AsyncPgConnection, metrics: &Metrics) -> HookResult<PoolError> {
    if conn.is_broken() {
        tracing::warn!(
            target: TRACING_TARGET_CONNECTION,
            hook = "post_create",
            "new connection is already broken"
        );
    } else {
        tracing::debug!(
            target: TRACING_TARGET_CONNECTION,
            hook = "post_create",
            created = ?metrics.created,
            "connection added to pool"
        );
    }

    Ok(())
}

/// Called before a connection is handed out again.
pub fn pre_recycle(conn: &mut AsyncPgConnection, metrics: &Metrics) -> HookResult<PoolError> {
    if conn.is_broken() {
        tracing::warn!(
            target: TRACING_TARGET_CONNECTION,
            hook = "pre_recycle",
            recycle_count = metrics.recycle_count,
            "recycling a broken connection"
        );
    }

    Ok(())
}

/// Called after a connection has been recycled.
pub fn post_recycle(conn: &mut AsyncPgConnection, metrics: &Metrics) -> HookResult<PoolError> {
    tracing::trace!(
        target: TRACING_TARGET_CONNECTION,
        hook = "post_recycle",
        is_broken = conn.is_broken(),
        recycle_count = metrics.recycle_count,
        "connection recycled"
    );

    Ok(())
}
