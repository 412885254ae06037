//! Pooled PostgreSQL client and schema migrations.

pub(crate) mod custom_hooks;
pub mod migrate;
mod pg_client;
mod pg_config;

use deadpool::managed::{Object, Pool};
use diesel_async::AsyncPgConnection;
use diesel_async::pooled_connection::AsyncDieselConnectionManager;

pub use self::migrate::{MigrationResult, MigrationStatus, PgClientMigrationExt};
pub use self::pg_client::{PgClient, PgConn, PgPoolStatus};
pub use self::pg_config::PgConfig;

/// Deadpool pool of async diesel connections.
pub type ConnectionPool = Pool<AsyncDieselConnectionManager<AsyncPgConnection>>;

/// Connection checked out of the [`ConnectionPool`].
pub type PooledConnection = Object<AsyncDieselConnectionManager<AsyncPgConnection>>;
