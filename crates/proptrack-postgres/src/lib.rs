#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

/// Migrations embedded into the binary at compile time.
pub(crate) const MIGRATIONS: diesel_migrations::EmbeddedMigrations =
    diesel_migrations::embed_migrations!("./migrations");

/// Tracing target for client construction and configuration.
pub const TRACING_TARGET_CLIENT: &str = "proptrack_postgres::client";

/// Tracing target for repository queries.
pub const TRACING_TARGET_QUERY: &str = "proptrack_postgres::queries";

/// Tracing target for schema migrations.
pub const TRACING_TARGET_MIGRATION: &str = "proptrack_postgres::migrations";

/// Tracing target for the connection pool and its hooks.
pub const TRACING_TARGET_CONNECTION: &str = "proptrack_postgres::connection";

mod client;
mod error;
pub mod model;
pub mod prelude;
pub mod query;
mod schema;
pub mod types;

pub use diesel::result::Error as DieselError;
pub use diesel_async::AsyncPgConnection as PgConnection;
pub use diesel_async::scoped_futures;

pub use crate::client::{
    ConnectionPool, MigrationResult, MigrationStatus, PgClient, PgClientMigrationExt, PgConfig,
    PgConn, PgPoolStatus, PooledConnection, migrate,
};
pub use crate::error::{BoxError, PgError, PgResult};
