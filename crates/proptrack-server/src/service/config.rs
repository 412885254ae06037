#[cfg(feature = "config")]
use clap::Args;
use derive_builder::Builder;
use proptrack_opendal::{StorageBackend, StorageConfig};
use proptrack_postgres::{PgClient, PgClientMigrationExt, PgConfig};
use serde::{Deserialize, Serialize};

use crate::service::import::MAX_BATCH_SIZE;
use crate::service::security::SessionKeysConfig;
use crate::{Error, Result};

/// Default values for configuration options.
mod defaults {
    /// Default upload limit: 25 MiB.
    pub const MAX_UPLOAD_SIZE: usize = 25 * 1024 * 1024;

    /// Default import batch size.
    pub const IMPORT_BATCH_SIZE: usize = 500;

    /// Default number of row error messages kept per import.
    pub const IMPORT_MAX_ROW_ERRORS: usize = 1000;

    pub fn max_upload_size() -> usize {
        MAX_UPLOAD_SIZE
    }

    pub fn import_batch_size() -> usize {
        IMPORT_BATCH_SIZE
    }

    pub fn import_max_row_errors() -> usize {
        IMPORT_MAX_ROW_ERRORS
    }
}

/// App [`state`] configuration.
///
/// [`state`]: crate::service::ServiceState
#[derive(Debug, Clone, Serialize, Deserialize, Builder)]
#[cfg_attr(feature = "config", derive(Args))]
#[must_use = "config does nothing unless you use it"]
#[builder(
    pattern = "owned",
    setter(into, strip_option, prefix = "with"),
    build_fn(validate = "Self::validate")
)]
pub struct ServiceConfig {
    /// Postgres connection settings.
    #[cfg_attr(feature = "config", command(flatten))]
    pub postgres_config: PgConfig,

    /// Object storage for uploaded files.
    #[cfg_attr(feature = "config", command(flatten))]
    pub storage_config: StorageConfig,

    /// JWT signing secret and session lifetime.
    #[cfg_attr(feature = "config", command(flatten))]
    pub session_config: SessionKeysConfig,

    /// Largest accepted upload in bytes.
    #[cfg_attr(
        feature = "config",
        arg(long, env = "MAX_UPLOAD_SIZE", default_value_t = defaults::MAX_UPLOAD_SIZE)
    )]
    #[serde(default = "defaults::max_upload_size")]
    #[builder(default = "defaults::MAX_UPLOAD_SIZE")]
    pub max_upload_size: usize,

    /// Rows written per import batch, unless the request overrides it.
    #[cfg_attr(
        feature = "config",
        arg(long, env = "IMPORT_BATCH_SIZE", default_value_t = defaults::IMPORT_BATCH_SIZE)
    )]
    #[serde(default = "defaults::import_batch_size")]
    #[builder(default = "defaults::IMPORT_BATCH_SIZE")]
    pub import_batch_size: usize,

    /// Row error messages kept per import.
    #[cfg_attr(
        feature = "config",
        arg(long, env = "IMPORT_MAX_ROW_ERRORS", default_value_t = defaults::IMPORT_MAX_ROW_ERRORS)
    )]
    #[serde(default = "defaults::import_max_row_errors")]
    #[builder(default = "defaults::IMPORT_MAX_ROW_ERRORS")]
    pub import_max_row_errors: usize,
}

impl ServiceConfig {
    /// Creates a new configuration builder.
    pub fn builder() -> ServiceConfigBuilder {
        ServiceConfigBuilder::default()
    }

    /// Checks every section of the configuration.
    pub fn validate(&self) -> Result<()> {
        self.postgres_config
            .validate()
            .map_err(|e| Error::config("invalid postgres configuration").with_source(e))?;
        self.session_config.validate()?;
        check_limits(
            self.max_upload_size,
            self.import_batch_size,
            self.import_max_row_errors,
        )
        .map_err(Error::config)
    }

    /// Connects to Postgres and applies pending migrations.
    pub async fn connect_postgres(&self) -> Result<PgClient> {
        let pg_client = self.postgres_config.clone().build().map_err(|e| {
            Error::internal("postgres", "Failed to create database client").with_source(e)
        })?;

        pg_client.run_pending_migrations().await.map_err(|e| {
            Error::internal("postgres", "Failed to apply database migrations").with_source(e)
        })?;

        Ok(pg_client)
    }

    /// Opens the configured object storage.
    pub fn open_storage(&self) -> Result<StorageBackend> {
        StorageBackend::new(self.storage_config.clone()).map_err(|e| {
            Error::internal("storage", "Failed to open file storage").with_source(e)
        })
    }
}

fn check_limits(
    max_upload_size: usize,
    import_batch_size: usize,
    import_max_row_errors: usize,
) -> Result<(), String> {
    if max_upload_size == 0 {
        return Err("Maximum upload size must be greater than 0".to_string());
    }

    if !(1..=MAX_BATCH_SIZE).contains(&import_batch_size) {
        return Err(format!(
            "Import batch size must be between 1 and {MAX_BATCH_SIZE}"
        ));
    }

    if import_max_row_errors > 100_000 {
        return Err("Import row error limit cannot exceed 100000".to_string());
    }

    Ok(())
}

impl ServiceConfigBuilder {
    /// Wrapper for builder validation that returns String errors.
    fn validate(builder: &ServiceConfigBuilder) -> Result<(), String> {
        if let Some(postgres_config) = &builder.postgres_config {
            postgres_config.validate().map_err(|e| e.to_string())?;
        }

        if let Some(session_config) = &builder.session_config {
            session_config.validate().map_err(|e| e.to_string())?;
        }

        check_limits(
            builder.max_upload_size.unwrap_or(defaults::MAX_UPLOAD_SIZE),
            builder
                .import_batch_size
                .unwrap_or(defaults::IMPORT_BATCH_SIZE),
            builder
                .import_max_row_errors
                .unwrap_or(defaults::IMPORT_MAX_ROW_ERRORS),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "0123456789abcdef0123456789abcdef";

    fn builder() -> ServiceConfigBuilder {
        ServiceConfig::builder()
            .with_postgres_config(PgConfig::new("postgresql://localhost:5432/proptrack"))
            .with_storage_config(StorageConfig::memory())
            .with_session_config(SessionKeysConfig::new(SECRET))
    }

    #[test]
    fn builder_applies_defaults() -> anyhow::Result<()> {
        let config = builder().build()?;
        assert_eq!(config.import_batch_size, 500);
        assert_eq!(config.import_max_row_errors, 1000);
        assert_eq!(config.max_upload_size, 25 * 1024 * 1024);
        config.validate()?;
        Ok(())
    }

    #[test]
    fn builder_rejects_oversized_batches() {
        let result = builder().with_import_batch_size(5001usize).build();
        assert!(result.is_err());
    }

    #[test]
    fn builder_rejects_short_secret() {
        let result = builder()
            .with_session_config(SessionKeysConfig::new("short"))
            .build();
        assert!(result.is_err());
    }

    #[test]
    fn memory_storage_opens() -> anyhow::Result<()> {
        let config = builder().build()?;
        config.open_storage()?;
        Ok(())
    }
}
