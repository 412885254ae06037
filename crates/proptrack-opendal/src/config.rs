//! Storage configuration types.

use std::fmt;

#[cfg(feature = "config")]
use clap::{Args, ValueEnum};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Storage service behind a [`StorageBackend`].
///
/// [`StorageBackend`]: crate::StorageBackend
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
#[derive(Serialize, Deserialize, Display, EnumString)]
#[cfg_attr(feature = "config", derive(ValueEnum))]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum BackendType {
    /// Local filesystem below `root`.
    #[default]
    Fs,
    /// Process memory; contents are lost on exit.
    Memory,
    /// Amazon S3 compatible bucket; `root` is the prefix inside the bucket.
    #[cfg(feature = "s3")]
    S3,
}

/// Storage backend configuration.
#[derive(Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "config", derive(Args))]
pub struct StorageConfig {
    /// Storage backend.
    #[cfg_attr(
        feature = "config",
        arg(long = "storage-backend", env = "STORAGE_BACKEND", value_enum, default_value_t = BackendType::Fs)
    )]
    #[serde(default)]
    pub backend_type: BackendType,

    /// Root directory or key prefix for stored objects.
    #[cfg_attr(
        feature = "config",
        arg(long = "storage-root", env = "STORAGE_ROOT", default_value = "./uploads")
    )]
    pub root: String,

    /// S3 bucket name.
    #[cfg_attr(feature = "config", arg(long = "storage-bucket", env = "STORAGE_BUCKET"))]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bucket: Option<String>,

    /// S3 region.
    #[cfg_attr(feature = "config", arg(long = "storage-region", env = "STORAGE_REGION"))]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,

    /// Custom endpoint for S3-compatible services.
    #[cfg_attr(
        feature = "config",
        arg(long = "storage-endpoint", env = "STORAGE_ENDPOINT")
    )]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,

    /// S3 access key id.
    #[cfg_attr(
        feature = "config",
        arg(long = "storage-access-key-id", env = "STORAGE_ACCESS_KEY_ID")
    )]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access_key_id: Option<String>,

    /// S3 secret access key.
    #[cfg_attr(
        feature = "config",
        arg(long = "storage-secret-access-key", env = "STORAGE_SECRET_ACCESS_KEY")
    )]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secret_access_key: Option<String>,
}

impl StorageConfig {
    /// Creates a configuration for the given backend and root.
    pub fn new(backend_type: BackendType, root: impl Into<String>) -> Self {
        Self {
            backend_type,
            root: root.into(),
            bucket: None,
            region: None,
            endpoint: None,
            access_key_id: None,
            secret_access_key: None,
        }
    }

    /// In-memory storage, used by tests.
    pub fn memory() -> Self {
        Self::new(BackendType::Memory, "/")
    }

    /// Sets the S3 bucket and region.
    pub fn with_bucket(mut self, bucket: impl Into<String>, region: impl Into<String>) -> Self {
        self.bucket = Some(bucket.into());
        self.region = Some(region.into());
        self
    }

    /// Sets a custom endpoint (MinIO, R2, ...).
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }

    /// Sets the access credentials.
    pub fn with_credentials(
        mut self,
        access_key_id: impl Into<String>,
        secret_access_key: impl Into<String>,
    ) -> Self {
        self.access_key_id = Some(access_key_id.into());
        self.secret_access_key = Some(secret_access_key.into());
        self
    }

    /// Returns the backend name as a static string.
    pub fn backend_name(&self) -> &'static str {
        match self.backend_type {
            BackendType::Fs => "fs",
            BackendType::Memory => "memory",
            #[cfg(feature = "s3")]
            BackendType::S3 => "s3",
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self::new(BackendType::Fs, "./uploads")
    }
}

impl fmt::Debug for StorageConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StorageConfig")
            .field("backend_type", &self.backend_type)
            .field("root", &self.root)
            .field("bucket", &self.bucket)
            .field("region", &self.region)
            .field("endpoint", &self.endpoint)
            .field("access_key_id", &self.access_key_id.as_ref().map(|_| "***"))
            .field(
                "secret_access_key",
                &self.secret_access_key.as_ref().map(|_| "***"),
            )
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backend_type_parses_from_str() {
        assert_eq!("fs".parse::<BackendType>().ok(), Some(BackendType::Fs));
        assert_eq!(
            "memory".parse::<BackendType>().ok(),
            Some(BackendType::Memory)
        );
        assert!("ftp".parse::<BackendType>().is_err());
    }

    #[test]
    fn debug_output_hides_credentials() {
        let config = StorageConfig::memory().with_credentials("AKIA123", "very-secret");
        let debug = format!("{config:?}");
        assert!(!debug.contains("very-secret"));
        assert!(!debug.contains("AKIA123"));
    }
}
