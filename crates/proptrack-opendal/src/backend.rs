//! Storage backend implementation.

use bytes::Bytes;
use opendal::{Operator, services};

use crate::TRACING_TARGET;
use crate::config::{BackendType, StorageConfig};
use crate::error::{StorageError, StorageResult};

/// Unified storage backend that wraps an OpenDAL operator.
#[derive(Clone)]
pub struct StorageBackend {
    operator: Operator,
    config: StorageConfig,
}

impl StorageBackend {
    /// Creates a new storage backend from configuration.
    ///
    /// No request is made to the backend; misconfigured remote services
    /// surface on first use.
    pub fn new(config: StorageConfig) -> StorageResult<Self> {
        let operator = Self::create_operator(&config)?;

        tracing::info!(
            target: TRACING_TARGET,
            backend = config.backend_name(),
            root = %config.root,
            "storage backend initialized"
        );

        Ok(Self { operator, config })
    }

    /// Returns the configuration for this backend.
    pub fn config(&self) -> &StorageConfig {
        &self.config
    }

    /// Reads an object.
    pub async fn read(&self, path: &str) -> StorageResult<Bytes> {
        let path = Self::validate_path(path)?;
        let data = self.operator.read(path).await?.to_bytes();

        tracing::debug!(
            target: TRACING_TARGET,
            path = %path,
            size = data.len(),
            "object read"
        );

        Ok(data)
    }

    /// Writes an object, replacing any previous content.
    pub async fn write(&self, path: &str, data: impl Into<Bytes>) -> StorageResult<()> {
        let path = Self::validate_path(path)?;
        let data = data.into();
        let size = data.len();

        self.operator.write(path, data).await?;

        tracing::debug!(
            target: TRACING_TARGET,
            path = %path,
            size,
            "object written"
        );

        Ok(())
    }

    /// Deletes an object. Deleting a missing object succeeds.
    pub async fn delete(&self, path: &str) -> StorageResult<()> {
        let path = Self::validate_path(path)?;
        self.operator.delete(path).await?;

        tracing::debug!(
            target: TRACING_TARGET,
            path = %path,
            "object deleted"
        );

        Ok(())
    }

    /// Checks whether an object exists.
    pub async fn exists(&self, path: &str) -> StorageResult<bool> {
        let path = Self::validate_path(path)?;
        Ok(self.operator.exists(path).await?)
    }

    /// Returns object metadata.
    pub async fn stat(&self, path: &str) -> StorageResult<FileMetadata> {
        let path = Self::validate_path(path)?;
        let meta = self.operator.stat(path).await?;

        let last_modified = meta
            .last_modified()
            .and_then(|dt| jiff::Timestamp::from_second(dt.timestamp()).ok());

        Ok(FileMetadata {
            size: meta.content_length(),
            last_modified,
            content_type: meta.content_type().map(|s| s.to_string()),
        })
    }

    /// Rejects empty keys, absolute keys and parent directory segments.
    fn validate_path(path: &str) -> StorageResult<&str> {
        let trimmed = path.trim();
        if trimmed.is_empty() || trimmed.ends_with('/') {
            return Err(StorageError::invalid_path("object key is empty"));
        }
        if trimmed.starts_with('/') || trimmed.split('/').any(|segment| segment == "..") {
            return Err(StorageError::invalid_path(format!(
                "object key escapes the storage root: {trimmed}"
            )));
        }

        Ok(trimmed)
    }

    /// Creates an OpenDAL operator based on configuration.
    fn create_operator(config: &StorageConfig) -> StorageResult<Operator> {
        match config.backend_type {
            BackendType::Fs => {
                let builder = services::Fs::default().root(&config.root);

                Operator::new(builder)
                    .map(|op| op.finish())
                    .map_err(|e| StorageError::init(e.to_string()))
            }

            BackendType::Memory => {
                let builder = services::Memory::default().root(&config.root);

                Operator::new(builder)
                    .map(|op| op.finish())
                    .map_err(|e| StorageError::init(e.to_string()))
            }

            #[cfg(feature = "s3")]
            BackendType::S3 => {
                let Some(ref bucket) = config.bucket else {
                    return Err(StorageError::init("s3 backend requires a bucket"));
                };

                let mut builder = services::S3::default().bucket(bucket).root(&config.root);

                if let Some(ref region) = config.region {
                    builder = builder.region(region);
                }

                if let Some(ref endpoint) = config.endpoint {
                    builder = builder.endpoint(endpoint);
                }

                if let Some(ref access_key_id) = config.access_key_id {
                    builder = builder.access_key_id(access_key_id);
                }

                if let Some(ref secret_access_key) = config.secret_access_key {
                    builder = builder.secret_access_key(secret_access_key);
                }

                Operator::new(builder)
                    .map(|op| op.finish())
                    .map_err(|e| StorageError::init(e.to_string()))
            }
        }
    }
}

/// Object metadata.
#[derive(Debug, Clone)]
pub struct FileMetadata {
    /// Object size in bytes.
    pub size: u64,
    /// Last modification time.
    pub last_modified: Option<jiff::Timestamp>,
    /// Content type, if the backend records one.
    pub content_type: Option<String>,
}

impl std::fmt::Debug for StorageBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StorageBackend")
            .field("backend_type", &self.config.backend_type)
            .field("root", &self.config.root)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn memory_backend() -> anyhow::Result<StorageBackend> {
        Ok(StorageBackend::new(StorageConfig::memory())?)
    }

    #[tokio::test]
    async fn write_then_read_memory() -> anyhow::Result<()> {
        let storage = memory_backend()?;
        storage.write("files/a.txt", b"hello".to_vec()).await?;

        assert!(storage.exists("files/a.txt").await?);
        assert_eq!(&storage.read("files/a.txt").await?[..], b"hello");
        assert_eq!(storage.stat("files/a.txt").await?.size, 5);

        Ok(())
    }

    #[tokio::test]
    async fn read_missing_object_is_not_found() -> anyhow::Result<()> {
        let storage = memory_backend()?;
        let err = storage.read("files/missing.txt").await.unwrap_err();
        assert!(err.is_not_found());
        Ok(())
    }

    #[tokio::test]
    async fn delete_removes_object() -> anyhow::Result<()> {
        let storage = memory_backend()?;
        storage.write("files/b.txt", b"bye".to_vec()).await?;
        storage.delete("files/b.txt").await?;
        assert!(!storage.exists("files/b.txt").await?);
        Ok(())
    }

    #[tokio::test]
    async fn fs_backend_writes_below_root() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let root = dir.path().to_string_lossy().into_owned();
        let storage = StorageBackend::new(StorageConfig::new(BackendType::Fs, root))?;

        storage.write("nested/c.csv", b"a,b".to_vec()).await?;
        assert!(dir.path().join("nested").join("c.csv").exists());

        Ok(())
    }

    #[test]
    fn rejects_escaping_paths() {
        assert!(StorageBackend::validate_path("../etc/passwd").is_err());
        assert!(StorageBackend::validate_path("/abs").is_err());
        assert!(StorageBackend::validate_path("").is_err());
        assert!(StorageBackend::validate_path("files/ok.pdf").is_ok());
    }
}
