//! Storage error types.

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Errors that can occur during storage operations.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// The backend could not be built from its configuration.
    #[error("storage initialization failed: {0}")]
    Init(String),

    /// No object is stored under the path.
    #[error("not found: {0}")]
    NotFound(String),

    /// The backend refused the operation.
    #[error("permission denied: {0}")]
    PermissionDenied(String),

    /// The object path is empty or escapes the root.
    #[error("invalid path: {0}")]
    InvalidPath(String),

    /// Any other OpenDAL failure.
    #[error("backend error: {0}")]
    Backend(opendal::Error),
}

impl StorageError {
    /// Creates a new initialization error.
    pub fn init(msg: impl Into<String>) -> Self {
        Self::Init(msg.into())
    }

    /// Creates a new invalid path error.
    pub fn invalid_path(msg: impl Into<String>) -> Self {
        Self::InvalidPath(msg.into())
    }

    /// Returns whether the object does not exist.
    #[inline]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}

impl From<opendal::Error> for StorageError {
    fn from(err: opendal::Error) -> Self {
        use opendal::ErrorKind;

        match err.kind() {
            ErrorKind::NotFound => Self::NotFound(err.to_string()),
            ErrorKind::PermissionDenied => Self::PermissionDenied(err.to_string()),
            _ => Self::Backend(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn opendal_not_found_maps_to_dedicated_variant() {
        let err = opendal::Error::new(opendal::ErrorKind::NotFound, "missing");
        assert!(StorageError::from(err).is_not_found());
    }

    #[test]
    fn opendal_permission_denied_maps_to_dedicated_variant() {
        let err = opendal::Error::new(opendal::ErrorKind::PermissionDenied, "nope");
        assert!(matches!(
            StorageError::from(err),
            StorageError::PermissionDenied(_)
        ));
    }

    #[test]
    fn other_opendal_errors_are_kept() {
        let err = opendal::Error::new(opendal::ErrorKind::Unexpected, "boom");
        assert!(matches!(StorageError::from(err), StorageError::Backend(_)));
    }
}
