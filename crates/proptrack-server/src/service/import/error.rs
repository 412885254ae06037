use proptrack_postgres::types::ImportStatus;
use proptrack_postgres::{DieselError, PgError};
use uuid::Uuid;

/// Result type of the import pipeline.
pub type ImportResult<T, E = ImportError> = std::result::Result<T, E>;

/// Failure that aborts an import.
///
/// Invalid rows are not errors: they are counted and reported in the
/// summary while the import carries on.
#[derive(Debug, thiserror::Error)]
pub enum ImportError {
    /// The file could not be read as CSV at all.
    #[error("unreadable csv: {0}")]
    Csv(#[from] csv::Error),

    /// The import file could not be opened.
    #[error("cannot open import file: {0}")]
    Io(#[from] std::io::Error),

    /// A read or write failed; the transaction is rolled back.
    #[error(transparent)]
    Database(#[from] PgError),

    /// The import was cancelled; the transaction is rolled back.
    #[error("import cancelled")]
    Cancelled,

    #[error("import {0} not found")]
    NotFound(Uuid),

    /// Only pending and processing imports can be cancelled.
    #[error("import {import_id} is already {status}")]
    NotCancellable {
        import_id: Uuid,
        status: ImportStatus,
    },

    #[error("batch size {0} is outside 1..=5000")]
    InvalidBatchSize(usize),
}

impl From<DieselError> for ImportError {
    fn from(error: DieselError) -> Self {
        Self::Database(PgError::from(error))
    }
}

impl ImportError {
    /// Status the import row ends in when this error aborts it.
    pub fn terminal_status(&self) -> ImportStatus {
        match self {
            Self::Cancelled => ImportStatus::Cancelled,
            _ => ImportStatus::Failed,
        }
    }
}
