//! Constraints of the `file_uploads` table.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

use super::ConstraintCategory;

/// Named constraints and unique indexes of `file_uploads`.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
#[derive(Serialize, Deserialize, Display, EnumIter, EnumString)]
#[serde(into = "String", try_from = "String")]
pub enum FileUploadConstraints {
    #[strum(serialize = "file_uploads_file_name_length")]
    FileNameLength,
    #[strum(serialize = "file_uploads_file_size_positive")]
    FileSizePositive,
    #[strum(serialize = "file_uploads_sha256_format")]
    Sha256Format,

    #[strum(serialize = "file_uploads_storage_key_unique")]
    StorageKeyUnique,

    #[strum(serialize = "file_uploads_updated_after_created")]
    UpdatedAfterCreated,
    #[strum(serialize = "file_uploads_deleted_after_created")]
    DeletedAfterCreated,
}

impl FileUploadConstraints {
    /// Parses a constraint name reported by PostgreSQL.
    pub fn new(constraint: &str) -> Option<Self> {
        constraint.parse().ok()
    }

    pub fn categorize(&self) -> ConstraintCategory {
        match self {
            Self::FileNameLength
            | Self::FileSizePositive
            | Self::Sha256Format => ConstraintCategory::Validation,
            Self::StorageKeyUnique => ConstraintCategory::Uniqueness,
            Self::UpdatedAfterCreated
            | Self::DeletedAfterCreated => ConstraintCategory::Chronological,
        }
    }
}

impl From<FileUploadConstraints> for String {
    #[inline]
    fn from(value: FileUploadConstraints) -> Self {
        value.to_string()
    }
}

impl TryFrom<String> for FileUploadConstraints {
    type Error = strum::ParseError;

    #[inline]
    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}
