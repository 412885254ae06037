//! File upload response types.

use jiff::Timestamp;
use proptrack_postgres::model::FileUpload;
use proptrack_postgres::types::FileCategory;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Metadata of an uploaded file.
#[must_use]
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct File {
    pub file_id: Uuid,
    pub property_id: Option<Uuid>,
    pub category: FileCategory,
    pub file_name: String,
    pub content_type: String,
    /// Size in bytes.
    pub file_size: i64,
    /// Hex encoded SHA-256 of the content.
    pub sha256: String,
    pub created_at: Timestamp,
}

impl File {
    pub fn from_model(file: FileUpload) -> Self {
        Self {
            file_id: file.id,
            property_id: file.property_id,
            category: file.category,
            file_name: file.file_name,
            content_type: file.content_type,
            file_size: file.file_size,
            sha256: file.sha256,
            created_at: file.created_at.into(),
        }
    }
}

/// Paginated list of files.
pub type FilesPage = super::Page<File>;
