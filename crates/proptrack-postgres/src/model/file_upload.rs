//! Uploaded file metadata. The content itself lives in object storage.

use diesel::prelude::*;
use jiff_diesel::Timestamp;
use uuid::Uuid;

use crate::schema::file_uploads;
use crate::types::FileCategory;

#[derive(Debug, Clone, PartialEq, Queryable, Selectable)]
#[diesel(table_name = file_uploads)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct FileUpload {
    pub id: Uuid,
    pub account_id: Uuid,
    pub property_id: Option<Uuid>,
    pub category: FileCategory,
    /// Sanitised client-provided name.
    pub file_name: String,
    pub content_type: String,
    /// Size in bytes.
    pub file_size: i64,
    /// Lower-case hex SHA-256 of the content.
    pub sha256: String,
    /// Object key in the storage backend.
    pub storage_key: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
    pub deleted_at: Option<Timestamp>,
}

#[derive(Debug, Default, Clone, Insertable)]
#[diesel(table_name = file_uploads)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct NewFileUpload {
    /// Pre-generated so the storage key can be derived before inserting.
    pub id: Uuid,
    pub account_id: Uuid,
    pub property_id: Option<Uuid>,
    pub category: FileCategory,
    pub file_name: String,
    pub content_type: String,
    pub file_size: i64,
    pub sha256: String,
    pub storage_key: String,
}

impl FileUpload {
    #[inline]
    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }

    #[inline]
    pub fn is_image(&self) -> bool {
        self.content_type.starts_with("image/")
    }
}
