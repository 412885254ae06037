use diesel::pg::Pg;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use uuid::Uuid;

use crate::model::{FileUpload, NewFileUpload};
use crate::schema::file_uploads::{self, dsl};
use crate::types::{FileCategory, OffsetPage, OffsetPagination};
use crate::{PgConnection, PgResult};

/// Uploaded file metadata persistence.
pub trait FileUploadRepository {
    fn create_file_upload(
        &mut self,
        new_file: NewFileUpload,
    ) -> impl Future<Output = PgResult<FileUpload>> + Send;

    fn find_file_upload_by_id(
        &mut self,
        file_id: Uuid,
    ) -> impl Future<Output = PgResult<Option<FileUpload>>> + Send;

    /// Lists an account's files, newest first.
    fn list_file_uploads(
        &mut self,
        account_id: Uuid,
        property_id: Option<Uuid>,
        category: Option<FileCategory>,
        pagination: OffsetPagination,
    ) -> impl Future<Output = PgResult<OffsetPage<FileUpload>>> + Send;

    /// Soft-deletes the metadata row. Returns `false` if there was nothing to delete.
    fn delete_file_upload(&mut self, file_id: Uuid)
    -> impl Future<Output = PgResult<bool>> + Send;
}

fn for_account(
    account_id: Uuid,
    property_id: Option<Uuid>,
    category: Option<FileCategory>,
) -> file_uploads::BoxedQuery<'static, Pg> {
    let mut query = file_uploads::table
        .filter(dsl::account_id.eq(account_id))
        .filter(dsl::deleted_at.is_null())
        .into_boxed();

    if let Some(property_id) = property_id {
        query = query.filter(dsl::property_id.eq(property_id));
    }
    if let Some(category) = category {
        query = query.filter(dsl::category.eq(category));
    }

    query
}

impl FileUploadRepository for PgConnection {
    async fn create_file_upload(&mut self, new_file: NewFileUpload) -> PgResult<FileUpload> {
        let file = diesel::insert_into(file_uploads::table)
            .values(&new_file)
            .returning(FileUpload::as_returning())
            .get_result(self)
            .await?;

        Ok(file)
    }

    async fn find_file_upload_by_id(&mut self, file_id: Uuid) -> PgResult<Option<FileUpload>> {
        let file = file_uploads::table
            .filter(dsl::id.eq(file_id))
            .filter(dsl::deleted_at.is_null())
            .select(FileUpload::as_select())
            .first(self)
            .await
            .optional()?;

        Ok(file)
    }

    async fn list_file_uploads(
        &mut self,
        account_id: Uuid,
        property_id: Option<Uuid>,
        category: Option<FileCategory>,
        pagination: OffsetPagination,
    ) -> PgResult<OffsetPage<FileUpload>> {
        let total = for_account(account_id, property_id, category)
            .count()
            .get_result(self)
            .await?;

        let items = for_account(account_id, property_id, category)
            .order((dsl::created_at.desc(), dsl::id.asc()))
            .limit(pagination.limit)
            .offset(pagination.offset)
            .select(FileUpload::as_select())
            .load(self)
            .await?;

        Ok(OffsetPage::new(items, total))
    }

    async fn delete_file_upload(&mut self, file_id: Uuid) -> PgResult<bool> {
        let affected = diesel::update(file_uploads::table)
            .filter(dsl::id.eq(file_id))
            .filter(dsl::deleted_at.is_null())
            .set(dsl::deleted_at.eq(super::now()))
            .execute(self)
            .await?;

        Ok(affected > 0)
    }
}
