use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use uuid::Uuid;

use crate::model::{LandRegistryImport, NewLandRegistryImport, UpdateLandRegistryImport};
use crate::schema::land_registry_imports::{self, dsl};
use crate::types::{OffsetPage, OffsetPagination};
use crate::{PgConnection, PgResult, TRACING_TARGET_QUERY};

/// Import job persistence.
pub trait LandRegistryImportRepository {
    fn create_import(
        &mut self,
        new_import: NewLandRegistryImport,
    ) -> impl Future<Output = PgResult<LandRegistryImport>> + Send;

    fn find_import_by_id(
        &mut self,
        import_id: Uuid,
    ) -> impl Future<Output = PgResult<Option<LandRegistryImport>>> + Send;

    /// Lists imports started by an account, newest first.
    fn list_imports_for_account(
        &mut self,
        account_id: Uuid,
        pagination: OffsetPagination,
    ) -> impl Future<Output = PgResult<OffsetPage<LandRegistryImport>>> + Send;

    /// Writes status, counters and errors of an import.
    fn update_import(
        &mut self,
        import_id: Uuid,
        updates: UpdateLandRegistryImport,
    ) -> impl Future<Output = PgResult<LandRegistryImport>> + Send;
}

impl LandRegistryImportRepository for PgConnection {
    async fn create_import(
        &mut self,
        new_import: NewLandRegistryImport,
    ) -> PgResult<LandRegistryImport> {
        let import = diesel::insert_into(land_registry_imports::table)
            .values(&new_import)
            .returning(LandRegistryImport::as_returning())
            .get_result(self)
            .await?;

        tracing::debug!(target: TRACING_TARGET_QUERY, import_id = %import.id, "import recorded");
        Ok(import)
    }

    async fn find_import_by_id(&mut self, import_id: Uuid) -> PgResult<Option<LandRegistryImport>> {
        let import = land_registry_imports::table
            .filter(dsl::id.eq(import_id))
            .select(LandRegistryImport::as_select())
            .first(self)
            .await
            .optional()?;

        Ok(import)
    }

    async fn list_imports_for_account(
        &mut self,
        account_id: Uuid,
        pagination: OffsetPagination,
    ) -> PgResult<OffsetPage<LandRegistryImport>> {
        let total = land_registry_imports::table
            .filter(dsl::account_id.eq(account_id))
            .count()
            .get_result(self)
            .await?;

        let items = land_registry_imports::table
            .filter(dsl::account_id.eq(account_id))
            .order(dsl::created_at.desc())
            .limit(pagination.limit)
            .offset(pagination.offset)
            .select(LandRegistryImport::as_select())
            .load(self)
            .await?;

        Ok(OffsetPage::new(items, total))
    }

    async fn update_import(
        &mut self,
        import_id: Uuid,
        updates: UpdateLandRegistryImport,
    ) -> PgResult<LandRegistryImport> {
        if updates == UpdateLandRegistryImport::default() {
            return Ok(land_registry_imports::table
                .filter(dsl::id.eq(import_id))
                .select(LandRegistryImport::as_select())
                .first(self)
                .await?);
        }

        let import = diesel::update(land_registry_imports::table)
            .filter(dsl::id.eq(import_id))
            .set(&updates)
            .returning(LandRegistryImport::as_returning())
            .get_result(self)
            .await?;

        Ok(import)
    }
}
