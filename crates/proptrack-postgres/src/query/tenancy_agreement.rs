use diesel::pg::Pg;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use uuid::Uuid;

use crate::model::{NewTenancyAgreement, TenancyAgreement, UpdateTenancyAgreement};
use crate::schema::tenancy_agreements::{self, dsl};
use crate::types::{OffsetPage, OffsetPagination, TenancyStatus};
use crate::{PgConnection, PgResult};

/// Tenancy agreement persistence.
pub trait TenancyAgreementRepository {
    fn create_tenancy(
        &mut self,
        new_tenancy: NewTenancyAgreement,
    ) -> impl Future<Output = PgResult<TenancyAgreement>> + Send;

    fn find_tenancy_by_id(
        &mut self,
        tenancy_id: Uuid,
    ) -> impl Future<Output = PgResult<Option<TenancyAgreement>>> + Send;

    /// Lists a landlord's tenancies, newest start date first.
    fn list_tenancies_for_landlord(
        &mut self,
        landlord_id: Uuid,
        property_id: Option<Uuid>,
        status: Option<TenancyStatus>,
        pagination: OffsetPagination,
    ) -> impl Future<Output = PgResult<OffsetPage<TenancyAgreement>>> + Send;

    /// Lists the active tenancies of a property; at most one is expected.
    fn list_active_tenancies_for_property(
        &mut self,
        property_id: Uuid,
    ) -> impl Future<Output = PgResult<Vec<TenancyAgreement>>> + Send;

    fn update_tenancy(
        &mut self,
        tenancy_id: Uuid,
        updates: UpdateTenancyAgreement,
    ) -> impl Future<Output = PgResult<TenancyAgreement>> + Send;

    /// Soft-deletes a tenancy. Returns `false` if there was nothing to delete.
    fn delete_tenancy(&mut self, tenancy_id: Uuid) -> impl Future<Output = PgResult<bool>> + Send;
}

fn for_landlord(
    landlord_id: Uuid,
    property_id: Option<Uuid>,
    status: Option<TenancyStatus>,
) -> tenancy_agreements::BoxedQuery<'static, Pg> {
    let mut query = tenancy_agreements::table
        .filter(dsl::landlord_id.eq(landlord_id))
        .filter(dsl::deleted_at.is_null())
        .into_boxed();

    if let Some(property_id) = property_id {
        query = query.filter(dsl::property_id.eq(property_id));
    }
    if let Some(status) = status {
        query = query.filter(dsl::status.eq(status));
    }

    query
}

impl TenancyAgreementRepository for PgConnection {
    async fn create_tenancy(
        &mut self,
        new_tenancy: NewTenancyAgreement,
    ) -> PgResult<TenancyAgreement> {
        let tenancy = diesel::insert_into(tenancy_agreements::table)
            .values(&new_tenancy)
            .returning(TenancyAgreement::as_returning())
            .get_result(self)
            .await?;

        Ok(tenancy)
    }

    async fn find_tenancy_by_id(&mut self, tenancy_id: Uuid) -> PgResult<Option<TenancyAgreement>> {
        let tenancy = tenancy_agreements::table
            .filter(dsl::id.eq(tenancy_id))
            .filter(dsl::deleted_at.is_null())
            .select(TenancyAgreement::as_select())
            .first(self)
            .await
            .optional()?;

        Ok(tenancy)
    }

    async fn list_tenancies_for_landlord(
        &mut self,
        landlord_id: Uuid,
        property_id: Option<Uuid>,
        status: Option<TenancyStatus>,
        pagination: OffsetPagination,
    ) -> PgResult<OffsetPage<TenancyAgreement>> {
        let total = for_landlord(landlord_id, property_id, status)
            .count()
            .get_result(self)
            .await?;

        let items = for_landlord(landlord_id, property_id, status)
            .order((dsl::start_date.desc(), dsl::id.asc()))
            .limit(pagination.limit)
            .offset(pagination.offset)
            .select(TenancyAgreement::as_select())
            .load(self)
            .await?;

        Ok(OffsetPage::new(items, total))
    }

    async fn list_active_tenancies_for_property(
        &mut self,
        property_id: Uuid,
    ) -> PgResult<Vec<TenancyAgreement>> {
        let tenancies = tenancy_agreements::table
            .filter(dsl::property_id.eq(property_id))
            .filter(dsl::status.eq(TenancyStatus::Active))
            .filter(dsl::deleted_at.is_null())
            .select(TenancyAgreement::as_select())
            .load(self)
            .await?;

        Ok(tenancies)
    }

    async fn update_tenancy(
        &mut self,
        tenancy_id: Uuid,
        updates: UpdateTenancyAgreement,
    ) -> PgResult<TenancyAgreement> {
        if updates == UpdateTenancyAgreement::default() {
            return Ok(tenancy_agreements::table
                .filter(dsl::id.eq(tenancy_id))
                .filter(dsl::deleted_at.is_null())
                .select(TenancyAgreement::as_select())
                .first(self)
                .await?);
        }

        let tenancy = diesel::update(tenancy_agreements::table)
            .filter(dsl::id.eq(tenancy_id))
            .filter(dsl::deleted_at.is_null())
            .set(&updates)
            .returning(TenancyAgreement::as_returning())
            .get_result(self)
            .await?;

        Ok(tenancy)
    }

    async fn delete_tenancy(&mut self, tenancy_id: Uuid) -> PgResult<bool> {
        let affected = diesel::update(tenancy_agreements::table)
            .filter(dsl::id.eq(tenancy_id))
            .filter(dsl::deleted_at.is_null())
            .set(dsl::deleted_at.eq(super::now()))
            .execute(self)
            .await?;

        Ok(affected > 0)
    }
}
