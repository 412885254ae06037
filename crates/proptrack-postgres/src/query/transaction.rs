use diesel::pg::Pg;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use uuid::Uuid;

use crate::model::{NewTransaction, Transaction, UpdateTransaction};
use crate::schema::transactions::{self, dsl};
use crate::types::{OffsetPage, OffsetPagination, TransactionFilter};
use crate::{PgConnection, PgResult};

/// Income and expense persistence.
pub trait TransactionRepository {
    fn create_transaction(
        &mut self,
        new_transaction: NewTransaction,
    ) -> impl Future<Output = PgResult<Transaction>> + Send;

    fn find_transaction_by_id(
        &mut self,
        transaction_id: Uuid,
    ) -> impl Future<Output = PgResult<Option<Transaction>>> + Send;

    /// Lists an account's transactions, latest first.
    fn list_transactions(
        &mut self,
        account_id: Uuid,
        filter: TransactionFilter,
        pagination: OffsetPagination,
    ) -> impl Future<Output = PgResult<OffsetPage<Transaction>>> + Send;

    /// Loads every matching transaction, for aggregation.
    fn list_all_transactions(
        &mut self,
        account_id: Uuid,
        filter: TransactionFilter,
    ) -> impl Future<Output = PgResult<Vec<Transaction>>> + Send;

    fn update_transaction(
        &mut self,
        transaction_id: Uuid,
        updates: UpdateTransaction,
    ) -> impl Future<Output = PgResult<Transaction>> + Send;

    /// Soft-deletes a transaction. Returns `false` if there was nothing to delete.
    fn delete_transaction(
        &mut self,
        transaction_id: Uuid,
    ) -> impl Future<Output = PgResult<bool>> + Send;
}

fn for_account(account_id: Uuid, filter: TransactionFilter) -> transactions::BoxedQuery<'static, Pg> {
    let mut query = transactions::table
        .filter(dsl::account_id.eq(account_id))
        .filter(dsl::deleted_at.is_null())
        .into_boxed();

    if let Some(from) = filter.from {
        query = query.filter(dsl::transaction_date.ge(jiff_diesel::Date::from(from)));
    }
    if let Some(to) = filter.to {
        query = query.filter(dsl::transaction_date.le(jiff_diesel::Date::from(to)));
    }
    if let Some(transaction_type) = filter.transaction_type {
        query = query.filter(dsl::transaction_type.eq(transaction_type));
    }
    if let Some(category) = filter.category {
        query = query.filter(dsl::category.eq(category));
    }
    if let Some(property_id) = filter.property_id {
        query = query.filter(dsl::property_id.eq(property_id));
    }

    query
}

impl TransactionRepository for PgConnection {
    async fn create_transaction(&mut self, new_transaction: NewTransaction) -> PgResult<Transaction> {
        let transaction = diesel::insert_into(transactions::table)
            .values(&new_transaction)
            .returning(Transaction::as_returning())
            .get_result(self)
            .await?;

        Ok(transaction)
    }

    async fn find_transaction_by_id(&mut self, transaction_id: Uuid) -> PgResult<Option<Transaction>> {
        let transaction = transactions::table
            .filter(dsl::id.eq(transaction_id))
            .filter(dsl::deleted_at.is_null())
            .select(Transaction::as_select())
            .first(self)
            .await
            .optional()?;

        Ok(transaction)
    }

    async fn list_transactions(
        &mut self,
        account_id: Uuid,
        filter: TransactionFilter,
        pagination: OffsetPagination,
    ) -> PgResult<OffsetPage<Transaction>> {
        let total = for_account(account_id, filter)
            .count()
            .get_result(self)
            .await?;

        let items = for_account(account_id, filter)
            .order((dsl::transaction_date.desc(), dsl::created_at.desc()))
            .limit(pagination.limit)
            .offset(pagination.offset)
            .select(Transaction::as_select())
            .load(self)
            .await?;

        Ok(OffsetPage::new(items, total))
    }

    async fn list_all_transactions(
        &mut self,
        account_id: Uuid,
        filter: TransactionFilter,
    ) -> PgResult<Vec<Transaction>> {
        let items = for_account(account_id, filter)
            .order(dsl::transaction_date.asc())
            .select(Transaction::as_select())
            .load(self)
            .await?;

        Ok(items)
    }

    async fn update_transaction(
        &mut self,
        transaction_id: Uuid,
        updates: UpdateTransaction,
    ) -> PgResult<Transaction> {
        if updates == UpdateTransaction::default() {
            return Ok(transactions::table
                .filter(dsl::id.eq(transaction_id))
                .filter(dsl::deleted_at.is_null())
                .select(Transaction::as_select())
                .first(self)
                .await?);
        }

        let transaction = diesel::update(transactions::table)
            .filter(dsl::id.eq(transaction_id))
            .filter(dsl::deleted_at.is_null())
            .set(&updates)
            .returning(Transaction::as_returning())
            .get_result(self)
            .await?;

        Ok(transaction)
    }

    async fn delete_transaction(&mut self, transaction_id: Uuid) -> PgResult<bool> {
        let affected = diesel::update(transactions::table)
            .filter(dsl::id.eq(transaction_id))
            .filter(dsl::deleted_at.is_null())
            .set(dsl::deleted_at.eq(super::now()))
            .execute(self)
            .await?;

        Ok(affected > 0)
    }
}
