use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use uuid::Uuid;

use crate::model::{Account, NewAccount, UpdateAccount};
use crate::{PgConnection, PgResult, TRACING_TARGET_QUERY, schema};

/// Account persistence.
pub trait AccountRepository {
    /// Inserts an account; the email address is trimmed and lower-cased.
    fn create_account(
        &mut self,
        new_account: NewAccount,
    ) -> impl Future<Output = PgResult<Account>> + Send;

    fn find_account_by_id(
        &mut self,
        account_id: Uuid,
    ) -> impl Future<Output = PgResult<Option<Account>>> + Send;

    /// Looks an account up by email address, ignoring case.
    fn find_account_by_email(
        &mut self,
        email_address: &str,
    ) -> impl Future<Output = PgResult<Option<Account>>> + Send;

    fn update_account(
        &mut self,
        account_id: Uuid,
        updates: UpdateAccount,
    ) -> impl Future<Output = PgResult<Account>> + Send;

    /// Soft-deletes an account. Returns `false` if there was nothing to delete.
    fn delete_account(&mut self, account_id: Uuid) -> impl Future<Output = PgResult<bool>> + Send;

    /// Returns whether a live account uses the email address.
    fn email_exists(&mut self, email_address: &str)
    -> impl Future<Output = PgResult<bool>> + Send;
}

impl AccountRepository for PgConnection {
    async fn create_account(&mut self, mut new_account: NewAccount) -> PgResult<Account> {
        use schema::accounts;

        new_account.display_name = new_account.display_name.trim().to_owned();
        new_account.email_address = new_account.email_address.trim().to_lowercase();

        let account = diesel::insert_into(accounts::table)
            .values(&new_account)
            .returning(Account::as_returning())
            .get_result(self)
            .await?;

        tracing::debug!(target: TRACING_TARGET_QUERY, account_id = %account.id, "account created");
        Ok(account)
    }

    async fn find_account_by_id(&mut self, account_id: Uuid) -> PgResult<Option<Account>> {
        use schema::accounts::{self, dsl};

        let account = accounts::table
            .filter(dsl::id.eq(account_id))
            .filter(dsl::deleted_at.is_null())
            .select(Account::as_select())
            .first(self)
            .await
            .optional()?;

        Ok(account)
    }

    async fn find_account_by_email(&mut self, email_address: &str) -> PgResult<Option<Account>> {
        use schema::accounts::{self, dsl};

        let account = accounts::table
            .filter(dsl::email_address.eq(email_address.trim().to_lowercase()))
            .filter(dsl::deleted_at.is_null())
            .select(Account::as_select())
            .first(self)
            .await
            .optional()?;

        Ok(account)
    }

    async fn update_account(
        &mut self,
        account_id: Uuid,
        mut updates: UpdateAccount,
    ) -> PgResult<Account> {
        use schema::accounts::{self, dsl};

        if let Some(name) = updates.display_name.as_mut() {
            *name = name.trim().to_owned();
        }
        if let Some(email) = updates.email_address.as_mut() {
            *email = email.trim().to_lowercase();
        }

        if updates == UpdateAccount::default() {
            return Ok(accounts::table
                .filter(dsl::id.eq(account_id))
                .filter(dsl::deleted_at.is_null())
                .select(Account::as_select())
                .first(self)
                .await?);
        }

        let account = diesel::update(accounts::table)
            .filter(dsl::id.eq(account_id))
            .filter(dsl::deleted_at.is_null())
            .set(&updates)
            .returning(Account::as_returning())
            .get_result(self)
            .await?;

        Ok(account)
    }

    async fn delete_account(&mut self, account_id: Uuid) -> PgResult<bool> {
        use schema::accounts::{self, dsl};

        let affected = diesel::update(accounts::table)
            .filter(dsl::id.eq(account_id))
            .filter(dsl::deleted_at.is_null())
            .set(dsl::deleted_at.eq(super::now()))
            .execute(self)
            .await?;

        Ok(affected > 0)
    }

    async fn email_exists(&mut self, email_address: &str) -> PgResult<bool> {
        use schema::accounts::{self, dsl};

        let exists = diesel::select(diesel::dsl::exists(
            accounts::table
                .filter(dsl::email_address.eq(email_address.trim().to_lowercase()))
                .filter(dsl::deleted_at.is_null()),
        ))
        .get_result(self)
        .await?;

        Ok(exists)
    }
}
