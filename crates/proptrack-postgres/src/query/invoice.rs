use diesel::pg::Pg;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use jiff::Timestamp;
use uuid::Uuid;

use crate::model::{Invoice, NewInvoice, UpdateInvoice};
use crate::schema::invoices::{self, dsl};
use crate::types::{InvoiceFilter, InvoiceStatus, OffsetPage, OffsetPagination};
use crate::{PgConnection, PgResult};

/// Invoice persistence.
pub trait InvoiceRepository {
    fn create_invoice(
        &mut self,
        new_invoice: NewInvoice,
    ) -> impl Future<Output = PgResult<Invoice>> + Send;

    fn find_invoice_by_id(
        &mut self,
        invoice_id: Uuid,
    ) -> impl Future<Output = PgResult<Option<Invoice>>> + Send;

    /// Lists an account's invoices, latest issue date first.
    fn list_invoices(
        &mut self,
        account_id: Uuid,
        filter: InvoiceFilter,
        pagination: OffsetPagination,
    ) -> impl Future<Output = PgResult<OffsetPage<Invoice>>> + Send;

    /// Lists every issued or overdue invoice of an account, earliest due date first.
    fn list_outstanding_invoices(
        &mut self,
        account_id: Uuid,
        property_id: Option<Uuid>,
    ) -> impl Future<Output = PgResult<Vec<Invoice>>> + Send;

    fn update_invoice(
        &mut self,
        invoice_id: Uuid,
        updates: UpdateInvoice,
    ) -> impl Future<Output = PgResult<Invoice>> + Send;

    /// Sets the status to `paid` and records the payment time.
    ///
    /// Only draft, issued and overdue invoices change. Returns `None` when
    /// the invoice is missing or was settled in the meantime.
    fn mark_invoice_paid(
        &mut self,
        invoice_id: Uuid,
        paid_at: Timestamp,
    ) -> impl Future<Output = PgResult<Option<Invoice>>> + Send;

    /// Soft-deletes an invoice. Returns `false` if there was nothing to delete.
    fn delete_invoice(&mut self, invoice_id: Uuid) -> impl Future<Output = PgResult<bool>> + Send;

    /// Proposes the next `INV-NNNNNN` number for an account.
    ///
    /// Numbers are derived from the count of the account's invoices,
    /// including deleted ones; the unique index rejects collisions.
    fn next_invoice_number(
        &mut self,
        account_id: Uuid,
    ) -> impl Future<Output = PgResult<String>> + Send;
}

fn for_account(account_id: Uuid, filter: InvoiceFilter) -> invoices::BoxedQuery<'static, Pg> {
    let mut query = invoices::table
        .filter(dsl::account_id.eq(account_id))
        .filter(dsl::deleted_at.is_null())
        .into_boxed();

    if let Some(status) = filter.status {
        query = query.filter(dsl::status.eq(status));
    }
    if let Some(property_id) = filter.property_id {
        query = query.filter(dsl::property_id.eq(property_id));
    }
    if let Some(tenancy_id) = filter.tenancy_id {
        query = query.filter(dsl::tenancy_id.eq(tenancy_id));
    }

    query
}

/// Formats the invoice number following `count` existing invoices.
pub(crate) fn format_invoice_number(count: i64) -> String {
    format!("INV-{:06}", count + 1)
}

impl InvoiceRepository for PgConnection {
    async fn create_invoice(&mut self, new_invoice: NewInvoice) -> PgResult<Invoice> {
        let invoice = diesel::insert_into(invoices::table)
            .values(&new_invoice)
            .returning(Invoice::as_returning())
            .get_result(self)
            .await?;

        Ok(invoice)
    }

    async fn find_invoice_by_id(&mut self, invoice_id: Uuid) -> PgResult<Option<Invoice>> {
        let invoice = invoices::table
            .filter(dsl::id.eq(invoice_id))
            .filter(dsl::deleted_at.is_null())
            .select(Invoice::as_select())
            .first(self)
            .await
            .optional()?;

        Ok(invoice)
    }

    async fn list_invoices(
        &mut self,
        account_id: Uuid,
        filter: InvoiceFilter,
        pagination: OffsetPagination,
    ) -> PgResult<OffsetPage<Invoice>> {
        let total = for_account(account_id, filter)
            .count()
            .get_result(self)
            .await?;

        let items = for_account(account_id, filter)
            .order((dsl::issue_date.desc(), dsl::invoice_number.desc()))
            .limit(pagination.limit)
            .offset(pagination.offset)
            .select(Invoice::as_select())
            .load(self)
            .await?;

        Ok(OffsetPage::new(items, total))
    }

    async fn list_outstanding_invoices(
        &mut self,
        account_id: Uuid,
        property_id: Option<Uuid>,
    ) -> PgResult<Vec<Invoice>> {
        let filter = InvoiceFilter {
            property_id,
            ..InvoiceFilter::default()
        };

        let invoices = for_account(account_id, filter)
            .filter(
                dsl::status
                    .eq(InvoiceStatus::Issued)
                    .or(dsl::status.eq(InvoiceStatus::Overdue)),
            )
            .order(dsl::due_date.asc())
            .select(Invoice::as_select())
            .load(self)
            .await?;

        Ok(invoices)
    }

    async fn update_invoice(&mut self, invoice_id: Uuid, updates: UpdateInvoice) -> PgResult<Invoice> {
        if updates == UpdateInvoice::default() {
            return Ok(invoices::table
                .filter(dsl::id.eq(invoice_id))
                .filter(dsl::deleted_at.is_null())
                .select(Invoice::as_select())
                .first(self)
                .await?);
        }

        let invoice = diesel::update(invoices::table)
            .filter(dsl::id.eq(invoice_id))
            .filter(dsl::deleted_at.is_null())
            .set(&updates)
            .returning(Invoice::as_returning())
            .get_result(self)
            .await?;

        Ok(invoice)
    }

    async fn mark_invoice_paid(
        &mut self,
        invoice_id: Uuid,
        paid_at: Timestamp,
    ) -> PgResult<Option<Invoice>> {
        let updates = UpdateInvoice {
            status: Some(InvoiceStatus::Paid),
            paid_at: Some(Some(paid_at.into())),
            ..UpdateInvoice::default()
        };

        let invoice = diesel::update(invoices::table)
            .filter(dsl::id.eq(invoice_id))
            .filter(dsl::deleted_at.is_null())
            .filter(dsl::status.eq_any(InvoiceStatus::EDITABLE))
            .set(&updates)
            .returning(Invoice::as_returning())
            .get_result(self)
            .await
            .optional()?;

        Ok(invoice)
    }

    async fn delete_invoice(&mut self, invoice_id: Uuid) -> PgResult<bool> {
        let affected = diesel::update(invoices::table)
            .filter(dsl::id.eq(invoice_id))
            .filter(dsl::deleted_at.is_null())
            .set(dsl::deleted_at.eq(super::now()))
            .execute(self)
            .await?;

        Ok(affected > 0)
    }

    async fn next_invoice_number(&mut self, account_id: Uuid) -> PgResult<String> {
        let count: i64 = invoices::table
            .filter(dsl::account_id.eq(account_id))
            .count()
            .get_result(self)
            .await?;

        Ok(format_invoice_number(count))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invoice_numbers_are_zero_padded() {
        assert_eq!(format_invoice_number(0), "INV-000001");
        assert_eq!(format_invoice_number(41), "INV-000042");
    }
}
