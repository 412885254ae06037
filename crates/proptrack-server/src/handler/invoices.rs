//! Invoice handlers.
//!
//! Invoices are numbered per account (`INV-000001`, ...). Paid and
//! cancelled invoices are read-only; a payment is recorded through the pay
//! endpoint, which books the matching income transaction in the same
//! database transaction.

use aide::axum::ApiRouter;
use aide::transform::TransformOperation;
use axum::extract::State;
use axum::http::StatusCode;
use jiff::{Timestamp, Zoned};
use proptrack_postgres::model::{self, NewTransaction};
use proptrack_postgres::query::{InvoiceRepository, TransactionRepository};
use proptrack_postgres::scoped_futures::ScopedFutureExt;
use proptrack_postgres::types::{
    InvoiceStatus, OffsetPagination, TransactionCategory, TransactionType,
};
use proptrack_postgres::{PgClient, PgConn, PgError};
use uuid::Uuid;

use super::properties::find_owned_property;
use super::tenancies::find_tenancy;
use crate::extract::{AuthClaims, AuthProvider, AuthState, Json, Path, PgPool, Query, ValidateJson};
use crate::handler::request::{
    CreateInvoice, InvoicePathParams, InvoiceQuery, Pagination, PayInvoice, UpdateInvoice,
};
use crate::handler::response::{
    ErrorResponse, Invoice, InvoicePayment, InvoicesPage, Transaction,
};
use crate::handler::{Error, ErrorKind, Result};
use crate::service::ServiceState;

/// Tracing target for invoice operations.
const TRACING_TARGET: &str = "proptrack_server::handler::invoices";

async fn find_invoice(conn: &mut PgConn, invoice_id: Uuid) -> Result<model::Invoice> {
    conn.find_invoice_by_id(invoice_id).await?.ok_or_else(|| {
        ErrorKind::NotFound
            .with_message("Invoice not found")
            .with_context(format!("Invoice ID: {invoice_id}"))
            .with_resource("invoice")
    })
}

/// Checks that the property and tenancy an invoice refers to belong to the
/// caller and to each other.
async fn check_links(
    conn: &mut PgConn,
    auth_claims: &AuthClaims,
    property_id: Option<Uuid>,
    tenancy_id: Option<Uuid>,
) -> Result<()> {
    if let Some(property_id) = property_id {
        find_owned_property(conn, auth_claims, property_id).await?;
    }

    if let Some(tenancy_id) = tenancy_id {
        let tenancy = find_tenancy(conn, tenancy_id).await?;
        auth_claims.authorize_owner(Some(tenancy.landlord_id), "tenancy")?;

        if property_id.is_some_and(|id| id != tenancy.property_id) {
            return Err(ErrorKind::BadRequest
                .with_message("The tenancy does not belong to the given property")
                .with_resource("invoice"));
        }
    }

    Ok(())
}

fn already_settled() -> Error<'static> {
    ErrorKind::Conflict
        .with_message("The invoice has already been settled")
        .with_resource("invoice")
}

fn ensure_editable(invoice: &model::Invoice) -> Result<()> {
    if invoice.status.is_editable() {
        return Ok(());
    }

    Err(ErrorKind::Conflict
        .with_message(format!("The invoice is already {}", invoice.status))
        .with_resource("invoice"))
}

fn ensure_deletable(invoice: &model::Invoice) -> Result<()> {
    if !invoice.is_paid() {
        return Ok(());
    }

    Err(ErrorKind::Conflict
        .with_message("Paid invoices cannot be deleted")
        .with_resource("invoice"))
}

/// Category of the income booked when an invoice is paid.
fn payment_category(invoice: &model::Invoice) -> TransactionCategory {
    match invoice.tenancy_id {
        Some(_) => TransactionCategory::Rent,
        None => TransactionCategory::Other,
    }
}

/// Creates an invoice with the next free number of the caller.
#[tracing::instrument(skip_all, fields(account_id = %auth_state.account_id))]
async fn create_invoice(
    State(pg_client): State<PgClient>,
    AuthState(auth_state): AuthState,
    ValidateJson(request): ValidateJson<CreateInvoice>,
) -> Result<(StatusCode, Json<Invoice>)> {
    tracing::debug!(target: TRACING_TARGET, "creating invoice");

    let mut conn = pg_client.get_connection().await?;
    check_links(&mut conn, &auth_state, request.property_id, request.tenancy_id).await?;

    let invoice_number = conn.next_invoice_number(auth_state.account_id).await?;
    let invoice = conn
        .create_invoice(request.into_model(auth_state.account_id, invoice_number))
        .await?;

    tracing::info!(
        target: TRACING_TARGET,
        invoice_id = %invoice.id,
        invoice_number = %invoice.invoice_number,
        status = %invoice.status,
        "invoice created"
    );

    Ok((StatusCode::CREATED, Json(Invoice::from_model(invoice))))
}

fn create_invoice_docs(op: TransformOperation) -> TransformOperation {
    op.summary("Create invoice")
        .description(
            "Creates a draft or issued invoice. The number is assigned by the server and the \
             total is the sum of the net and tax amounts.",
        )
        .response::<201, Json<Invoice>>()
        .response::<400, Json<ErrorResponse>>()
        .response::<401, Json<ErrorResponse>>()
        .response::<403, Json<ErrorResponse>>()
        .response::<404, Json<ErrorResponse>>()
        .response::<409, Json<ErrorResponse>>()
}

/// Lists the caller's invoices.
#[tracing::instrument(skip_all, fields(account_id = %auth_state.account_id))]
async fn list_invoices(
    PgPool(mut conn): PgPool,
    AuthState(auth_state): AuthState,
    Query(query): Query<InvoiceQuery>,
    Query(pagination): Query<Pagination>,
) -> Result<(StatusCode, Json<InvoicesPage>)> {
    let pagination = OffsetPagination::from(pagination);
    let page = conn
        .list_invoices(auth_state.account_id, query.into(), pagination)
        .await?;

    tracing::debug!(
        target: TRACING_TARGET,
        count = page.items.len(),
        total = page.total,
        "invoices listed"
    );

    let today = Zoned::now().date();
    let page = InvoicesPage::from_offset_page(page, pagination, |invoice| {
        Invoice::from_model_on(invoice, today)
    });
    Ok((StatusCode::OK, Json(page)))
}

fn list_invoices_docs(op: TransformOperation) -> TransformOperation {
    op.summary("List invoices")
        .description("Lists the caller's invoices, latest issue date first.")
        .response::<200, Json<InvoicesPage>>()
        .response::<400, Json<ErrorResponse>>()
        .response::<401, Json<ErrorResponse>>()
}

/// Retrieves an invoice.
#[tracing::instrument(
    skip_all,
    fields(
        account_id = %auth_state.account_id,
        invoice_id = %path_params.invoice_id,
    )
)]
async fn read_invoice(
    PgPool(mut conn): PgPool,
    AuthState(auth_state): AuthState,
    Path(path_params): Path<InvoicePathParams>,
) -> Result<(StatusCode, Json<Invoice>)> {
    let invoice = find_invoice(&mut conn, path_params.invoice_id).await?;
    auth_state.authorize_owner(Some(invoice.account_id), "invoice")?;

    tracing::debug!(target: TRACING_TARGET, "invoice read");
    Ok((StatusCode::OK, Json(Invoice::from_model(invoice))))
}

fn read_invoice_docs(op: TransformOperation) -> TransformOperation {
    op.summary("Get invoice")
        .description("Returns an invoice of the caller.")
        .response::<200, Json<Invoice>>()
        .response::<401, Json<ErrorResponse>>()
        .response::<403, Json<ErrorResponse>>()
        .response::<404, Json<ErrorResponse>>()
}

/// Updates an unpaid invoice.
#[tracing::instrument(
    skip_all,
    fields(
        account_id = %auth_state.account_id,
        invoice_id = %path_params.invoice_id,
    )
)]
async fn update_invoice(
    State(pg_client): State<PgClient>,
    AuthState(auth_state): AuthState,
    Path(path_params): Path<InvoicePathParams>,
    ValidateJson(request): ValidateJson<UpdateInvoice>,
) -> Result<(StatusCode, Json<Invoice>)> {
    if request.status == Some(InvoiceStatus::Paid) {
        return Err(ErrorKind::BadRequest
            .with_message("Payments are recorded through the pay endpoint")
            .with_suggestion("POST /invoices/{invoiceId}/pay/")
            .with_resource("invoice"));
    }

    let mut conn = pg_client.get_connection().await?;
    let existing = find_invoice(&mut conn, path_params.invoice_id).await?;
    auth_state.authorize_owner(Some(existing.account_id), "invoice")?;
    ensure_editable(&existing)?;

    request.validate_dates(existing.issue_date.into(), existing.due_date.into())?;

    if request.property_id.is_some() || request.tenancy_id.is_some() {
        check_links(
            &mut conn,
            &auth_state,
            request.property_id.or(existing.property_id),
            request.tenancy_id.or(existing.tenancy_id),
        )
        .await?;
    }

    let changes = request.into_model(&existing.net_amount, &existing.tax_amount);
    let invoice = conn.update_invoice(existing.id, changes).await?;

    tracing::info!(target: TRACING_TARGET, status = %invoice.status, "invoice updated");
    Ok((StatusCode::OK, Json(Invoice::from_model(invoice))))
}

fn update_invoice_docs(op: TransformOperation) -> TransformOperation {
    op.summary("Update invoice")
        .description(
            "Changes a draft, issued or overdue invoice. The total is recomputed when an \
             amount changes. Invoices cannot be marked paid here.",
        )
        .response::<200, Json<Invoice>>()
        .response::<400, Json<ErrorResponse>>()
        .response::<401, Json<ErrorResponse>>()
        .response::<403, Json<ErrorResponse>>()
        .response::<404, Json<ErrorResponse>>()
        .response::<409, Json<ErrorResponse>>()
}

/// Records the payment of an invoice.
#[tracing::instrument(
    skip_all,
    fields(
        account_id = %auth_state.account_id,
        invoice_id = %path_params.invoice_id,
    )
)]
async fn pay_invoice(
    State(pg_client): State<PgClient>,
    AuthState(auth_state): AuthState,
    Path(path_params): Path<InvoicePathParams>,
    ValidateJson(request): ValidateJson<PayInvoice>,
) -> Result<(StatusCode, Json<InvoicePayment>)> {
    let mut conn = pg_client.get_connection().await?;
    let existing = find_invoice(&mut conn, path_params.invoice_id).await?;
    auth_state.authorize_owner(Some(existing.account_id), "invoice")?;
    ensure_editable(&existing)?;

    let transaction_date = request.paid_on.unwrap_or_else(|| Zoned::now().date());
    let payment = NewTransaction {
        account_id: existing.account_id,
        property_id: existing.property_id,
        invoice_id: Some(existing.id),
        transaction_type: TransactionType::Income,
        category: payment_category(&existing),
        amount: existing.total_amount.clone(),
        description: Some(format!("Payment of invoice {}", existing.invoice_number)),
        reference: request.reference.map(|reference| reference.trim().to_owned()),
        transaction_date: transaction_date.into(),
    };

    // The status is checked again by the update, so concurrent payments
    // book a single transaction.
    let invoice_id = existing.id;
    let paid = conn
        .transaction(|conn| {
            async move {
                let invoice = conn.mark_invoice_paid(invoice_id, Timestamp::now()).await?;
                let Some(invoice) = invoice else {
                    return Ok::<_, PgError>(None);
                };
                let transaction = conn.create_transaction(payment).await?;
                Ok(Some((invoice, transaction)))
            }
            .scope_boxed()
        })
        .await?;

    let Some((invoice, transaction)) = paid else {
        tracing::warn!(target: TRACING_TARGET, "invoice settled by a concurrent request");
        return Err(already_settled());
    };

    tracing::info!(
        target: TRACING_TARGET,
        transaction_id = %transaction.id,
        amount = %transaction.amount,
        "invoice paid"
    );

    let payment = InvoicePayment {
        invoice: Invoice::from_model(invoice),
        transaction: Transaction::from_model(transaction),
    };
    Ok((StatusCode::OK, Json(payment)))
}

fn pay_invoice_docs(op: TransformOperation) -> TransformOperation {
    op.summary("Pay invoice")
        .description(
            "Marks the invoice paid and books its total as income in one step. Rent \
             invoices (with a tenancy) are booked as `rent`, all others as `other`.",
        )
        .response::<200, Json<InvoicePayment>>()
        .response::<400, Json<ErrorResponse>>()
        .response::<401, Json<ErrorResponse>>()
        .response::<403, Json<ErrorResponse>>()
        .response::<404, Json<ErrorResponse>>()
        .response::<409, Json<ErrorResponse>>()
}

/// Deletes an invoice.
#[tracing::instrument(
    skip_all,
    fields(
        account_id = %auth_state.account_id,
        invoice_id = %path_params.invoice_id,
    )
)]
async fn delete_invoice(
    PgPool(mut conn): PgPool,
    AuthState(auth_state): AuthState,
    Path(path_params): Path<InvoicePathParams>,
) -> Result<StatusCode> {
    let invoice = find_invoice(&mut conn, path_params.invoice_id).await?;
    auth_state.authorize_owner(Some(invoice.account_id), "invoice")?;

    ensure_deletable(&invoice)?;

    conn.delete_invoice(invoice.id).await?;

    tracing::info!(target: TRACING_TARGET, "invoice deleted");
    Ok(StatusCode::NO_CONTENT)
}

fn delete_invoice_docs(op: TransformOperation) -> TransformOperation {
    op.summary("Delete invoice")
        .description("Soft-deletes an unpaid invoice. Its number is not reused.")
        .response::<204, ()>()
        .response::<401, Json<ErrorResponse>>()
        .response::<403, Json<ErrorResponse>>()
        .response::<404, Json<ErrorResponse>>()
        .response::<409, Json<ErrorResponse>>()
}

/// Returns routes for invoicing.
pub fn routes() -> ApiRouter<ServiceState> {
    use aide::axum::routing::*;

    ApiRouter::new()
        .api_route(
            "/invoices/",
            post_with(create_invoice, create_invoice_docs)
                .get_with(list_invoices, list_invoices_docs),
        )
        .api_route(
            "/invoices/{invoiceId}/",
            get_with(read_invoice, read_invoice_docs)
                .patch_with(update_invoice, update_invoice_docs)
                .delete_with(delete_invoice, delete_invoice_docs),
        )
        .api_route(
            "/invoices/{invoiceId}/pay/",
            post_with(pay_invoice, pay_invoice_docs),
        )
        .with_path_items(|item| item.tag("Invoices"))
}

#[cfg(test)]
mod tests {
    use bigdecimal::BigDecimal;
    use jiff::civil::date;
    use proptrack_postgres::types::TransactionConstraints;
    use serde_json::json;

    use super::*;
    use crate::handler::test::create_test_server_signed_in;

    fn invoice(status: InvoiceStatus, tenancy_id: Option<Uuid>) -> model::Invoice {
        let now = Timestamp::now();
        model::Invoice {
            id: Uuid::new_v4(),
            account_id: Uuid::new_v4(),
            property_id: None,
            tenancy_id,
            invoice_number: "INV-000007".into(),
            recipient_name: "Jane Eyre".into(),
            recipient_email: None,
            description: None,
            net_amount: BigDecimal::from(950),
            tax_amount: BigDecimal::from(0),
            total_amount: BigDecimal::from(950),
            currency: "GBP".into(),
            status,
            issue_date: date(2024, 10, 1).into(),
            due_date: date(2024, 10, 14).into(),
            paid_at: None,
            created_at: now.into(),
            updated_at: now.into(),
            deleted_at: None,
        }
    }

    #[test]
    fn settled_invoices_are_read_only() {
        assert!(ensure_editable(&invoice(InvoiceStatus::Overdue, None)).is_ok());

        let Err(error) = ensure_editable(&invoice(InvoiceStatus::Paid, None)) else {
            panic!("paid invoices must not be editable");
        };
        assert_eq!(error.kind(), ErrorKind::Conflict);
        assert!(ensure_editable(&invoice(InvoiceStatus::Cancelled, None)).is_err());
    }

    #[test]
    fn tenancy_invoices_are_paid_as_rent() {
        let rent = invoice(InvoiceStatus::Issued, Some(Uuid::new_v4()));
        assert_eq!(payment_category(&rent), TransactionCategory::Rent);

        let repair = invoice(InvoiceStatus::Issued, None);
        assert_eq!(payment_category(&repair), TransactionCategory::Other);
    }

    #[test]
    fn paid_invoices_cannot_be_deleted() {
        assert!(ensure_deletable(&invoice(InvoiceStatus::Issued, None)).is_ok());
        assert!(ensure_deletable(&invoice(InvoiceStatus::Cancelled, None)).is_ok());

        let Err(error) = ensure_deletable(&invoice(InvoiceStatus::Paid, None)) else {
            panic!("paid invoices must not be deletable");
        };
        assert_eq!(error.kind(), ErrorKind::Conflict);
    }

    #[test]
    fn second_payments_conflict() {
        assert_eq!(already_settled().kind(), ErrorKind::Conflict);

        let error = Error::from(TransactionConstraints::InvoicePaymentUnique);
        assert_eq!(error.kind(), ErrorKind::Conflict);
        assert_eq!(error.resource(), Some("transaction"));
    }

    #[tokio::test]
    async fn updates_cannot_mark_invoices_paid() -> anyhow::Result<()> {
        let claims = AuthClaims::for_account(Uuid::new_v4(), false);
        let server = create_test_server_signed_in(routes(), claims)?;

        let response = server
            .patch(&format!("/invoices/{}/", Uuid::new_v4()))
            .json(&json!({ "status": "paid" }))
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
        let body: serde_json::Value = response.json();
        assert_eq!(body["resource"], "invoice");
        Ok(())
    }
}
