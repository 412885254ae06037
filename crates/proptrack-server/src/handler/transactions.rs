//! Income and expense handlers.

use aide::axum::ApiRouter;
use aide::transform::TransformOperation;
use axum::extract::State;
use axum::http::StatusCode;
use proptrack_postgres::model;
use proptrack_postgres::query::TransactionRepository;
use proptrack_postgres::types::OffsetPagination;
use proptrack_postgres::{PgClient, PgConn};
use uuid::Uuid;
use validator::Validate;

use super::properties::find_owned_property;
use crate::extract::{AuthProvider, AuthState, Json, Path, PgPool, Query, ValidateJson};
use crate::handler::request::{
    CreateTransaction, Pagination, TransactionPathParams, TransactionQuery, UpdateTransaction,
};
use crate::handler::response::{ErrorResponse, Transaction, TransactionsPage};
use crate::handler::{ErrorKind, Result};
use crate::service::ServiceState;

/// Tracing target for transaction operations.
const TRACING_TARGET: &str = "proptrack_server::handler::transactions";

async fn find_transaction(conn: &mut PgConn, transaction_id: Uuid) -> Result<model::Transaction> {
    conn.find_transaction_by_id(transaction_id)
        .await?
        .ok_or_else(|| {
            ErrorKind::NotFound
                .with_message("Transaction not found")
                .with_context(format!("Transaction ID: {transaction_id}"))
                .with_resource("transaction")
        })
}

/// Invoice payments change only together with their invoice.
fn ensure_not_payment(transaction: &model::Transaction) -> Result<()> {
    match transaction.invoice_id {
        None => Ok(()),
        Some(invoice_id) => Err(ErrorKind::Conflict
            .with_message("The transaction records an invoice payment")
            .with_context(format!("Invoice ID: {invoice_id}"))
            .with_resource("transaction")),
    }
}

/// Records income or an expense.
#[tracing::instrument(skip_all, fields(account_id = %auth_state.account_id))]
async fn create_transaction(
    State(pg_client): State<PgClient>,
    AuthState(auth_state): AuthState,
    ValidateJson(request): ValidateJson<CreateTransaction>,
) -> Result<(StatusCode, Json<Transaction>)> {
    let mut conn = pg_client.get_connection().await?;
    if let Some(property_id) = request.property_id {
        find_owned_property(&mut conn, &auth_state, property_id).await?;
    }

    let transaction = conn
        .create_transaction(request.into_model(auth_state.account_id))
        .await?;

    tracing::info!(
        target: TRACING_TARGET,
        transaction_id = %transaction.id,
        transaction_type = %transaction.transaction_type,
        category = %transaction.category,
        "transaction recorded"
    );

    Ok((StatusCode::CREATED, Json(Transaction::from_model(transaction))))
}

fn create_transaction_docs(op: TransformOperation) -> TransformOperation {
    op.summary("Record transaction")
        .description(
            "Records income or an expense, optionally against one of the caller's properties. \
             The amount is always positive.",
        )
        .response::<201, Json<Transaction>>()
        .response::<400, Json<ErrorResponse>>()
        .response::<401, Json<ErrorResponse>>()
        .response::<403, Json<ErrorResponse>>()
        .response::<404, Json<ErrorResponse>>()
}

/// Lists the caller's transactions.
#[tracing::instrument(skip_all, fields(account_id = %auth_state.account_id))]
async fn list_transactions(
    PgPool(mut conn): PgPool,
    AuthState(auth_state): AuthState,
    Query(query): Query<TransactionQuery>,
    Query(pagination): Query<Pagination>,
) -> Result<(StatusCode, Json<TransactionsPage>)> {
    query.validate()?;

    let pagination = OffsetPagination::from(pagination);
    let page = conn
        .list_transactions(auth_state.account_id, query.into(), pagination)
        .await?;

    tracing::debug!(
        target: TRACING_TARGET,
        count = page.items.len(),
        total = page.total,
        "transactions listed"
    );

    let page = TransactionsPage::from_offset_page(page, pagination, Transaction::from_model);
    Ok((StatusCode::OK, Json(page)))
}

fn list_transactions_docs(op: TransformOperation) -> TransformOperation {
    op.summary("List transactions")
        .description(
            "Lists the caller's transactions, latest first. `from` and `to` are inclusive.",
        )
        .response::<200, Json<TransactionsPage>>()
        .response::<400, Json<ErrorResponse>>()
        .response::<401, Json<ErrorResponse>>()
}

/// Retrieves a transaction.
#[tracing::instrument(
    skip_all,
    fields(
        account_id = %auth_state.account_id,
        transaction_id = %path_params.transaction_id,
    )
)]
async fn read_transaction(
    PgPool(mut conn): PgPool,
    AuthState(auth_state): AuthState,
    Path(path_params): Path<TransactionPathParams>,
) -> Result<(StatusCode, Json<Transaction>)> {
    let transaction = find_transaction(&mut conn, path_params.transaction_id).await?;
    auth_state.authorize_owner(Some(transaction.account_id), "transaction")?;

    Ok((StatusCode::OK, Json(Transaction::from_model(transaction))))
}

fn read_transaction_docs(op: TransformOperation) -> TransformOperation {
    op.summary("Get transaction")
        .response::<200, Json<Transaction>>()
        .response::<401, Json<ErrorResponse>>()
        .response::<403, Json<ErrorResponse>>()
        .response::<404, Json<ErrorResponse>>()
}

/// Corrects a transaction.
#[tracing::instrument(
    skip_all,
    fields(
        account_id = %auth_state.account_id,
        transaction_id = %path_params.transaction_id,
    )
)]
async fn update_transaction(
    State(pg_client): State<PgClient>,
    AuthState(auth_state): AuthState,
    Path(path_params): Path<TransactionPathParams>,
    ValidateJson(request): ValidateJson<UpdateTransaction>,
) -> Result<(StatusCode, Json<Transaction>)> {
    let mut conn = pg_client.get_connection().await?;
    let existing = find_transaction(&mut conn, path_params.transaction_id).await?;
    auth_state.authorize_owner(Some(existing.account_id), "transaction")?;
    ensure_not_payment(&existing)?;

    if let Some(property_id) = request.property_id {
        find_owned_property(&mut conn, &auth_state, property_id).await?;
    }

    let transaction = conn
        .update_transaction(existing.id, request.into_model())
        .await?;

    tracing::info!(target: TRACING_TARGET, "transaction updated");
    Ok((StatusCode::OK, Json(Transaction::from_model(transaction))))
}

fn update_transaction_docs(op: TransformOperation) -> TransformOperation {
    op.summary("Update transaction")
        .description("Changes the given fields. Invoice payments cannot be changed.")
        .response::<200, Json<Transaction>>()
        .response::<400, Json<ErrorResponse>>()
        .response::<401, Json<ErrorResponse>>()
        .response::<403, Json<ErrorResponse>>()
        .response::<404, Json<ErrorResponse>>()
        .response::<409, Json<ErrorResponse>>()
}

/// Deletes a transaction.
#[tracing::instrument(
    skip_all,
    fields(
        account_id = %auth_state.account_id,
        transaction_id = %path_params.transaction_id,
    )
)]
async fn delete_transaction(
    PgPool(mut conn): PgPool,
    AuthState(auth_state): AuthState,
    Path(path_params): Path<TransactionPathParams>,
) -> Result<StatusCode> {
    let transaction = find_transaction(&mut conn, path_params.transaction_id).await?;
    auth_state.authorize_owner(Some(transaction.account_id), "transaction")?;
    ensure_not_payment(&transaction)?;

    conn.delete_transaction(transaction.id).await?;

    tracing::info!(target: TRACING_TARGET, "transaction deleted");
    Ok(StatusCode::NO_CONTENT)
}

fn delete_transaction_docs(op: TransformOperation) -> TransformOperation {
    op.summary("Delete transaction")
        .description("Soft-deletes a transaction that is not an invoice payment.")
        .response::<204, ()>()
        .response::<401, Json<ErrorResponse>>()
        .response::<403, Json<ErrorResponse>>()
        .response::<404, Json<ErrorResponse>>()
        .response::<409, Json<ErrorResponse>>()
}

/// Returns routes for income and expenses.
pub fn routes() -> ApiRouter<ServiceState> {
    use aide::axum::routing::*;

    ApiRouter::new()
        .api_route(
            "/transactions/",
            post_with(create_transaction, create_transaction_docs)
                .get_with(list_transactions, list_transactions_docs),
        )
        .api_route(
            "/transactions/{transactionId}/",
            get_with(read_transaction, read_transaction_docs)
                .patch_with(update_transaction, update_transaction_docs)
                .delete_with(delete_transaction, delete_transaction_docs),
        )
        .with_path_items(|item| item.tag("Transactions"))
}
