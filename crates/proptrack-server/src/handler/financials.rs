//! Financial reporting handlers.

use aide::axum::ApiRouter;
use aide::transform::TransformOperation;
use axum::http::StatusCode;
use jiff::Zoned;
use validator::Validate;

use super::properties::find_owned_property;
use crate::extract::{AuthState, Json, PgPool, Query};
use crate::handler::Result;
use crate::handler::request::FinancialSummaryQuery;
use crate::handler::response::ErrorResponse;
use crate::service::ServiceState;
use crate::service::finance::{self, FinancialSummary};

/// Tracing target for financial reports.
const TRACING_TARGET: &str = "proptrack_server::handler::financials";

/// Summarises income, expenses and outstanding invoices of the caller.
#[tracing::instrument(skip_all, fields(account_id = %auth_state.account_id))]
async fn financial_summary(
    PgPool(mut conn): PgPool,
    AuthState(auth_state): AuthState,
    Query(query): Query<FinancialSummaryQuery>,
) -> Result<(StatusCode, Json<FinancialSummary>)> {
    query.validate()?;

    if let Some(property_id) = query.property_id {
        find_owned_property(&mut conn, &auth_state, property_id).await?;
    }

    let today = Zoned::now().date();
    let summary =
        finance::load_summary(&mut conn, auth_state.account_id, query.into(), today).await?;

    tracing::debug!(
        target: TRACING_TARGET,
        transactions = summary.transaction_count,
        outstanding = summary.outstanding_invoices,
        "financial summary built"
    );

    Ok((StatusCode::OK, Json(summary)))
}

fn financial_summary_docs(op: TransformOperation) -> TransformOperation {
    op.summary("Financial summary")
        .description(
            "Totals income and expenses between `from` and `to` (inclusive), per category and \
             overall, and counts issued and overdue invoices regardless of the period.",
        )
        .response::<200, Json<FinancialSummary>>()
        .response::<400, Json<ErrorResponse>>()
        .response::<401, Json<ErrorResponse>>()
        .response::<403, Json<ErrorResponse>>()
        .response::<404, Json<ErrorResponse>>()
}

/// Returns routes for financial reports.
pub fn routes() -> ApiRouter<ServiceState> {
    use aide::axum::routing::*;

    ApiRouter::new()
        .api_route(
            "/financials/summary/",
            get_with(financial_summary, financial_summary_docs),
        )
        .with_path_items(|item| item.tag("Financials"))
}
