//! Valuation and market analysis handlers.
//!
//! Both read the sale history imported from the Land Registry and are
//! available to every signed-in account.

use aide::axum::ApiRouter;
use aide::transform::TransformOperation;
use axum::extract::State;
use axum::http::StatusCode;
use proptrack_postgres::PgClient;
use validator::Validate;

use crate::extract::{AuthState, Json, PgPool, Query, ValidateJson};
use crate::handler::request::{EstimateValuation, MarketAnalysisQuery};
use crate::handler::response::ErrorResponse;
use crate::handler::{ErrorKind, Result};
use crate::service::valuation::{MarketAnalysis, ValuationEstimate, ValuationInput};
use crate::service::{ServiceState, ValuationService};

/// Tracing target for valuations.
const TRACING_TARGET: &str = "proptrack_server::handler::valuations";

/// Estimates the value of a property from comparable sales.
#[tracing::instrument(skip_all, fields(account_id = %auth_state.account_id))]
async fn estimate_valuation(
    State(pg_client): State<PgClient>,
    State(valuation): State<ValuationService>,
    AuthState(auth_state): AuthState,
    ValidateJson(request): ValidateJson<EstimateValuation>,
) -> Result<(StatusCode, Json<ValuationEstimate>)> {
    let input = ValuationInput::from(request);

    let mut conn = pg_client.get_connection().await?;
    let estimate = valuation
        .estimate_property(&mut conn, &input)
        .await?
        .ok_or_else(|| {
            ErrorKind::BadRequest
                .with_message("The postcode has no recognisable district")
                .with_resource("valuation")
        })?;

    tracing::info!(
        target: TRACING_TARGET,
        district = %estimate.postcode_district,
        comparables = estimate.comparables,
        "valuation estimated"
    );

    Ok((StatusCode::OK, Json(estimate)))
}

fn estimate_valuation_docs(op: TransformOperation) -> TransformOperation {
    op.summary("Estimate value")
        .description(
            "Values a property from the average price of comparable sales in its postcode \
             district. Without enough comparables, a national base price weighted by region \
             is used instead. Bedrooms, new build, tenure and EPC rating adjust the result.",
        )
        .response::<200, Json<ValuationEstimate>>()
        .response::<400, Json<ErrorResponse>>()
        .response::<401, Json<ErrorResponse>>()
}

/// Summarises sale prices of an area.
#[tracing::instrument(skip_all, fields(account_id = %auth_state.account_id))]
async fn market_analysis(
    PgPool(mut conn): PgPool,
    State(valuation): State<ValuationService>,
    AuthState(auth_state): AuthState,
    Query(query): Query<MarketAnalysisQuery>,
) -> Result<(StatusCode, Json<MarketAnalysis>)> {
    query.validate()?;

    let location = query.location().ok_or_else(|| {
        ErrorKind::BadRequest
            .with_message("Either a postcode or a town is required")
            .with_resource("market_analysis")
    })?;

    let analysis = valuation
        .market_analysis(&mut conn, location, query.property_type)
        .await?;

    tracing::debug!(
        target: TRACING_TARGET,
        sales = analysis.sales_count,
        indicator = %analysis.market_indicator,
        "market analysed"
    );

    Ok((StatusCode::OK, Json(analysis)))
}

fn market_analysis_docs(op: TransformOperation) -> TransformOperation {
    op.summary("Market analysis")
        .description(
            "Sale count, average, minimum and maximum price of a postcode district or town, \
             compared with the national base price and broken down by property type.",
        )
        .response::<200, Json<MarketAnalysis>>()
        .response::<400, Json<ErrorResponse>>()
        .response::<401, Json<ErrorResponse>>()
}

/// Returns routes for valuations.
pub fn routes() -> ApiRouter<ServiceState> {
    use aide::axum::routing::*;

    ApiRouter::new()
        .api_route(
            "/valuations/estimate/",
            post_with(estimate_valuation, estimate_valuation_docs),
        )
        .api_route(
            "/valuations/market-analysis/",
            get_with(market_analysis, market_analysis_docs),
        )
        .with_path_items(|item| item.tag("Valuations"))
}
