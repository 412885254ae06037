//! Tenancy agreement handlers.
//!
//! The landlord of a tenancy is the account that created it, and only
//! properties owned by that account can be let. A property has at most one
//! active tenancy; statuses only move forward (`draft` to `active` to
//! `expired` or `terminated`).

use aide::axum::ApiRouter;
use aide::transform::TransformOperation;
use axum::extract::State;
use axum::http::StatusCode;
use jiff::Zoned;
use jiff::civil::Date;
use proptrack_postgres::model::{TenancyAgreement, UpdateTenancyAgreement};
use proptrack_postgres::query::TenancyAgreementRepository;
use proptrack_postgres::types::{OffsetPagination, TenancyStatus};
use proptrack_postgres::{PgClient, PgConn};
use uuid::Uuid;

use super::properties::find_property;
use crate::extract::{AuthProvider, AuthState, Json, Path, PgPool, Query, ValidateJson};
use crate::handler::request::{
    CreateTenancy, Pagination, TenancyPathParams, TenancyQuery, TerminateTenancy, UpdateTenancy,
};
use crate::handler::response::{ErrorResponse, TenanciesPage, Tenancy};
use crate::handler::{ErrorKind, Result};
use crate::service::ServiceState;

/// Tracing target for tenancy operations.
const TRACING_TARGET: &str = "proptrack_server::handler::tenancies";

pub(crate) async fn find_tenancy(conn: &mut PgConn, tenancy_id: Uuid) -> Result<TenancyAgreement> {
    conn.find_tenancy_by_id(tenancy_id).await?.ok_or_else(|| {
        ErrorKind::NotFound
            .with_message("Tenancy not found")
            .with_context(format!("Tenancy ID: {tenancy_id}"))
            .with_resource("tenancy")
    })
}

/// Fails with `409 Conflict` if another tenancy of the property is active.
async fn ensure_no_active_tenancy(
    conn: &mut PgConn,
    property_id: Uuid,
    except: Option<Uuid>,
) -> Result<()> {
    let active = conn.list_active_tenancies_for_property(property_id).await?;
    if active.iter().any(|tenancy| Some(tenancy.id) != except) {
        return Err(ErrorKind::Conflict
            .with_message("The property already has an active tenancy")
            .with_context(format!("Property ID: {property_id}"))
            .with_resource("tenancy"));
    }

    Ok(())
}

fn ensure_transition(current: TenancyStatus, next: TenancyStatus) -> Result<()> {
    if current.can_transition_to(next) {
        return Ok(());
    }

    Err(ErrorKind::Conflict
        .with_message(format!("A {current} tenancy cannot become {next}"))
        .with_resource("tenancy"))
}

/// Creates a tenancy on one of the caller's properties.
#[tracing::instrument(skip_all, fields(account_id = %auth_state.account_id))]
async fn create_tenancy(
    State(pg_client): State<PgClient>,
    AuthState(auth_state): AuthState,
    ValidateJson(request): ValidateJson<CreateTenancy>,
) -> Result<(StatusCode, Json<Tenancy>)> {
    let status = request.status.unwrap_or_default();
    if !matches!(status, TenancyStatus::Draft | TenancyStatus::Active) {
        return Err(ErrorKind::BadRequest
            .with_message("A new tenancy must be draft or active")
            .with_resource("tenancy"));
    }

    let mut conn = pg_client.get_connection().await?;
    let property = find_property(&mut conn, request.property_id).await?;
    if !property.is_owned_by(auth_state.account_id) {
        return Err(ErrorKind::Forbidden
            .with_message("Only the owner of a property can let it")
            .with_resource("tenancy"));
    }

    if status == TenancyStatus::Active {
        ensure_no_active_tenancy(&mut conn, property.id, None).await?;
    }

    let tenancy = conn
        .create_tenancy(request.into_model(auth_state.account_id))
        .await?;

    tracing::info!(
        target: TRACING_TARGET,
        tenancy_id = %tenancy.id,
        property_id = %tenancy.property_id,
        status = %tenancy.status,
        "tenancy created"
    );

    Ok((StatusCode::CREATED, Json(Tenancy::from_model(tenancy))))
}

fn create_tenancy_docs(op: TransformOperation) -> TransformOperation {
    op.summary("Create tenancy")
        .description(
            "Creates a draft or active tenancy on a property owned by the caller. A property \
             can only have one active tenancy.",
        )
        .response::<201, Json<Tenancy>>()
        .response::<400, Json<ErrorResponse>>()
        .response::<401, Json<ErrorResponse>>()
        .response::<403, Json<ErrorResponse>>()
        .response::<404, Json<ErrorResponse>>()
        .response::<409, Json<ErrorResponse>>()
}

/// Lists the caller's tenancies.
#[tracing::instrument(skip_all, fields(account_id = %auth_state.account_id))]
async fn list_tenancies(
    PgPool(mut conn): PgPool,
    AuthState(auth_state): AuthState,
    Query(query): Query<TenancyQuery>,
    Query(pagination): Query<Pagination>,
) -> Result<(StatusCode, Json<TenanciesPage>)> {
    let pagination = OffsetPagination::from(pagination);
    let page = conn
        .list_tenancies_for_landlord(
            auth_state.account_id,
            query.property_id,
            query.status,
            pagination,
        )
        .await?;

    tracing::debug!(target: TRACING_TARGET, count = page.items.len(), "tenancies listed");

    let page = TenanciesPage::from_offset_page(page, pagination, Tenancy::from_model);
    Ok((StatusCode::OK, Json(page)))
}

fn list_tenancies_docs(op: TransformOperation) -> TransformOperation {
    op.summary("List tenancies")
        .description("Lists the caller's tenancies, newest start date first.")
        .response::<200, Json<TenanciesPage>>()
        .response::<401, Json<ErrorResponse>>()
}

/// Retrieves a tenancy.
#[tracing::instrument(
    skip_all,
    fields(
        account_id = %auth_state.account_id,
        tenancy_id = %path_params.tenancy_id,
    )
)]
async fn read_tenancy(
    PgPool(mut conn): PgPool,
    AuthState(auth_state): AuthState,
    Path(path_params): Path<TenancyPathParams>,
) -> Result<(StatusCode, Json<Tenancy>)> {
    let tenancy = find_tenancy(&mut conn, path_params.tenancy_id).await?;
    auth_state.authorize_owner(Some(tenancy.landlord_id), "tenancy")?;

    Ok((StatusCode::OK, Json(Tenancy::from_model(tenancy))))
}

fn read_tenancy_docs(op: TransformOperation) -> TransformOperation {
    op.summary("Get tenancy")
        .response::<200, Json<Tenancy>>()
        .response::<401, Json<ErrorResponse>>()
        .response::<403, Json<ErrorResponse>>()
        .response::<404, Json<ErrorResponse>>()
}

/// Updates a tenancy.
#[tracing::instrument(
    skip_all,
    fields(
        account_id = %auth_state.account_id,
        tenancy_id = %path_params.tenancy_id,
    )
)]
async fn update_tenancy(
    State(pg_client): State<PgClient>,
    AuthState(auth_state): AuthState,
    Path(path_params): Path<TenancyPathParams>,
    ValidateJson(request): ValidateJson<UpdateTenancy>,
) -> Result<(StatusCode, Json<Tenancy>)> {
    let mut conn = pg_client.get_connection().await?;
    let existing = find_tenancy(&mut conn, path_params.tenancy_id).await?;
    auth_state.authorize_owner(Some(existing.landlord_id), "tenancy")?;

    if existing.is_terminal() {
        return Err(ErrorKind::Conflict
            .with_message(format!("A {} tenancy cannot be changed", existing.status))
            .with_resource("tenancy"));
    }

    request.validate_term(existing.start_date.into(), existing.end_date.map(Into::into))?;

    if let Some(status) = request.status {
        ensure_transition(existing.status, status)?;
        if status == TenancyStatus::Active && existing.status != TenancyStatus::Active {
            ensure_no_active_tenancy(&mut conn, existing.property_id, Some(existing.id)).await?;
        }
    }

    let tenancy = conn.update_tenancy(existing.id, request.into_model()).await?;

    tracing::info!(target: TRACING_TARGET, status = %tenancy.status, "tenancy updated");
    Ok((StatusCode::OK, Json(Tenancy::from_model(tenancy))))
}

fn update_tenancy_docs(op: TransformOperation) -> TransformOperation {
    op.summary("Update tenancy")
        .description(
            "Changes the given fields of a draft or active tenancy. Status changes must move \
             forward: draft to active, active to expired or terminated.",
        )
        .response::<200, Json<Tenancy>>()
        .response::<400, Json<ErrorResponse>>()
        .response::<401, Json<ErrorResponse>>()
        .response::<403, Json<ErrorResponse>>()
        .response::<404, Json<ErrorResponse>>()
        .response::<409, Json<ErrorResponse>>()
}

/// Appends the termination reason to the existing notes.
fn termination_notes(notes: Option<&str>, end_date: Date, reason: Option<&str>) -> Option<String> {
    let reason = reason.map(str::trim).filter(|reason| !reason.is_empty())?;
    let line = format!("Terminated on {end_date}: {reason}");

    Some(match notes {
        Some(notes) if !notes.is_empty() => format!("{notes}\n{line}"),
        _ => line,
    })
}

/// Terminates a tenancy early.
#[tracing::instrument(
    skip_all,
    fields(
        account_id = %auth_state.account_id,
        tenancy_id = %path_params.tenancy_id,
    )
)]
async fn terminate_tenancy(
    State(pg_client): State<PgClient>,
    AuthState(auth_state): AuthState,
    Path(path_params): Path<TenancyPathParams>,
    ValidateJson(request): ValidateJson<TerminateTenancy>,
) -> Result<(StatusCode, Json<Tenancy>)> {
    let mut conn = pg_client.get_connection().await?;
    let existing = find_tenancy(&mut conn, path_params.tenancy_id).await?;
    auth_state.authorize_owner(Some(existing.landlord_id), "tenancy")?;

    if existing.is_terminal() {
        return Err(ErrorKind::Conflict
            .with_message("The tenancy has already ended")
            .with_resource("tenancy"));
    }

    let start_date = Date::from(existing.start_date);
    let end_date = request.end_date.unwrap_or_else(|| Zoned::now().date());
    if end_date <= start_date {
        return Err(ErrorKind::BadRequest
            .with_message("The end date must be after the start date")
            .with_context(format!("Start date: {start_date}"))
            .with_resource("tenancy"));
    }

    let notes = termination_notes(existing.notes.as_deref(), end_date, request.reason.as_deref());
    let changes = UpdateTenancyAgreement {
        status: Some(TenancyStatus::Terminated),
        end_date: Some(Some(end_date.into())),
        notes: notes.map(Some),
        ..UpdateTenancyAgreement::default()
    };

    let tenancy = conn.update_tenancy(existing.id, changes).await?;

    tracing::info!(target: TRACING_TARGET, %end_date, "tenancy terminated");
    Ok((StatusCode::OK, Json(Tenancy::from_model(tenancy))))
}

fn terminate_tenancy_docs(op: TransformOperation) -> TransformOperation {
    op.summary("Terminate tenancy")
        .description(
            "Ends a draft or active tenancy on the given date (today by default) and records \
             the reason in the notes.",
        )
        .response::<200, Json<Tenancy>>()
        .response::<400, Json<ErrorResponse>>()
        .response::<401, Json<ErrorResponse>>()
        .response::<403, Json<ErrorResponse>>()
        .response::<404, Json<ErrorResponse>>()
        .response::<409, Json<ErrorResponse>>()
}

/// Deletes a tenancy.
#[tracing::instrument(
    skip_all,
    fields(
        account_id = %auth_state.account_id,
        tenancy_id = %path_params.tenancy_id,
    )
)]
async fn delete_tenancy(
    PgPool(mut conn): PgPool,
    AuthState(auth_state): AuthState,
    Path(path_params): Path<TenancyPathParams>,
) -> Result<StatusCode> {
    let tenancy = find_tenancy(&mut conn, path_params.tenancy_id).await?;
    auth_state.authorize_owner(Some(tenancy.landlord_id), "tenancy")?;

    conn.delete_tenancy(tenancy.id).await?;

    tracing::info!(target: TRACING_TARGET, "tenancy deleted");
    Ok(StatusCode::NO_CONTENT)
}

fn delete_tenancy_docs(op: TransformOperation) -> TransformOperation {
    op.summary("Delete tenancy")
        .description("Soft-deletes a tenancy.")
        .response::<204, ()>()
        .response::<401, Json<ErrorResponse>>()
        .response::<403, Json<ErrorResponse>>()
        .response::<404, Json<ErrorResponse>>()
}

/// Returns routes for tenancy management.
pub fn routes() -> ApiRouter<ServiceState> {
    use aide::axum::routing::*;

    ApiRouter::new()
        .api_route(
            "/tenancies/",
            post_with(create_tenancy, create_tenancy_docs)
                .get_with(list_tenancies, list_tenancies_docs),
        )
        .api_route(
            "/tenancies/{tenancyId}/",
            get_with(read_tenancy, read_tenancy_docs)
                .patch_with(update_tenancy, update_tenancy_docs)
                .delete_with(delete_tenancy, delete_tenancy_docs),
        )
        .api_route(
            "/tenancies/{tenancyId}/terminate/",
            post_with(terminate_tenancy, terminate_tenancy_docs),
        )
        .with_path_items(|item| item.tag("Tenancies"))
}

#[cfg(test)]
mod tests {
    use jiff::civil::date;

    use super::*;

    #[test]
    fn reason_is_appended_to_notes() {
        let notes = termination_notes(Some("Pets allowed"), date(2025, 6, 30), Some(" moved abroad "));
        assert_eq!(
            notes.as_deref(),
            Some("Pets allowed\nTerminated on 2025-06-30: moved abroad")
        );
    }

    #[test]
    fn blank_reason_keeps_notes() {
        assert_eq!(termination_notes(Some("Pets allowed"), date(2025, 6, 30), Some("  ")), None);
        assert_eq!(
            termination_notes(None, date(2025, 6, 30), Some("rent arrears")).as_deref(),
            Some("Terminated on 2025-06-30: rent arrears")
        );
    }

    #[test]
    fn terminated_tenancy_cannot_be_reactivated() {
        assert!(ensure_transition(TenancyStatus::Terminated, TenancyStatus::Active).is_err());
        assert!(ensure_transition(TenancyStatus::Draft, TenancyStatus::Active).is_ok());
    }
}
