//! Property handlers.
//!
//! Properties belong to the account that created them. Records created by
//! a Land Registry import have no owner: every signed-in account may read
//! them, only administrators may change them.

use aide::axum::ApiRouter;
use aide::transform::TransformOperation;
use axum::extract::State;
use axum::http::StatusCode;
use proptrack_postgres::query::{PropertyRepository, TenancyAgreementRepository};
use proptrack_postgres::types::OffsetPagination;
use proptrack_postgres::{PgClient, PgConn, model};
use uuid::Uuid;
use validator::Validate;

use crate::extract::{AuthClaims, AuthProvider, AuthState, Json, Path, PgPool, Query, ValidateJson};
use crate::handler::request::{
    CreateProperty, Pagination, PropertyPathParams, PropertyQuery, UpdateProperty,
};
use crate::handler::response::{ErrorResponse, PropertiesPage, Property};
use crate::handler::{ErrorKind, Result};
use crate::service::ServiceState;

/// Tracing target for property operations.
const TRACING_TARGET: &str = "proptrack_server::handler::properties";

/// Finds a live property or fails with `404 Not Found`.
pub(crate) async fn find_property(conn: &mut PgConn, property_id: Uuid) -> Result<model::Property> {
    conn.find_property_by_id(property_id).await?.ok_or_else(|| {
        ErrorKind::NotFound
            .with_message("Property not found")
            .with_context(format!("Property ID: {property_id}"))
            .with_resource("property")
    })
}

/// Finds a property that records of the caller may refer to.
///
/// Imported properties without an owner are only linkable by administrators.
pub(crate) async fn find_owned_property(
    conn: &mut PgConn,
    auth_claims: &AuthClaims,
    property_id: Uuid,
) -> Result<model::Property> {
    let property = find_property(conn, property_id).await?;
    auth_claims.authorize_owner(property.owner_id, "property")?;
    Ok(property)
}

/// Registers a property owned by the caller.
#[tracing::instrument(skip_all, fields(account_id = %auth_state.account_id))]
async fn create_property(
    State(pg_client): State<PgClient>,
    AuthState(auth_state): AuthState,
    ValidateJson(request): ValidateJson<CreateProperty>,
) -> Result<(StatusCode, Json<Property>)> {
    tracing::debug!(target: TRACING_TARGET, "creating property");

    let mut conn = pg_client.get_connection().await?;
    let property = conn
        .create_property(request.into_model(auth_state.account_id))
        .await?;

    tracing::info!(
        target: TRACING_TARGET,
        property_id = %property.id,
        postcode = %property.postcode,
        "property created"
    );

    Ok((StatusCode::CREATED, Json(Property::from_model(property))))
}

fn create_property_docs(op: TransformOperation) -> TransformOperation {
    op.summary("Create property")
        .description("Registers a property owned by the caller. The postcode is normalised.")
        .response::<201, Json<Property>>()
        .response::<400, Json<ErrorResponse>>()
        .response::<401, Json<ErrorResponse>>()
}

/// Lists the caller's properties.
#[tracing::instrument(skip_all, fields(account_id = %auth_state.account_id))]
async fn list_properties(
    PgPool(mut conn): PgPool,
    AuthState(auth_state): AuthState,
    Query(query): Query<PropertyQuery>,
    Query(pagination): Query<Pagination>,
) -> Result<(StatusCode, Json<PropertiesPage>)> {
    query.validate()?;

    // Administrators list every owner unless they ask for one.
    let owner_id = match (auth_state.is_admin(), query.owner_id) {
        (true, owner_id) => owner_id,
        (false, _) => Some(auth_state.account_id),
    };

    let pagination = OffsetPagination::from(pagination);
    let filter = query.into_filter(owner_id);
    let page = conn.list_properties(&filter, pagination).await?;

    tracing::debug!(
        target: TRACING_TARGET,
        count = page.items.len(),
        total = page.total,
        "properties listed"
    );

    let page = PropertiesPage::from_offset_page(page, pagination, Property::from_model);
    Ok((StatusCode::OK, Json(page)))
}

fn list_properties_docs(op: TransformOperation) -> TransformOperation {
    op.summary("List properties")
        .description(
            "Lists the caller's properties, most recently updated first. Filters by town, \
             postcode prefix, type, listing status, asking price and bedrooms. \
             `includeImported=true` adds Land Registry properties, which have no owner. \
             Administrators see every owner and may filter by `ownerId`.",
        )
        .response::<200, Json<PropertiesPage>>()
        .response::<400, Json<ErrorResponse>>()
        .response::<401, Json<ErrorResponse>>()
}

/// Retrieves a property.
#[tracing::instrument(
    skip_all,
    fields(
        account_id = %auth_state.account_id,
        property_id = %path_params.property_id,
    )
)]
async fn read_property(
    PgPool(mut conn): PgPool,
    AuthState(auth_state): AuthState,
    Path(path_params): Path<PropertyPathParams>,
) -> Result<(StatusCode, Json<Property>)> {
    let property = find_property(&mut conn, path_params.property_id).await?;

    if !property.is_unowned() {
        auth_state.authorize_owner(property.owner_id, "property")?;
    }

    tracing::debug!(target: TRACING_TARGET, "property read");
    Ok((StatusCode::OK, Json(Property::from_model(property))))
}

fn read_property_docs(op: TransformOperation) -> TransformOperation {
    op.summary("Get property")
        .description("Returns a property owned by the caller, or an imported property.")
        .response::<200, Json<Property>>()
        .response::<401, Json<ErrorResponse>>()
        .response::<403, Json<ErrorResponse>>()
        .response::<404, Json<ErrorResponse>>()
}

/// Updates a property.
#[tracing::instrument(
    skip_all,
    fields(
        account_id = %auth_state.account_id,
        property_id = %path_params.property_id,
    )
)]
async fn update_property(
    State(pg_client): State<PgClient>,
    AuthState(auth_state): AuthState,
    Path(path_params): Path<PropertyPathParams>,
    ValidateJson(request): ValidateJson<UpdateProperty>,
) -> Result<(StatusCode, Json<Property>)> {
    let mut conn = pg_client.get_connection().await?;
    let existing = find_property(&mut conn, path_params.property_id).await?;
    auth_state.authorize_owner(existing.owner_id, "property")?;

    let changes = request.into_model();
    if changes.changes_address() {
        tracing::debug!(target: TRACING_TARGET, "property address changed");
    }

    let property = conn.update_property(existing.id, changes).await?;

    tracing::info!(target: TRACING_TARGET, "property updated");
    Ok((StatusCode::OK, Json(Property::from_model(property))))
}

fn update_property_docs(op: TransformOperation) -> TransformOperation {
    op.summary("Update property")
        .description(
            "Changes the given fields. Send `null` to clear an optional field. Imported \
             properties can only be changed by administrators.",
        )
        .response::<200, Json<Property>>()
        .response::<400, Json<ErrorResponse>>()
        .response::<401, Json<ErrorResponse>>()
        .response::<403, Json<ErrorResponse>>()
        .response::<404, Json<ErrorResponse>>()
}

/// Deletes a property.
#[tracing::instrument(
    skip_all,
    fields(
        account_id = %auth_state.account_id,
        property_id = %path_params.property_id,
    )
)]
async fn delete_property(
    PgPool(mut conn): PgPool,
    AuthState(auth_state): AuthState,
    Path(path_params): Path<PropertyPathParams>,
) -> Result<StatusCode> {
    let property = find_property(&mut conn, path_params.property_id).await?;
    auth_state.authorize_owner(property.owner_id, "property")?;

    let active = conn.list_active_tenancies_for_property(property.id).await?;
    if !active.is_empty() {
        return Err(ErrorKind::Conflict
            .with_message("The property has an active tenancy")
            .with_suggestion("Terminate the tenancy before deleting the property")
            .with_resource("property"));
    }

    conn.delete_property(property.id).await?;

    tracing::info!(target: TRACING_TARGET, "property deleted");
    Ok(StatusCode::NO_CONTENT)
}

fn delete_property_docs(op: TransformOperation) -> TransformOperation {
    op.summary("Delete property")
        .description("Soft-deletes a property without an active tenancy.")
        .response::<204, ()>()
        .response::<401, Json<ErrorResponse>>()
        .response::<403, Json<ErrorResponse>>()
        .response::<404, Json<ErrorResponse>>()
        .response::<409, Json<ErrorResponse>>()
}

/// Returns routes for property management.
pub fn routes() -> ApiRouter<ServiceState> {
    use aide::axum::routing::*;

    ApiRouter::new()
        .api_route(
            "/properties/",
            post_with(create_property, create_property_docs)
                .get_with(list_properties, list_properties_docs),
        )
        .api_route(
            "/properties/{propertyId}/",
            get_with(read_property, read_property_docs)
                .patch_with(update_property, update_property_docs)
                .delete_with(delete_property, delete_property_docs),
        )
        .with_path_items(|item| item.tag("Properties"))
}
