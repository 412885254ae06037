//! Handlers for the caller's own account.

use aide::axum::ApiRouter;
use aide::transform::TransformOperation;
use axum::extract::State;
use axum::http::StatusCode;
use proptrack_postgres::query::AccountRepository;
use proptrack_postgres::{PgClient, PgConn, model};
use uuid::Uuid;

use crate::extract::{AuthState, Json, PgPool, ValidateJson};
use crate::handler::request::UpdateAccount;
use crate::handler::response::{Account, ErrorResponse};
use crate::handler::{ErrorKind, Result};
use crate::service::{PasswordHasher, ServiceState};

/// Tracing target for account operations.
const TRACING_TARGET: &str = "proptrack_server::handler::accounts";

async fn find_account(conn: &mut PgConn, account_id: Uuid) -> Result<model::Account> {
    conn.find_account_by_id(account_id)
        .await?
        .filter(|account| !account.is_deleted())
        .ok_or_else(|| {
            ErrorKind::NotFound
                .with_message("Account not found")
                .with_context(format!("Account ID: {account_id}"))
                .with_resource("account")
        })
}

/// Retrieves the authenticated account.
#[tracing::instrument(skip_all, fields(account_id = %auth_state.account_id))]
async fn get_own_account(
    PgPool(mut conn): PgPool,
    AuthState(auth_state): AuthState,
) -> Result<(StatusCode, Json<Account>)> {
    let account = find_account(&mut conn, auth_state.account_id).await?;
    tracing::debug!(target: TRACING_TARGET, "account retrieved");

    Ok((StatusCode::OK, Json(Account::from_model(account))))
}

fn get_own_account_docs(op: TransformOperation) -> TransformOperation {
    op.summary("Get own account")
        .description("Returns the account the session token was issued to.")
        .response::<200, Json<Account>>()
        .response::<401, Json<ErrorResponse>>()
        .response::<404, Json<ErrorResponse>>()
}

/// Updates the authenticated account.
#[tracing::instrument(skip_all, fields(account_id = %auth_state.account_id))]
async fn update_own_account(
    State(pg_client): State<PgClient>,
    State(password_hasher): State<PasswordHasher>,
    AuthState(auth_state): AuthState,
    ValidateJson(request): ValidateJson<UpdateAccount>,
) -> Result<(StatusCode, Json<Account>)> {
    tracing::trace!(
        target: TRACING_TARGET,
        has_display_name = request.display_name.is_some(),
        has_email = request.email_address.is_some(),
        has_password = request.password.is_some(),
        "updating account"
    );

    let mut conn = pg_client.get_connection().await?;
    let current = find_account(&mut conn, auth_state.account_id).await?;

    let password_hash = match (&request.password, &request.current_password) {
        (Some(password), Some(current_password)) => {
            password_hasher.verify_password(current_password, &current.password_hash)?;
            Some(password_hasher.hash_password(password)?)
        }
        (Some(_), None) => {
            return Err(ErrorKind::BadRequest
                .with_message("The current password is required to set a new one")
                .with_resource("account"));
        }
        (None, _) => None,
    };

    let email_address = request
        .normalized_email()
        .filter(|email| *email != current.email_address);

    if let Some(email) = &email_address
        && conn.email_exists(email).await?
    {
        tracing::warn!(target: TRACING_TARGET, "account update rejected: email already registered");
        return Err(ErrorKind::Conflict
            .with_message("An account with this email address already exists")
            .with_resource("account"));
    }

    let changes = model::UpdateAccount {
        display_name: request.display_name.map(|name| name.trim().to_owned()),
        email_address,
        password_hash,
    };

    let account = conn.update_account(auth_state.account_id, changes).await?;

    tracing::info!(target: TRACING_TARGET, "account updated");
    Ok((StatusCode::OK, Json(Account::from_model(account))))
}

fn update_own_account_docs(op: TransformOperation) -> TransformOperation {
    op.summary("Update own account")
        .description(
            "Changes the display name, email address or password. A new password must be \
             accompanied by the current one.",
        )
        .response::<200, Json<Account>>()
        .response::<400, Json<ErrorResponse>>()
        .response::<401, Json<ErrorResponse>>()
        .response::<409, Json<ErrorResponse>>()
}

/// Returns routes for the caller's account.
pub fn routes() -> ApiRouter<ServiceState> {
    use aide::axum::routing::*;

    ApiRouter::new()
        .api_route(
            "/accounts/me/",
            get_with(get_own_account, get_own_account_docs)
                .patch_with(update_own_account, update_own_account_docs),
        )
        .with_path_items(|item| item.tag("Accounts"))
}
