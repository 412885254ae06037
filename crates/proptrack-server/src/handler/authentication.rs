//! Signup and login handlers.
//!
//! Both endpoints are public and return a session token for the
//! `Authorization: Bearer` header. Login spends the same hashing work for
//! unknown email addresses as for known ones, so response timing does not
//! reveal which accounts exist.

use aide::axum::ApiRouter;
use aide::transform::TransformOperation;
use axum::extract::State;
use axum::http::StatusCode;
use proptrack_postgres::PgClient;
use proptrack_postgres::model::Account as AccountModel;
use proptrack_postgres::query::AccountRepository;

use crate::extract::{AuthClaims, Json, ValidateJson};
use crate::handler::request::{Login, Signup};
use crate::handler::response::{Account, AuthToken, ErrorResponse, SignupResponse};
use crate::handler::{ErrorKind, Result};
use crate::service::{PasswordHasher, ServiceState, SessionKeys};

/// Tracing target for authentication operations.
const TRACING_TARGET: &str = "proptrack_server::handler::authentication";

/// Issues a session token for `account`.
fn issue_token(account: &AccountModel, session_keys: &SessionKeys) -> Result<AuthToken> {
    let claims = AuthClaims::new(account, session_keys)?;
    let api_token = claims.encode(session_keys.encoding_key())?;
    Ok(AuthToken::new(api_token, &claims))
}

/// Creates an account and signs it in.
#[tracing::instrument(skip_all)]
async fn signup(
    State(pg_client): State<PgClient>,
    State(password_hasher): State<PasswordHasher>,
    State(session_keys): State<SessionKeys>,
    ValidateJson(request): ValidateJson<Signup>,
) -> Result<(StatusCode, Json<SignupResponse>)> {
    let email_address = request.normalized_email();
    tracing::trace!(target: TRACING_TARGET, email = %email_address, "signup attempt");

    let mut conn = pg_client.get_connection().await?;
    if conn.email_exists(&email_address).await? {
        tracing::warn!(
            target: TRACING_TARGET,
            email = %email_address,
            "signup rejected: email already registered"
        );
        return Err(ErrorKind::Conflict
            .with_message("An account with this email address already exists")
            .with_suggestion("Sign in instead, or use another email address")
            .with_resource("account"));
    }

    let password_hash = password_hasher.hash_password(&request.password)?;
    let account = conn.create_account(request.into_model(password_hash)).await?;
    let token = issue_token(&account, &session_keys)?;

    tracing::info!(
        target: TRACING_TARGET,
        account_id = %account.id,
        token_id = %token.token_id,
        "account created"
    );

    let response = SignupResponse {
        account: Account::from_model(account),
        token,
    };

    Ok((StatusCode::CREATED, Json(response)))
}

fn signup_docs(op: TransformOperation) -> TransformOperation {
    op.summary("Sign up")
        .description(
            "Creates an account with the given display name, email address and password, \
             and returns it together with a session token.",
        )
        .response::<201, Json<SignupResponse>>()
        .response::<400, Json<ErrorResponse>>()
        .response::<409, Json<ErrorResponse>>()
}

/// Exchanges credentials for a session token.
#[tracing::instrument(skip_all)]
async fn login(
    State(pg_client): State<PgClient>,
    State(password_hasher): State<PasswordHasher>,
    State(session_keys): State<SessionKeys>,
    ValidateJson(request): ValidateJson<Login>,
) -> Result<(StatusCode, Json<AuthToken>)> {
    let email_address = request.email_address.trim().to_lowercase();
    tracing::trace!(target: TRACING_TARGET, email = %email_address, "login attempt");

    let mut conn = pg_client.get_connection().await?;
    let account = conn
        .find_account_by_email(&email_address)
        .await?
        .filter(|account| !account.is_deleted());

    let Some(account) = account else {
        password_hasher.verify_dummy_password(&request.password);
        tracing::warn!(target: TRACING_TARGET, email = %email_address, "login failed: unknown account");
        return Err(ErrorKind::Unauthorized
            .with_message("Invalid email address or password")
            .with_resource("authentication"));
    };

    if let Err(error) = password_hasher.verify_password(&request.password, &account.password_hash) {
        tracing::warn!(
            target: TRACING_TARGET,
            account_id = %account.id,
            "login failed: wrong password"
        );
        return Err(error);
    }

    let token = issue_token(&account, &session_keys)?;

    tracing::info!(
        target: TRACING_TARGET,
        account_id = %account.id,
        token_id = %token.token_id,
        "login successful"
    );

    Ok((StatusCode::OK, Json(token)))
}

fn login_docs(op: TransformOperation) -> TransformOperation {
    op.summary("Log in")
        .description("Verifies the email address and password and returns a session token.")
        .response::<200, Json<AuthToken>>()
        .response::<400, Json<ErrorResponse>>()
        .response::<401, Json<ErrorResponse>>()
}

/// Returns routes for signup and login.
pub fn routes() -> ApiRouter<ServiceState> {
    use aide::axum::routing::*;

    ApiRouter::new()
        .api_route("/auth/signup/", post_with(signup, signup_docs))
        .api_route("/auth/login/", post_with(login, login_docs))
        .with_path_items(|item| item.tag("Authentication"))
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use serde_json::json;

    use super::*;
    use crate::handler::test::create_test_server_with_router;

    #[tokio::test]
    async fn signup_rejects_invalid_email() -> anyhow::Result<()> {
        let server = create_test_server_with_router(|_| routes())?;

        let response = server
            .post("/auth/signup/")
            .json(&json!({
                "displayName": "Nell Dean",
                "emailAddress": "not-an-email",
                "password": "wuthering-heights",
            }))
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
        Ok(())
    }

    #[tokio::test]
    async fn login_rejects_missing_password() -> anyhow::Result<()> {
        let server = create_test_server_with_router(|_| routes())?;

        let response = server
            .post("/auth/login/")
            .json(&json!({ "emailAddress": "nell@example.co.uk" }))
            .await;

        assert!(response.status_code().is_client_error());
        Ok(())
    }
}
