//! Session token check for private routes.

use aide::axum::ApiRouter;
use axum::extract::Request;
use axum::middleware::{Next, from_fn_with_state};
use axum::response::Response;

use crate::extract::AuthState;
use crate::service::ServiceState;

/// Extension trait for [`ApiRouter`] to require a session token.
///
/// Only the routes added so far are protected.
pub trait RouterAuthExt<S> {
    /// Rejects requests to the router's routes without a valid token.
    fn with_authentication(self, state: ServiceState) -> Self;
}

impl<S> RouterAuthExt<S> for ApiRouter<S>
where
    S: Clone + Send + Sync + 'static,
{
    fn with_authentication(self, state: ServiceState) -> Self {
        self.route_layer(from_fn_with_state(state, require_authentication))
    }
}

/// Requires a verified session token to proceed with the request.
///
/// The verified [`AuthState`] is cached in the request extensions, so
/// handlers extracting it again do not repeat the account lookup.
pub async fn require_authentication(
    AuthState(_): AuthState,
    request: Request,
    next: Next,
) -> Response {
    next.run(request).await
}

#[cfg(test)]
mod tests {
    use aide::openapi::OpenApi;
    use axum::http::StatusCode;
    use axum::routing::get;
    use axum_test::TestServer;

    use super::*;
    use crate::service::test_state::service_state;

    #[tokio::test]
    async fn missing_token_is_unauthorized() -> anyhow::Result<()> {
        let state = service_state()?;
        let app = ApiRouter::new()
            .route("/secret/", get(|| async { "secret" }))
            .with_authentication(state.clone())
            .route("/open/", get(|| async { "open" }))
            .finish_api(&mut OpenApi::default())
            .with_state(state);

        let server = TestServer::new(app)?;
        let response = server.get("/secret/").await;
        response.assert_status(StatusCode::UNAUTHORIZED);

        let response = server.get("/open/").await;
        response.assert_status_ok();
        Ok(())
    }
}
