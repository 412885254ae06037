//! All `aide::axum::`[`ApiRouter`]s with related `axum::`[`Handler`]s.
//!
//! # Usage Example
//!
//! ```rust,no_run
//! use aide::axum::ApiRouter;
//! use aide::axum::routing::get;
//! use proptrack_server::handler::{CustomRoutes, routes};
//! use proptrack_server::service::{ServiceConfig, ServiceState};
//!
//! async fn custom_handler() -> &'static str {
//!     "Hello from a custom route!"
//! }
//!
//! # async fn example(config: ServiceConfig) -> anyhow::Result<()> {
//! let state = ServiceState::from_config(config).await?;
//!
//! let custom_routes = CustomRoutes::new()
//!     .with_public_routes(ApiRouter::new().api_route("/custom/", get(custom_handler)));
//!
//! let router = routes(custom_routes, state);
//! # Ok(())
//! # }
//! ```
//!
//! [`ApiRouter`]: aide::axum::ApiRouter
//! [`Handler`]: axum::handler::Handler

mod accounts;
mod authentication;
mod error;
mod files;
mod financials;
mod imports;
mod invoices;
mod monitors;
mod properties;
pub mod request;
pub mod response;
mod tenancies;
mod transactions;
mod utility;
mod valuations;

use aide::axum::ApiRouter;
use axum::response::{IntoResponse, Response};

pub use crate::handler::error::{Error, ErrorKind, Result};
pub use crate::handler::utility::CustomRoutes;
use crate::middleware::RouterAuthExt;
use crate::service::ServiceState;

#[inline]
async fn fallback() -> Response {
    ErrorKind::NotFound.into_response()
}

/// Returns an [`ApiRouter`] with all routes that need a session token.
fn private_routes(additional_routes: Option<ApiRouter<ServiceState>>) -> ApiRouter<ServiceState> {
    let mut router = ApiRouter::new()
        .merge(accounts::routes())
        .merge(properties::routes())
        .merge(tenancies::routes())
        .merge(invoices::routes())
        .merge(transactions::routes())
        .merge(financials::routes())
        .merge(files::routes())
        .merge(valuations::routes())
        .merge(imports::routes());

    if let Some(additional) = additional_routes {
        router = router.merge(additional);
    }

    router
}

/// Returns an [`ApiRouter`] with all public routes.
fn public_routes(
    additional_routes: Option<ApiRouter<ServiceState>>,
    disable_authentication: bool,
) -> ApiRouter<ServiceState> {
    let mut router = ApiRouter::new().merge(monitors::routes());

    if !disable_authentication {
        router = router.merge(authentication::routes());
    }

    if let Some(additional) = additional_routes {
        router = router.merge(additional);
    }

    router
}

/// Returns an [`ApiRouter`] with all routes.
pub fn routes(mut routes: CustomRoutes, state: ServiceState) -> ApiRouter<ServiceState> {
    let private_router = private_routes(routes.take_private_routes()).with_authentication(state);
    let public_router = public_routes(routes.take_public_routes(), routes.disable_authentication);

    ApiRouter::new()
        .merge(private_router)
        .merge(public_router)
        .fallback(fallback)
}

#[cfg(test)]
pub(crate) mod test {
    use aide::axum::ApiRouter;
    use aide::openapi::OpenApi;
    use axum::extract::Request;
    use axum::http::{HeaderValue, StatusCode, header};
    use axum::middleware::{Next, from_fn};
    use axum_test::TestServer;

    use crate::extract::{AuthClaims, AuthState};
    use crate::handler::{CustomRoutes, routes};
    use crate::service::ServiceState;
    use crate::service::test_state::service_state;

    /// Returns a new [`TestServer`] with the given router.
    pub(crate) fn create_test_server_with_router(
        router: impl Fn(ServiceState) -> ApiRouter<ServiceState>,
    ) -> anyhow::Result<TestServer> {
        let state = service_state()?;
        let router = router(state.clone());
        create_test_server_with_state(router, state)
    }

    /// Returns a new [`TestServer`] with the given router and state.
    pub(crate) fn create_test_server_with_state(
        router: ApiRouter<ServiceState>,
        state: ServiceState,
    ) -> anyhow::Result<TestServer> {
        let app = router
            .finish_api(&mut OpenApi::default())
            .with_state(state);
        Ok(TestServer::new(app)?)
    }

    /// Returns a new [`TestServer`] whose requests act as `auth_claims`.
    ///
    /// The verified caller is placed in the request extensions, where
    /// [`AuthState`] finds it without a database lookup.
    pub(crate) fn create_test_server_signed_in(
        router: ApiRouter<ServiceState>,
        auth_claims: AuthClaims,
    ) -> anyhow::Result<TestServer> {
        let router = router.layer(from_fn(move |mut request: Request, next: Next| {
            let auth_state = AuthState::from_verified_claims(auth_claims.clone());
            async move {
                request.extensions_mut().insert(auth_state);
                next.run(request).await
            }
        }));
        create_test_server_with_state(router, service_state()?)
    }

    /// Returns a new [`TestServer`] with every route.
    pub(crate) fn create_test_server() -> anyhow::Result<TestServer> {
        let state = service_state()?;
        let router = routes(CustomRoutes::new(), state.clone());
        create_test_server_with_state(router, state)
    }

    #[tokio::test]
    async fn private_routes_need_a_token() -> anyhow::Result<()> {
        let server = create_test_server()?;

        let response = server.get("/properties/").await;
        response.assert_status(StatusCode::UNAUTHORIZED);

        let response = server
            .get("/invoices/")
            .add_header(header::AUTHORIZATION, HeaderValue::from_static("Bearer not-a-jwt"))
            .await;
        response.assert_status(StatusCode::UNAUTHORIZED);
        Ok(())
    }

    #[tokio::test]
    async fn documented_router_stack_serves_requests() -> anyhow::Result<()> {
        use axum::Router;

        use crate::middleware::{
            OpenApiConfig, RouterObservabilityExt, RouterOpenApiExt, RouterRecoveryExt,
        };

        let state = service_state()?;
        let app: Router = routes(CustomRoutes::new(), state.clone())
            .with_open_api(OpenApiConfig::default())
            .with_state(state)
            .with_observability()
            .with_default_recovery();

        let server = TestServer::new(app)?;
        server.get("/api/openapi.json").await.assert_status_ok();
        Ok(())
    }

    #[tokio::test]
    async fn unknown_paths_are_not_found() -> anyhow::Result<()> {
        let server = create_test_server()?;

        let response = server.get("/no-such-resource/").await;
        response.assert_status(StatusCode::NOT_FOUND);
        Ok(())
    }

    #[tokio::test]
    async fn authentication_routes_can_be_disabled() -> anyhow::Result<()> {
        let state = service_state()?;
        let custom = CustomRoutes::new().with_disable_authentication(true);
        let server = create_test_server_with_state(routes(custom, state.clone()), state)?;

        let response = server
            .post("/auth/login/")
            .json(&serde_json::json!({ "emailAddress": "jane@example.com", "password": "x" }))
            .await;
        response.assert_status(StatusCode::NOT_FOUND);
        Ok(())
    }
}
