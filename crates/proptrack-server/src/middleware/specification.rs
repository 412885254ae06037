//! OpenAPI document and Scalar UI.
//!
//! ```rust
//! use aide::axum::ApiRouter;
//! use axum::Router;
//! use proptrack_server::middleware::{OpenApiConfig, RouterOpenApiExt};
//!
//! let app: Router<()> = ApiRouter::new()
//!     .with_open_api(OpenApiConfig::default());
//! ```

use aide::axum::ApiRouter;
use aide::openapi::{Contact, Info, License, OpenApi};
use aide::scalar::Scalar;
use axum::routing::{Router, get};
use axum::{Extension, Json};
#[cfg(feature = "config")]
use clap::Args;
use serde::{Deserialize, Serialize};

/// Paths serving the OpenAPI document and its Scalar UI.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "config", derive(Args))]
#[must_use = "config does nothing unless you use it"]
pub struct OpenApiConfig {
    /// Path which exposes the OpenAPI JSON specification.
    #[cfg_attr(
        feature = "config",
        arg(long, env = "OPENAPI_JSON_PATH", default_value = "/api/openapi.json")
    )]
    pub open_api_json: String,

    /// Path which exposes the Scalar API reference UI.
    #[cfg_attr(
        feature = "config",
        arg(long, env = "OPENAPI_SCALAR_PATH", default_value = "/api/scalar")
    )]
    pub scalar_ui: String,
}

impl Default for OpenApiConfig {
    fn default() -> Self {
        Self {
            open_api_json: "/api/openapi.json".to_owned(),
            scalar_ui: "/api/scalar".to_owned(),
        }
    }
}

/// Extension trait for [`ApiRouter`] to serve its OpenAPI document.
///
/// [`ApiRouter`]: aide::axum::ApiRouter
pub trait RouterOpenApiExt<S> {
    /// Finishes the API with the proptrack [`Info`] and serves the JSON
    /// document and the Scalar UI at the configured paths.
    ///
    /// [`Info`]: aide::openapi::Info
    fn with_open_api(self, config: OpenApiConfig) -> Router<S>;

    /// Same as [`with_open_api`] with custom [`Info`].
    ///
    /// [`with_open_api`]: RouterOpenApiExt::with_open_api
    /// [`Info`]: aide::openapi::Info
    fn with_open_api_info(self, config: OpenApiConfig, info: Info) -> Router<S>;
}

impl<S> RouterOpenApiExt<S> for ApiRouter<S>
where
    S: Clone + Send + Sync + 'static,
{
    fn with_open_api(self, config: OpenApiConfig) -> Router<S> {
        let info = Info {
            title: "proptrack API".to_owned(),
            summary: Some("Property management for UK landlords".to_owned()),
            description: Some(
                "Manage properties, tenancies, invoices, income and expenses. Estimate \
                 property values from HM Land Registry Price Paid Data and import new \
                 releases of it."
                    .to_owned(),
            ),
            contact: Some(Contact {
                name: Some("proptrack maintainers".to_owned()),
                ..Contact::default()
            }),
            license: Some(License {
                name: "MIT".to_owned(),
                identifier: Some("MIT".to_owned()),
                ..License::default()
            }),
            version: env!("CARGO_PKG_VERSION").to_owned(),
            ..Info::default()
        };

        self.with_open_api_info(config, info)
    }

    fn with_open_api_info(self, config: OpenApiConfig, info: Info) -> Router<S> {
        async fn serve_openapi(Extension(api): Extension<OpenApi>) -> Json<OpenApi> {
            Json(api)
        }

        let mut api = OpenApi {
            info,
            ..OpenApi::default()
        };

        let scalar = Scalar::new(&config.open_api_json);
        let router = self
            .route(&config.scalar_ui, scalar.axum_route())
            .route(&config.open_api_json, get(serve_openapi));

        router.finish_api(&mut api).layer(Extension(api))
    }
}

#[cfg(test)]
mod tests {
    use aide::axum::routing::get;
    use axum_test::TestServer;

    use super::*;

    async fn ping() -> &'static str {
        "pong"
    }

    #[tokio::test]
    async fn document_lists_api_routes() -> anyhow::Result<()> {
        let app: Router = ApiRouter::new()
            .api_route("/ping/", get(ping))
            .with_open_api(OpenApiConfig::default());

        let server = TestServer::new(app)?;
        let response = server.get("/api/openapi.json").await;
        response.assert_status_ok();

        let document: serde_json::Value = response.json();
        assert_eq!(document["info"]["title"], "proptrack API");
        assert!(document["paths"].get("/ping/").is_some());
        Ok(())
    }
}
