#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

mod config;
mod import;
mod server;

use std::process;

use anyhow::Context;
use axum::Router;
use proptrack_server::handler::{CustomRoutes, routes};
use proptrack_server::middleware::{
    RouterObservabilityExt, RouterOpenApiExt, RouterRecoveryExt, RouterSecurityExt,
    SecurityHeadersConfig,
};
use proptrack_server::service::ServiceState;

use crate::config::{Cli, Command, MiddlewareConfig};
use crate::server::ServerError;

// Tracing target constants
pub const TRACING_TARGET_SERVER_STARTUP: &str = "proptrack_cli::server::startup";
pub const TRACING_TARGET_SERVER_SHUTDOWN: &str = "proptrack_cli::server::shutdown";
pub const TRACING_TARGET_CONFIG: &str = "proptrack_cli::config";
pub const TRACING_TARGET_IMPORT: &str = "proptrack_cli::import";

#[tokio::main]
async fn main() {
    let Err(error) = run().await else {
        tracing::info!(
            target: TRACING_TARGET_SERVER_SHUTDOWN,
            "application terminated successfully"
        );
        process::exit(0);
    };

    if tracing::enabled!(tracing::Level::ERROR) {
        let suggestion = error
            .downcast_ref::<ServerError>()
            .and_then(ServerError::suggestion);

        tracing::error!(
            target: TRACING_TARGET_SERVER_SHUTDOWN,
            error = %format!("{error:#}"),
            suggestion,
            "application terminated with error"
        );
    } else {
        eprintln!("Error: {error:#}");
    }

    process::exit(1);
}

async fn run() -> anyhow::Result<()> {
    let cli = Cli::init();

    cli.init_tracing();
    cli.log();
    cli.validate()?;

    match cli.command.clone().unwrap_or_default() {
        Command::Serve => serve(cli).await,
        Command::Import(args) => import::run(cli.service, args).await,
    }
}

async fn serve(cli: Cli) -> anyhow::Result<()> {
    cli.server.log();
    cli.middleware.log();

    tracing::info!(
        target: TRACING_TARGET_SERVER_STARTUP,
        version = env!("CARGO_PKG_VERSION"),
        "starting proptrack server"
    );

    let state = ServiceState::from_config(cli.service)
        .await
        .context("failed to create service state")?;
    let router = create_router(state, &cli.middleware);

    server::serve(router, cli.server).await?;
    Ok(())
}

/// Creates the router with all middleware layers applied.
///
/// Layers added last run first:
/// 1. Recovery (outermost): panics and request timeouts
/// 2. Observability: request ids and trace spans
/// 3. Security: CORS, body limit, compression and headers
/// 4. Routes with the OpenAPI document
fn create_router(state: ServiceState, middleware: &MiddlewareConfig) -> Router {
    routes(CustomRoutes::new(), state.clone())
        .with_open_api(middleware.openapi.clone())
        .with_state(state)
        .with_security(&middleware.cors, &SecurityHeadersConfig::default())
        .with_observability()
        .with_recovery(&middleware.recovery)
}
