//! HTTP server startup and graceful shutdown.

mod error;
mod lifecycle;
mod shutdown;

use std::net::SocketAddr;

use axum::Router;
pub use error::{ServerError, ServerResult};
use lifecycle::serve_with_shutdown;
pub use shutdown::shutdown_signal;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;

use crate::TRACING_TARGET_SERVER_STARTUP;
use crate::config::ServerConfig;

/// Binds the configured address and serves `app` until a shutdown signal.
///
/// After the signal, in-flight requests get the configured shutdown timeout
/// to finish before the server stops.
pub async fn serve(app: Router, server_config: ServerConfig) -> ServerResult<()> {
    server_config
        .validate()
        .map_err(|err| ServerError::invalid_config(&err))?;

    let server_addr = server_config.server_addr();
    let listener = TcpListener::bind(server_addr).await.map_err(|err| {
        tracing::error!(
            target: TRACING_TARGET_SERVER_STARTUP,
            addr = %server_addr,
            error = %err,
            "failed to bind to address"
        );
        ServerError::bind_error(&server_addr.to_string(), err)
    })?;

    let shutdown = CancellationToken::new();
    let signal = shutdown.clone();
    tokio::spawn(async move {
        shutdown_signal().await;
        signal.cancel();
    });

    serve_with_shutdown(&server_config, shutdown.clone(), move || async move {
        axum::serve(
            listener,
            app.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .with_graceful_shutdown(shutdown.cancelled_owned())
        .await
    })
    .await
    .map_err(ServerError::Runtime)
}
