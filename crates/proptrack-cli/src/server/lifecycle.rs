//! Server lifecycle: readiness logs, shutdown deadline and exit status.

use std::future::Future;
use std::io;
use std::time::Instant;

use tokio_util::sync::CancellationToken;

use crate::config::ServerConfig;
use crate::{TRACING_TARGET_SERVER_SHUTDOWN, TRACING_TARGET_SERVER_STARTUP};

/// Runs the server future until it stops or the shutdown deadline passes.
///
/// The deadline starts when `shutdown` is cancelled; requests still running
/// after it are dropped.
pub async fn serve_with_shutdown<F>(
    server_config: &ServerConfig,
    shutdown: CancellationToken,
    serve_fn: impl FnOnce() -> F,
) -> io::Result<()>
where
    F: Future<Output = io::Result<()>>,
{
    let start_time = Instant::now();
    let shutdown_timeout = server_config.shutdown_timeout();

    tracing::info!(
        target: TRACING_TARGET_SERVER_STARTUP,
        addr = %server_config.server_addr(),
        "server is ready and listening for connections"
    );

    if server_config.binds_to_all_interfaces() {
        tracing::warn!(
            target: TRACING_TARGET_SERVER_STARTUP,
            "server bound to all interfaces, ensure firewall rules are configured"
        );
    }

    let deadline = async {
        shutdown.cancelled().await;
        tokio::time::sleep(shutdown_timeout).await;
    };

    let result = tokio::select! {
        result = serve_fn() => result,
        () = deadline => {
            tracing::warn!(
                target: TRACING_TARGET_SERVER_SHUTDOWN,
                timeout_secs = shutdown_timeout.as_secs(),
                "shutdown timeout elapsed, dropping remaining requests"
            );
            Ok(())
        }
    };

    handle_result(result, start_time)
}

fn handle_result(result: io::Result<()>, start_time: Instant) -> io::Result<()> {
    let uptime = start_time.elapsed();

    match result {
        Ok(()) => {
            tracing::info!(
                target: TRACING_TARGET_SERVER_SHUTDOWN,
                uptime_secs = uptime.as_secs(),
                "shutdown completed"
            );
            Ok(())
        }
        Err(err) => {
            tracing::error!(
                target: TRACING_TARGET_SERVER_SHUTDOWN,
                error = %err,
                kind = ?err.kind(),
                uptime_secs = uptime.as_secs(),
                "server stopped with a fatal error"
            );
            Err(err)
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    #[tokio::test]
    async fn serve_with_shutdown_success() {
        let config = ServerConfig::default();
        let result = serve_with_shutdown(&config, CancellationToken::new(), || async { Ok(()) }).await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn serve_with_shutdown_handles_error() {
        let config = ServerConfig::default();
        let result = serve_with_shutdown(&config, CancellationToken::new(), || async {
            Err(io::Error::other("test error"))
        })
        .await;

        assert!(result.is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn stalled_servers_stop_after_the_deadline() {
        let config = ServerConfig {
            shutdown_timeout: 5,
            ..ServerConfig::default()
        };
        let shutdown = CancellationToken::new();
        shutdown.cancel();

        let result = serve_with_shutdown(&config, shutdown, || async {
            tokio::time::sleep(Duration::from_secs(3600)).await;
            Ok(())
        })
        .await;

        assert!(result.is_ok());
    }
}
