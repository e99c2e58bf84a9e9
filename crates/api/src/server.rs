//! HTTP serving with a bounded graceful shutdown.

use std::future::Future;
use std::time::Duration;

use axum::Router;
use tokio::net::TcpListener;

/// How the server stopped after the shutdown signal fired.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShutdownOutcome {
    /// Every in-flight request finished before the deadline.
    Drained,
    /// The deadline passed with requests still running; they were dropped.
    TimedOut,
}

/// Serve `app` until `signal` resolves, then give in-flight requests at most
/// `drain_timeout` to finish.
pub async fn serve_with_shutdown<F>(
    listener: TcpListener,
    app: Router,
    signal: F,
    drain_timeout: Duration,
) -> std::io::Result<ShutdownOutcome>
where
    F: Future<Output = ()> + Send + 'static,
{
    let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel::<()>();
    let mut server = tokio::spawn(async move {
        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = shutdown_rx.await;
            })
            .await
    });

    tokio::select! {
        result = &mut server => {
            result.map_err(std::io::Error::other)??;
            return Ok(ShutdownOutcome::Drained);
        }
        () = signal => {}
    }

    let _ = shutdown_tx.send(());
    match tokio::time::timeout(drain_timeout, &mut server).await {
        Ok(result) => {
            result.map_err(std::io::Error::other)??;
            Ok(ShutdownOutcome::Drained)
        }
        Err(_) => {
            server.abort();
            tracing::warn!(
                timeout_secs = drain_timeout.as_secs(),
                "In-flight requests did not finish before the shutdown timeout",
            );
            Ok(ShutdownOutcome::TimedOut)
        }
    }
}
