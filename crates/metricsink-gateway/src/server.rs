//! HTTP server lifecycle for the ingestion endpoint.
//!
//! `start` binds and serves in a background task; `stop` triggers axum's
//! graceful shutdown and waits for in-flight requests, bounded by the
//! configured shutdown timeout.

use std::net::SocketAddr;
use std::time::Duration;

use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

use metricsink_core::error::{MetricSinkError, Result};

use crate::app_state::AppState;
use crate::router;

struct Running {
    shutdown_tx: oneshot::Sender<()>,
    task: JoinHandle<()>,
}

pub struct IngestServer {
    state: AppState,
    listen: SocketAddr,
    shutdown_timeout: Duration,
    running: Option<Running>,
}

impl IngestServer {
    pub fn new(state: AppState, listen: SocketAddr, shutdown_timeout: Duration) -> Self {
        Self {
            state,
            listen,
            shutdown_timeout,
            running: None,
        }
    }

    /// Bind the listener and start serving. Returns the bound address.
    pub async fn start(&mut self) -> Result<SocketAddr> {
        if self.running.is_some() {
            return Err(MetricSinkError::Lifecycle("server already started".into()));
        }

        let listener = TcpListener::bind(self.listen)
            .await
            .map_err(|e| MetricSinkError::Internal(format!("bind {} failed: {e}", self.listen)))?;
        let local_addr = listener
            .local_addr()
            .map_err(|e| MetricSinkError::Internal(format!("local_addr failed: {e}")))?;

        let app = router::build_router(self.state.clone());
        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();

        let task = tokio::spawn(async move {
            let served = axum::serve(listener, app)
                .with_graceful_shutdown(async {
                    let _ = shutdown_rx.await;
                })
                .await;
            if let Err(e) = served {
                tracing::error!(subsystem = "web_server", error = %e, "http server failed");
            }
        });

        self.running = Some(Running { shutdown_tx, task });
        tracing::info!(subsystem = "web_server", listen = %local_addr, "started");
        Ok(local_addr)
    }

    /// Stop accepting connections and wait for in-flight requests.
    pub async fn stop(&mut self) -> Result<()> {
        let Running { shutdown_tx, mut task } = self
            .running
            .take()
            .ok_or_else(|| MetricSinkError::Lifecycle("server not started".into()))?;

        let _ = shutdown_tx.send(());

        match tokio::time::timeout(self.shutdown_timeout, &mut task).await {
            Ok(Ok(())) => {
                tracing::info!(subsystem = "web_server", "stopped");
                Ok(())
            }
            Ok(Err(e)) => Err(MetricSinkError::Internal(format!("http server task failed: {e}"))),
            Err(_) => {
                task.abort();
                tracing::error!(
                    subsystem = "web_server",
                    timeout_ms = self.shutdown_timeout.as_millis() as u64,
                    "failed to stop http server in time"
                );
                Err(MetricSinkError::Internal(
                    "graceful http shutdown timed out".into(),
                ))
            }
        }
    }
}
