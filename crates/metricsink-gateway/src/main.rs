//! metricsink gateway
//!
//! - HTTP endpoint: any method on `/<metric>` records `<metric>`
//! - Buffered store: metrics are appended to a file every flush interval
//! - SIGINT/SIGTERM stop the store and the server concurrently
//!
//! Usage: `metricsink-gateway [config.yaml]` (built-in defaults without a path).

use std::sync::Arc;
use std::time::Instant;

use tracing_subscriber::{fmt, EnvFilter};

use metricsink_core::error::Result;
use metricsink_gateway::{
    app_state::AppState,
    config::{self, SinkConfig},
    server::IngestServer,
    store::BufferedStore,
};

#[tokio::main]
async fn main() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt().with_env_filter(filter).init();

    if let Err(e) = run().await {
        tracing::error!(code = e.code().as_str(), error = %e, "metricsink-gateway failed");
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let cfg = match std::env::args().nth(1) {
        Some(path) => config::load_from_file(&path)?,
        None => SinkConfig::default(),
    };

    let store = Arc::new(BufferedStore::new(cfg.store.to_store_config())?);
    store.start()?;

    let mut server = IngestServer::new(
        AppState::new(store.clone()),
        cfg.server.listen_addr()?,
        cfg.server.shutdown_timeout(),
    );
    let listen = match server.start().await {
        Ok(addr) => addr,
        Err(e) => {
            store.stop().await?;
            return Err(e);
        }
    };
    tracing::info!(%listen, path = %cfg.store.path, "metricsink-gateway started");

    let signal = shutdown_signal().await;
    tracing::info!(signal, "captured signal, stopping");

    let started = Instant::now();
    let (store_res, server_res) = tokio::join!(store.stop(), server.stop());
    tracing::info!(
        "stopped in {} seconds, exiting",
        started.elapsed().as_secs_f64()
    );

    store_res?;
    server_res
}

async fn shutdown_signal() -> &'static str {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to listen for SIGINT");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut s) => {
                s.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => "SIGINT",
        _ = terminate => "SIGTERM",
    }
}
