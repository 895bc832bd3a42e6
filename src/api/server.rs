//! API server lifecycle.
//!
//! `serve` binds and runs in the foreground (binary entry point);
//! `start_server` binds an ephemeral port and runs in a background task with
//! a shutdown channel, for tests and embedding.

use std::net::{IpAddr, SocketAddr};

use tokio::sync::oneshot;

use crate::api::router::storefront_router;
use crate::api::types::ApiContext;

/// Handle to a background API server.
pub struct ApiServer {
    pub addr: SocketAddr,
    shutdown_tx: Option<oneshot::Sender<()>>,
}

impl ApiServer {
    /// Shut down the server gracefully.
    pub fn shutdown(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
            tracing::info!("API server shutdown signal sent");
        }
    }
}

/// Bind `addr` and serve until the process exits.
pub async fn serve(ctx: ApiContext, addr: SocketAddr) -> Result<(), String> {
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| format!("Failed to bind API server: {e}"))?;

    tracing::info!(%addr, "storefront API listening");

    axum::serve(listener, storefront_router(ctx))
        .await
        .map_err(|e| format!("API server error: {e}"))
}

/// Start the API server on an ephemeral port in a background task.
pub async fn start_server(ctx: ApiContext, ip: IpAddr) -> Result<ApiServer, String> {
    let listener = tokio::net::TcpListener::bind(SocketAddr::new(ip, 0))
        .await
        .map_err(|e| format!("Failed to bind API server: {e}"))?;

    let addr = listener
        .local_addr()
        .map_err(|e| format!("Failed to get server address: {e}"))?;

    let app = storefront_router(ctx);
    let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();

    tokio::spawn(async move {
        let shutdown_signal = async move {
            let _ = shutdown_rx.await;
            tracing::info!("API server received shutdown signal");
        };

        tracing::info!(%addr, "API server started");

        if let Err(e) = axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal)
            .await
        {
            tracing::error!("API server error: {e}");
        }

        tracing::info!("API server stopped");
    });

    Ok(ApiServer {
        addr,
        shutdown_tx: Some(shutdown_tx),
    })
}
