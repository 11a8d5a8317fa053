//! Server lifecycle: bind, serve, and shut down on Ctrl+C or SIGTERM

use std::future::{Future, IntoFuture};
use std::net::SocketAddr;
use std::time::Duration;

use tokio::signal;
use tracing::{info, warn};

use crate::builder::Application;
use crate::config::HttpConfig;
use crate::errors::{HttpError, HttpResult};

pub struct Server {
    application: Application,
    config: HttpConfig,
}

impl Server {
    pub fn new(application: Application, config: HttpConfig) -> Self {
        Self { application, config }
    }

    pub fn config(&self) -> &HttpConfig {
        &self.config
    }

    /// Serve until a shutdown signal arrives
    pub async fn listen(self) -> HttpResult<()> {
        let addr = self
            .config
            .socket_addr()
            .map_err(|e| HttpError::config(e.to_string()))?;
        let timeout = Duration::from_secs(self.config.shutdown_timeout_secs);
        self.listen_with_shutdown(addr, shutdown_signal(), timeout).await
    }

    /// Serve on `addr` until `shutdown` resolves; in-flight requests get
    /// `timeout` to finish
    pub async fn listen_with_shutdown<F>(self, addr: SocketAddr, shutdown: F, timeout: Duration) -> HttpResult<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .map_err(|e| HttpError::startup(format!("Failed to bind to {}: {}", addr, e)))?;
        let local_addr = listener
            .local_addr()
            .map_err(|e| HttpError::startup(format!("Failed to read bound address: {}", e)))?;

        info!(address = %local_addr, stages = ?self.application.stage_names(), "Server listening");

        let router = self.application.into_router();
        let (drained_tx, drained_rx) = tokio::sync::oneshot::channel::<()>();
        let serve = axum::serve(listener, router.into_make_service_with_connect_info::<SocketAddr>())
            .with_graceful_shutdown(async move {
                shutdown.await;
                let _ = drained_tx.send(());
            })
            .into_future();

        tokio::select! {
            result = serve => {
                result.map_err(|e| HttpError::internal(format!("Server error: {}", e)))?;
            }
            _ = async {
                let _ = drained_rx.await;
                tokio::time::sleep(timeout).await;
            } => {
                warn!(timeout_secs = timeout.as_secs(), "Shutdown timeout elapsed, dropping open connections");
            }
        }

        info!("Server stopped");
        Ok(())
    }
}

/// Resolves on Ctrl+C or, on Unix, SIGTERM
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => warn!("Received Ctrl+C, shutting down gracefully"),
        _ = terminate => warn!("Received terminate signal, shutting down gracefully"),
    }
}
