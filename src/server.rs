//! HTTP server lifecycle
//!
//! A `Server` owns a bound listener and the router. `start` spawns it onto
//! the runtime and returns a `ServerHandle`; `ServerHandle::stop` stops
//! accepting connections and waits for in-flight requests to finish.

use std::net::SocketAddr;

use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

use crate::AppState;
use crate::error::AppError;

/// A bound, not yet running server
pub struct Server {
    listener: TcpListener,
    router: axum::Router,
    addr: SocketAddr,
}

impl Server {
    /// Bind `server.host:server.port` and build the router
    ///
    /// Port 0 binds an ephemeral port; read it back with `local_addr`.
    ///
    /// # Errors
    /// Returns error if the address cannot be bound
    pub async fn bind(state: AppState) -> Result<Self, AppError> {
        crate::metrics::init_metrics();

        let bind_addr = state.config.server.bind_addr();
        let listener = TcpListener::bind(&bind_addr).await?;
        let addr = listener.local_addr()?;
        let router = crate::build_router(state);

        tracing::info!(%addr, "Server bound");

        Ok(Self {
            listener,
            router,
            addr,
        })
    }

    pub fn local_addr(&self) -> SocketAddr {
        self.addr
    }

    /// Spawn the server onto the current runtime
    pub fn start(self) -> ServerHandle {
        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
        let Self {
            listener,
            router,
            addr,
        } = self;

        let task = tokio::spawn(async move {
            tracing::info!("Listening on {}...", addr);
            axum::serve(listener, router)
                .with_graceful_shutdown(async move {
                    // A dropped sender counts as a stop request too.
                    let _ = shutdown_rx.await;
                })
                .await
        });

        ServerHandle {
            addr,
            shutdown_tx,
            task,
        }
    }
}

/// Handle to a running server
pub struct ServerHandle {
    addr: SocketAddr,
    shutdown_tx: oneshot::Sender<()>,
    task: JoinHandle<std::io::Result<()>>,
}

impl ServerHandle {
    pub fn local_addr(&self) -> SocketAddr {
        self.addr
    }

    /// Stop accepting connections and wait for in-flight requests
    ///
    /// # Errors
    /// Returns error if the server task failed or panicked
    pub async fn stop(self) -> Result<(), AppError> {
        tracing::info!(addr = %self.addr, "Stopping server");
        let _ = self.shutdown_tx.send(());

        self.task
            .await
            .map_err(|e| AppError::Internal(e.into()))??;

        tracing::info!("Server stopped gracefully");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ephemeral_state() -> AppState {
        let mut config = crate::config::test_config();
        config.server.host = "127.0.0.1".to_string();
        config.server.port = 0;
        AppState::new(config).unwrap()
    }

    #[tokio::test]
    async fn bind_reports_ephemeral_port() {
        let server = Server::bind(ephemeral_state()).await.unwrap();
        assert_ne!(server.local_addr().port(), 0);
    }

    #[tokio::test]
    async fn stop_releases_the_port() {
        let handle = Server::bind(ephemeral_state()).await.unwrap().start();
        let addr = handle.local_addr();

        handle.stop().await.unwrap();

        let rebound = TcpListener::bind(addr).await;
        assert!(rebound.is_ok());
    }
}
