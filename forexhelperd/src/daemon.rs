//! Daemon: Main runtime orchestrator.
//!
//! # Lifecycle
//!
//! 1. Load configuration
//! 2. Build the journal service over the store
//! 3. Start the API server
//! 4. Graceful shutdown on SIGINT

use std::net::SocketAddr;
use std::sync::Arc;

use tokio::net::TcpListener;
use tracing::{error, info};

use forexhelper_store::{MemoryStore, Store};

use crate::api::{create_router, ApiState};
use crate::config::Config;
use crate::error::{DaemonError, DaemonResult};
use crate::journal::JournalService;

// =============================================================================
// Daemon
// =============================================================================

/// The Forex Helper daemon.
pub struct Daemon<S: Store + 'static> {
    /// Configuration
    config: Config,
    /// Journal service shared with the API
    journal: Arc<JournalService<S>>,
}

impl Daemon<MemoryStore> {
    /// Create a daemon over an in-memory store.
    pub fn new_in_memory(config: Config) -> Self {
        let store = Arc::new(MemoryStore::new());
        let journal = Arc::new(JournalService::from_config(store, &config.journal));
        Self::new(config, journal)
    }
}

impl<S: Store + 'static> Daemon<S> {
    /// Create a daemon with a provided journal service.
    pub fn new(config: Config, journal: Arc<JournalService<S>>) -> Self {
        Self { config, journal }
    }

    /// Run the daemon.
    ///
    /// Serves the API until shutdown is requested (SIGINT).
    pub async fn run(self) -> DaemonResult<()> {
        info!(
            version = env!("CARGO_PKG_VERSION"),
            environment = %self.config.environment,
            account_currency = %self.journal.account_currency(),
            "Starting Forex Helper daemon"
        );

        let listener = self.bind().await?;
        let api_addr = local_addr(&listener)?;
        info!(%api_addr, "API server started");

        axum::serve(listener, self.router())
            .with_graceful_shutdown(shutdown_signal())
            .await
            .map_err(|e| DaemonError::Config(format!("API server error: {}", e)))?;

        info!("Shutdown complete");
        Ok(())
    }

    /// Start the API server in a background task.
    pub async fn start_api_server(&self) -> DaemonResult<SocketAddr> {
        let listener = self.bind().await?;
        let addr = local_addr(&listener)?;
        let router = self.router();

        tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, router).await {
                error!(error = %e, "API server error");
            }
        });

        Ok(addr)
    }

    fn router(&self) -> axum::Router {
        create_router(Arc::new(ApiState {
            journal: self.journal.clone(),
        }))
    }

    async fn bind(&self) -> DaemonResult<TcpListener> {
        let addr = format!("{}:{}", self.config.api.host, self.config.api.port);
        TcpListener::bind(&addr)
            .await
            .map_err(|e| DaemonError::Config(format!("Failed to bind to {}: {}", addr, e)))
    }
}

fn local_addr(listener: &TcpListener) -> DaemonResult<SocketAddr> {
    listener
        .local_addr()
        .map_err(|e| DaemonError::Config(format!("Failed to get local address: {}", e)))
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "Failed to listen for shutdown signal");
        return;
    }
    info!("Received shutdown signal");
}

// =============================================================================
// Tests
// =============================================================================
