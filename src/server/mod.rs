//! Local HTTP bridge that lets paired browsers reach the store.
//!
//! This module provides:
//! - Shared request state (`AppState`)
//! - Authorization extractors and response sealing (`middleware`)
//! - Typed request/response bodies (`models`)
//! - The browser-facing entry view (`facade`)
//! - Route handlers (`handlers`) and the router built from them
//!
//! Store and crypto work runs on tokio's blocking pool so a slow key
//! derivation or password prompt never stalls the reactor.

pub mod error;
pub mod facade;
pub mod handlers;
pub mod middleware;
pub mod models;

use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;
use parking_lot::Mutex;
use tokio::net::TcpListener;
use tokio::signal;
use tower_http::trace::TraceLayer;
use uuid::Uuid;

use crate::channel::SecureChannel;
use crate::errors::{KitsupassError, Result};
use crate::notify::Notifier;
use crate::vault::Vault;

/// Everything a handler needs, cheap to clone.
#[derive(Clone)]
pub struct AppState {
    pub vault: Arc<Mutex<Vault>>,
    pub vault_id: Uuid,
    pub channel: Arc<SecureChannel>,
    pub notifier: Arc<dyn Notifier>,
}

impl AppState {
    /// Build the state, reading the store identifier from its marker.
    pub fn new(
        mut vault: Vault,
        channel: SecureChannel,
        notifier: Arc<dyn Notifier>,
    ) -> Result<Self> {
        let vault_id = vault.identify()?;
        Ok(Self {
            vault: Arc::new(Mutex::new(vault)),
            vault_id,
            channel: Arc::new(channel),
            notifier,
        })
    }

    /// Run `f` against the locked vault on the blocking pool.
    pub async fn with_vault<T, F>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&mut Vault) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let vault = Arc::clone(&self.vault);
        run_blocking(move || {
            let mut guard = vault.lock();
            f(&mut *guard)
        })
        .await
    }

    /// Open the vault if it is closed.
    ///
    /// The mutex is held only to read the marker and to install the
    /// password. The cache lookup and any terminal prompt run without it,
    /// so other routes keep answering while the prompt waits.
    pub async fn unlock_vault(&self) -> Result<()> {
        let pending = self
            .with_vault(|vault| {
                if vault.is_open() {
                    Ok(None)
                } else {
                    vault.unlocker().map(Some)
                }
            })
            .await?;
        let Some(unlocker) = pending else {
            return Ok(());
        };

        let verified = run_blocking(move || unlocker.obtain()).await?;
        self.with_vault(move |vault| vault.unlock_with(verified)).await
    }

    /// Seal `plaintext` for `peer` on the blocking pool.
    pub async fn encrypt(&self, peer: &str, plaintext: Vec<u8>) -> Result<String> {
        let channel = Arc::clone(&self.channel);
        let peer = peer.to_string();
        run_blocking(move || channel.encrypt_payload(&peer, &plaintext)).await
    }

    /// Open an envelope from `peer` on the blocking pool.
    pub async fn decrypt(&self, peer: &str, sealed: String) -> Result<Vec<u8>> {
        let channel = Arc::clone(&self.channel);
        let peer = peer.to_string();
        run_blocking(move || channel.decrypt_payload(&peer, &sealed)).await
    }
}

async fn run_blocking<T, F>(f: F) -> Result<T>
where
    F: FnOnce() -> Result<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| KitsupassError::CommandFailed(format!("background task failed: {e}")))?
}

/// All bridge routes, with request tracing.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/v1/auth/request", post(handlers::auth_request))
        .route("/v1/auth/response", post(handlers::auth_response))
        .route("/v1/auth/test", post(handlers::auth_test))
        .route("/v1/entries", get(handlers::search_entries))
        .route("/v1/entries/specific", post(handlers::specific_entries))
        .route("/v1/otps", get(handlers::otps))
        .route("/v1/vaults", get(handlers::vaults))
        .route("/v1/vaults-tree", get(handlers::vaults_tree))
        .route(
            "/v1/vaults/{id}/group/{gid}/entry",
            post(handlers::save_entry),
        )
        .route("/v1/vaults/{id}/lock", post(handlers::lock))
        .route("/v1/vaults/{id}/unlock", post(handlers::unlock))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Bind `addr` and serve until Ctrl+C or SIGTERM.
pub async fn serve(addr: &str, state: AppState) -> Result<()> {
    let listener = TcpListener::bind(addr).await?;
    tracing::info!(address = %addr, vault = %state.vault_id, "bridge listening");

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("bridge shut down");
    Ok(())
}

/// Resolves on Ctrl+C or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("failed to install Ctrl+C handler: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!("failed to install SIGTERM handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }
    tracing::info!("shutdown signal received");
}
