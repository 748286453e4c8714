//! # ens-gateway
//!
//! A CCIP-Read (EIP-3668) gateway that hands out free ENS subnames offchain and answers the
//! signed lookups of an ENSIP-10 offchain resolver.

#![cfg_attr(not(test), warn(unused_crate_dependencies))]

#[macro_use]
extern crate tracing;

use crate::{
    registry::Registry,
    resolver::Resolver,
    server::{GatewayState, router},
};
use ens_gateway_core::{JournalStore, MemoryStore, RecordStore};
use eyre::WrapErr;
use std::{net::SocketAddr, sync::Arc};
use tokio::{net::TcpListener, sync::oneshot, task::JoinHandle};

pub mod cmd;
pub mod config;
pub mod error;
pub mod registry;
pub mod resolver;
pub mod server;

pub use config::GatewayConfig;
pub use error::GatewayError;

/// Starts the gateway with the given config.
///
/// Fails if the root domain is invalid, no usable signing key is configured, the journal cannot
/// be replayed, or the socket cannot be bound.
pub async fn try_spawn(config: GatewayConfig) -> eyre::Result<GatewayHandle> {
    let zone = config.zone().wrap_err("invalid root domain")?;
    let signer = config.signer().wrap_err("failed to load signing key")?;

    let store: Arc<dyn RecordStore> = if config.ephemeral {
        Arc::new(MemoryStore::new())
    } else {
        let journal = JournalStore::open(&config.store_path).wrap_err_with(|| {
            format!("failed to open record journal {}", config.store_path.display())
        })?;
        Arc::new(journal)
    };

    info!(
        target: "gateway",
        zone = zone.root(),
        signer = %signer.address(),
        signature_ttl = ?signer.ttl(),
        records = store.len(),
        "starting gateway"
    );

    let state = Arc::new(GatewayState {
        registry: Registry::new(zone.clone(), store.clone(), config.text_limits()),
        resolver: Resolver::new(zone, store.clone(), signer),
        store,
    });

    let listener = TcpListener::bind((config.host, config.port))
        .await
        .wrap_err_with(|| format!("failed to bind {}:{}", config.host, config.port))?;
    let addr = listener.local_addr()?;

    let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
    let app = router(state.clone());
    let server = tokio::spawn(async move {
        axum::serve(listener, app)
            .with_graceful_shutdown(async {
                let _ = shutdown_rx.await;
            })
            .await
    });

    info!(target: "gateway", %addr, "listening");

    Ok(GatewayHandle { addr, state, shutdown: Some(shutdown_tx), server })
}

/// A handle to a running gateway.
#[derive(Debug)]
pub struct GatewayHandle {
    addr: SocketAddr,
    state: Arc<GatewayState>,
    shutdown: Option<oneshot::Sender<()>>,
    server: JoinHandle<std::io::Result<()>>,
}

impl GatewayHandle {
    /// The address the server is bound to.
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// The base URL of the server, e.g. `http://127.0.0.1:8080`.
    pub fn http_endpoint(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn state(&self) -> &Arc<GatewayState> {
        &self.state
    }

    /// Stops accepting connections and waits for in-flight requests to finish.
    pub async fn shutdown(mut self) -> eyre::Result<()> {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
        self.server.await??;
        info!(target: "gateway", "stopped");
        Ok(())
    }
}
