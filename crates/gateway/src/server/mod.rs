//! HTTP API of the gateway.

use crate::{registry::Registry, resolver::Resolver};
use axum::{
    Router,
    routing::{get, post},
};
use ens_gateway_core::RecordStore;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

mod handlers;
pub mod types;

/// Shared state of the request handlers.
#[derive(Debug)]
pub struct GatewayState {
    pub registry: Registry,
    pub resolver: Resolver,
    pub store: Arc<dyn RecordStore>,
}

/// Builds the gateway router.
pub fn router(state: Arc<GatewayState>) -> Router {
    Router::new()
        .route("/", post(handlers::ccip_post))
        .route("/register", post(handlers::register))
        .route("/health", get(handlers::health))
        .route("/names/{name}", get(handlers::lookup_name))
        .route("/{sender}/{data}", get(handlers::ccip_get))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
