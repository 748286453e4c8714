use crate::{
    error::{CcipError, GatewayError},
    server::{
        GatewayState,
        types::{
            HealthResponse, LookupRequest, LookupResponse, RegisterRequest, RegistrationResponse,
        },
    },
};
use alloy_primitives::{Address, hex};
use axum::{
    Json,
    extract::{Path, State, rejection::JsonRejection},
};
use std::sync::Arc;

pub async fn register(
    State(state): State<Arc<GatewayState>>,
    body: Result<Json<RegisterRequest>, JsonRejection>,
) -> Result<Json<RegistrationResponse>, GatewayError> {
    let Json(request) = body.map_err(|err| GatewayError::invalid_request(err.body_text()))?;
    // journal appends fsync
    let registration = tokio::task::spawn_blocking(move || {
        state.registry.register(&request.name, request.addr, request.texts)
    })
    .await
    .map_err(GatewayError::internal)??;
    Ok(Json(registration.into()))
}

pub async fn lookup_name(
    State(state): State<Arc<GatewayState>>,
    Path(name): Path<String>,
) -> Result<Json<RegistrationResponse>, GatewayError> {
    Ok(Json(state.registry.lookup(&name)?.into()))
}

/// `GET /{sender}/{data}`, with an optional `.json` suffix on `data`.
pub async fn ccip_get(
    State(state): State<Arc<GatewayState>>,
    Path((sender, data)): Path<(String, String)>,
) -> Result<Json<LookupResponse>, CcipError> {
    let sender = sender
        .parse::<Address>()
        .map_err(|err| GatewayError::invalid_request(format!("invalid sender `{sender}`: {err}")))?;
    let data = data.strip_suffix(".json").unwrap_or(&data);
    let data = hex::decode(data)
        .map_err(|err| GatewayError::invalid_request(format!("invalid call data: {err}")))?;
    ccip_lookup(&state, sender, &data)
}

/// `POST /` with a `{sender, data}` body.
pub async fn ccip_post(
    State(state): State<Arc<GatewayState>>,
    body: Result<Json<LookupRequest>, JsonRejection>,
) -> Result<Json<LookupResponse>, CcipError> {
    let Json(request) = body.map_err(|err| GatewayError::invalid_request(err.body_text()))?;
    ccip_lookup(&state, request.sender, &request.data)
}

fn ccip_lookup(
    state: &GatewayState,
    sender: Address,
    data: &[u8],
) -> Result<Json<LookupResponse>, CcipError> {
    let response = state.resolver.resolve(sender, data).inspect_err(|err| {
        debug!(target: "gateway::server", %sender, %err, "lookup failed");
    })?;
    Ok(Json(LookupResponse { data: response.abi_encode() }))
}

pub async fn health(State(state): State<Arc<GatewayState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        signer: state.resolver.signer_address(),
        zone: state.registry.zone().root().to_string(),
        records: state.store.len(),
    })
}
