//! Gateway error types

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use ens_gateway_core::NameError;
use std::fmt;

/// Errors surfaced to gateway clients.
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    /// The name is not a valid `label.parent.root` name of this gateway.
    #[error(transparent)]
    InvalidName(#[from] NameError),
    /// The request could not be decoded or breaks a configured limit.
    #[error("{0}")]
    InvalidRequest(String),
    /// A record for the name already exists.
    #[error("name `{0}` is already registered")]
    NameTaken(String),
    /// No record exists for the name.
    #[error("name `{0}` is not registered")]
    NotFound(String),
    /// Storage or signing failed. The cause is logged, never returned to the client.
    #[error("internal error")]
    Internal,
}

impl GatewayError {
    /// Logs `err` and returns an opaque [`GatewayError::Internal`].
    pub fn internal(err: impl fmt::Display) -> Self {
        error!(target: "gateway", %err, "internal error");
        Self::Internal
    }

    pub fn invalid_request(msg: impl Into<String>) -> Self {
        Self::InvalidRequest(msg.into())
    }

    /// Returns the HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidName(_) | Self::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            Self::NameTaken(_) => StatusCode::CONFLICT,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Renders as `{"success": false, "error": ..}`, the shape of the registration API.
impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        (
            self.status_code(),
            Json(serde_json::json!({
                "success": false,
                "error": self.to_string(),
            })),
        )
            .into_response()
    }
}

/// A [`GatewayError`] returned from the CCIP-Read endpoint.
///
/// EIP-3668 clients expect `{"message": ..}` error bodies.
#[derive(Debug)]
pub struct CcipError(pub GatewayError);

impl From<GatewayError> for CcipError {
    fn from(err: GatewayError) -> Self {
        Self(err)
    }
}

impl IntoResponse for CcipError {
    fn into_response(self) -> Response {
        (self.0.status_code(), Json(serde_json::json!({ "message": self.0.to_string() })))
            .into_response()
    }
}
