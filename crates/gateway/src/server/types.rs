use crate::registry::Registration;
use alloy_primitives::{Address, B256, Bytes};
use ens_gateway_core::Record;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RegisterRequest {
    pub name: String,
    #[serde(default)]
    pub addr: Option<Address>,
    #[serde(default)]
    pub texts: BTreeMap<String, String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistrationResponse {
    pub success: bool,
    pub name: String,
    pub node: B256,
    pub record: Record,
}

impl From<Registration> for RegistrationResponse {
    fn from(registration: Registration) -> Self {
        Self {
            success: true,
            name: registration.name.to_string(),
            node: registration.node,
            record: registration.record,
        }
    }
}

/// Body of an EIP-3668 `POST` lookup.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LookupRequest {
    pub sender: Address,
    pub data: Bytes,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LookupResponse {
    pub data: Bytes,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    #[serde(with = "ens_gateway_core::serde_helpers::checksum")]
    pub signer: Address,
    pub zone: String,
    pub records: usize,
}
