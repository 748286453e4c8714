//! CCIP-Read resolution.
//!
//! Answers the `resolve(bytes name, bytes data)` calls an ENSIP-10 offchain resolver forwards via
//! `OffchainLookup`, and signs the result so the resolver's callback accepts it.

use crate::error::GatewayError;
use alloy_primitives::{Address, Bytes, U256, hex};
use alloy_sol_types::{SolCall, SolValue};
use chrono::Utc;
use ens_gateway_core::{
    Record, RecordStore, ResponseSigner, SignedResponse, Zone,
    abi::{
        COIN_TYPE_ETH, IAddrResolver, IAddressResolver, IContentHashResolver, IExtendedResolver,
        ITextResolver,
    },
};
use std::sync::Arc;

/// Resolves names from the [`RecordStore`] and signs the answers.
#[derive(Debug)]
pub struct Resolver {
    zone: Zone,
    store: Arc<dyn RecordStore>,
    signer: ResponseSigner,
}

impl Resolver {
    pub fn new(zone: Zone, store: Arc<dyn RecordStore>, signer: ResponseSigner) -> Self {
        Self { zone, store, signer }
    }

    /// The address resolver contracts must trust.
    pub fn signer_address(&self) -> Address {
        self.signer.address()
    }

    /// Handles a CCIP-Read request sent by the resolver contract `sender`.
    pub fn resolve(
        &self,
        sender: Address,
        call_data: &[u8],
    ) -> Result<SignedResponse, GatewayError> {
        let result = self.answer(call_data)?;
        let now = u64::try_from(Utc::now().timestamp()).unwrap_or_default();
        self.signer
            .sign_response(sender, call_data, result, now)
            .map_err(|err| GatewayError::internal(format!("failed to sign response: {err}")))
    }

    /// Computes the unsigned, ABI-encoded answer to a `resolve(bytes,bytes)` call.
    ///
    /// Unregistered names resolve to empty values rather than an error.
    pub fn answer(&self, call_data: &[u8]) -> Result<Bytes, GatewayError> {
        let call = decode_call::<IExtendedResolver::resolveCall>(call_data)?;
        let name = self.zone.decode_dns(&call.name)?;
        let node = name.node();
        let record = self.store.get(&node);
        trace!(target: "gateway::resolver", %name, %node, found = record.is_some(), "resolving");
        answer_call(&call.data, record.as_ref())
    }
}

/// Dispatches the wrapped resolver call on its selector.
fn answer_call(data: &[u8], record: Option<&Record>) -> Result<Bytes, GatewayError> {
    let selector = data
        .get(..4)
        .ok_or_else(|| GatewayError::invalid_request("missing resolver function selector"))?;

    let encoded = if selector == IAddrResolver::addrCall::SELECTOR {
        decode_call::<IAddrResolver::addrCall>(data)?;
        record.and_then(|record| record.addr).unwrap_or_default().abi_encode()
    } else if selector == IAddressResolver::addrCall::SELECTOR {
        let call = decode_call::<IAddressResolver::addrCall>(data)?;
        let addr = record
            .and_then(|record| record.addr)
            .filter(|_| call.coinType == U256::from(COIN_TYPE_ETH));
        Bytes::from(addr.map(|addr| addr.to_vec()).unwrap_or_default()).abi_encode()
    } else if selector == ITextResolver::textCall::SELECTOR {
        let call = decode_call::<ITextResolver::textCall>(data)?;
        let text = record.and_then(|record| record.text(&call.key)).unwrap_or_default();
        text.to_string().abi_encode()
    } else if selector == IContentHashResolver::contenthashCall::SELECTOR {
        decode_call::<IContentHashResolver::contenthashCall>(data)?;
        Bytes::new().abi_encode()
    } else {
        return Err(GatewayError::invalid_request(format!(
            "unsupported resolver function 0x{}",
            hex::encode(selector)
        )));
    };
    Ok(encoded.into())
}

fn decode_call<C: SolCall>(data: &[u8]) -> Result<C, GatewayError> {
    C::abi_decode(data).map_err(|err| {
        GatewayError::invalid_request(format!("invalid `{}` call: {err}", C::SIGNATURE))
    })
}
