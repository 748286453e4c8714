//! Signing of CCIP-Read responses.
//!
//! The offchain resolver contract recomputes [`signature_hash`] on-chain and only accepts the
//! response if it recovers to one of its configured signers.

use alloy_primitives::{Address, B256, Bytes, Signature, SignatureError, keccak256};
use alloy_signer::SignerSync;
use alloy_signer_local::{LocalSignerError, PrivateKeySigner};
use alloy_sol_types::SolValue;
use std::{
    fmt,
    path::{Path, PathBuf},
    time::Duration,
};

/// Prefix of every signed payload: EIP-191 version `0x00`, "data with intended validator".
pub const SIGNATURE_PREFIX: [u8; 2] = [0x19, 0x00];

/// Errors raised while loading the gateway's signing key.
#[derive(Debug, thiserror::Error)]
pub enum SignerError {
    #[error("no signing key configured, set `private_key` or `keystore`")]
    Missing,
    #[error("both `private_key` and `keystore` are configured, use only one")]
    Ambiguous,
    #[error("invalid private key")]
    InvalidKey(#[source] LocalSignerError),
    #[error("keystore {0:?} requires a password")]
    MissingPassword(PathBuf),
    #[error("failed to decrypt keystore {path:?}")]
    Keystore {
        path: PathBuf,
        #[source]
        source: LocalSignerError,
    },
}

/// Loads the signing key from either a raw hex private key or an encrypted JSON keystore.
pub fn load_signer(
    private_key: Option<&str>,
    keystore: Option<&Path>,
    keystore_password: Option<&str>,
) -> Result<PrivateKeySigner, SignerError> {
    match (private_key, keystore) {
        (Some(_), Some(_)) => Err(SignerError::Ambiguous),
        (None, None) => Err(SignerError::Missing),
        (Some(key), None) => key.trim().parse().map_err(SignerError::InvalidKey),
        (None, Some(path)) => {
            let password = keystore_password
                .ok_or_else(|| SignerError::MissingPassword(path.to_path_buf()))?;
            PrivateKeySigner::decrypt_keystore(path, password)
                .map_err(|source| SignerError::Keystore { path: path.to_path_buf(), source })
        }
    }
}

/// Computes the digest the resolver contract verifies:
///
/// `keccak256(0x1900 ‖ target ‖ uint64 expires ‖ keccak256(request) ‖ keccak256(result))`
pub fn signature_hash(target: Address, expires: u64, request: &[u8], result: &[u8]) -> B256 {
    let mut payload = Vec::with_capacity(2 + 20 + 8 + 32 + 32);
    payload.extend_from_slice(&SIGNATURE_PREFIX);
    payload.extend_from_slice(target.as_slice());
    payload.extend_from_slice(&expires.to_be_bytes());
    payload.extend_from_slice(keccak256(request).as_slice());
    payload.extend_from_slice(keccak256(result).as_slice());
    keccak256(payload)
}

/// Signs `hash` with `key`.
pub fn sign(hash: &B256, key: &PrivateKeySigner) -> alloy_signer::Result<Signature> {
    key.sign_hash_sync(hash)
}

/// A decoded `(bytes result, uint64 expires, bytes sig)` response.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SignedResponse {
    pub result: Bytes,
    pub expires: u64,
    pub signature: Signature,
}

impl SignedResponse {
    /// ABI-encodes the response as returned to the CCIP-Read client.
    pub fn abi_encode(&self) -> Bytes {
        (self.result.clone(), self.expires, Bytes::from(self.signature.as_bytes()))
            .abi_encode_params()
            .into()
    }

    /// Decodes a response produced by [`abi_encode`](Self::abi_encode).
    pub fn abi_decode(data: &[u8]) -> Result<Self, ResponseDecodeError> {
        let (result, expires, signature) = <(Bytes, u64, Bytes)>::abi_decode_params(data)?;
        let signature = Signature::try_from(signature.as_ref())?;
        Ok(Self { result, expires, signature })
    }

    /// Recovers the address that signed this response for `target` and `request`.
    pub fn recover_signer(
        &self,
        target: Address,
        request: &[u8],
    ) -> Result<Address, SignatureError> {
        let hash = signature_hash(target, self.expires, request, &self.result);
        self.signature.recover_address_from_prehash(&hash)
    }
}

/// Errors returned by [`SignedResponse::abi_decode`].
#[derive(Debug, thiserror::Error)]
pub enum ResponseDecodeError {
    #[error(transparent)]
    Abi(#[from] alloy_sol_types::Error),
    #[error(transparent)]
    Signature(#[from] SignatureError),
}

/// Signs resolution results with the gateway key.
pub struct ResponseSigner {
    key: PrivateKeySigner,
    ttl: Duration,
}

impl ResponseSigner {
    /// Creates a signer whose responses stay valid for `ttl`.
    pub fn new(key: PrivateKeySigner, ttl: Duration) -> Self {
        Self { key, ttl }
    }

    /// The address resolver contracts must trust.
    pub fn address(&self) -> Address {
        self.key.address()
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Signs `result` as the answer to `request` sent to `target`, valid from `now` (unix seconds)
    /// until `now + ttl`.
    pub fn sign_response(
        &self,
        target: Address,
        request: &[u8],
        result: Bytes,
        now: u64,
    ) -> alloy_signer::Result<SignedResponse> {
        let expires = now.saturating_add(self.ttl.as_secs());
        let hash = signature_hash(target, expires, request, &result);
        let signature = sign(&hash, &self.key)?;
        Ok(SignedResponse { result, expires, signature })
    }
}

impl fmt::Debug for ResponseSigner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResponseSigner")
            .field("address", &self.address())
            .field("ttl", &self.ttl)
            .finish_non_exhaustive()
    }
}
