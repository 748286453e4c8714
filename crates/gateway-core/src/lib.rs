//! # ens-gateway-core
//!
//! Names, records, storage and response signing for the ENS offchain subname gateway.

#![cfg_attr(not(test), warn(unused_crate_dependencies))]

#[macro_use]
extern crate tracing;

pub mod abi;
pub mod name;
pub mod record;
pub mod serde_helpers;
pub mod signing;
pub mod store;

pub use name::{Name, NameError, ParentSubdomain, Zone, compute_node, labelhash, namehash};
pub use record::Record;
pub use signing::{ResponseSigner, SignedResponse, SignerError};
pub use store::{JournalStore, MemoryStore, RecordStore, StoreError};
