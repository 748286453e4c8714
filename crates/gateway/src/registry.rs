//! Registration of free subnames.

use crate::{config::TextLimits, error::GatewayError};
use alloy_primitives::{Address, B256};
use chrono::{DateTime, Utc};
use ens_gateway_core::{Name, Record, RecordStore, StoreError, Zone, labelhash};
use parking_lot::Mutex;
use std::{collections::BTreeMap, sync::Arc};

/// A committed registration.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Registration {
    pub name: Name,
    pub node: B256,
    pub record: Record,
}

/// Validates registrations and commits them to the [`RecordStore`].
#[derive(Debug)]
pub struct Registry {
    zone: Zone,
    store: Arc<dyn RecordStore>,
    limits: TextLimits,
    /// Timestamp of the last committed registration.
    ///
    /// Held across the store write so timestamps never decrease in commit order.
    last_registered_at: Mutex<DateTime<Utc>>,
}

impl Registry {
    pub fn new(zone: Zone, store: Arc<dyn RecordStore>, limits: TextLimits) -> Self {
        let last = store.latest_registration().unwrap_or_default();
        Self { zone, store, limits, last_registered_at: Mutex::new(last) }
    }

    pub fn zone(&self) -> &Zone {
        &self.zone
    }

    /// Registers `name`.
    ///
    /// Fails with [`GatewayError::NameTaken`] if the name was registered before; the existing
    /// record is left untouched.
    pub fn register(
        &self,
        name: &str,
        addr: Option<Address>,
        texts: BTreeMap<String, String>,
    ) -> Result<Registration, GatewayError> {
        let name = self.zone.parse(name)?;
        self.check_texts(&texts)?;
        let node = name.node();

        let mut last = self.last_registered_at.lock();
        let record = Record::new(addr, texts, (*last).max(Utc::now()));
        match self.store.put(node, record.clone()) {
            Ok(()) => {
                *last = record.registered_at;
                info!(
                    target: "gateway::registry",
                    %name,
                    %node,
                    labelhash = %labelhash(name.label()),
                    "registered"
                );
                Ok(Registration { name, node, record })
            }
            Err(StoreError::AlreadyExists(_)) => {
                debug!(target: "gateway::registry", %name, "name already taken");
                Err(GatewayError::NameTaken(name.to_string()))
            }
            Err(err) => Err(GatewayError::internal(format!("failed to store {name}: {err}"))),
        }
    }

    /// Returns the registration of `name`.
    pub fn lookup(&self, name: &str) -> Result<Registration, GatewayError> {
        let name = self.zone.parse(name)?;
        let node = name.node();
        match self.store.get(&node) {
            Some(record) => Ok(Registration { name, node, record }),
            None => Err(GatewayError::NotFound(name.to_string())),
        }
    }

    fn check_texts(&self, texts: &BTreeMap<String, String>) -> Result<(), GatewayError> {
        if texts.len() > self.limits.max_records {
            return Err(GatewayError::invalid_request(format!(
                "too many text records: {} > {}",
                texts.len(),
                self.limits.max_records
            )));
        }
        for (key, value) in texts {
            if key.is_empty() {
                return Err(GatewayError::invalid_request("text record keys must not be empty"));
            }
            if key.len() > self.limits.max_key_len {
                return Err(GatewayError::invalid_request(format!(
                    "text record key exceeds {} bytes",
                    self.limits.max_key_len
                )));
            }
            if value.len() > self.limits.max_value_len {
                return Err(GatewayError::invalid_request(format!(
                    "text record `{key}` exceeds {} bytes",
                    self.limits.max_value_len
                )));
            }
        }
        Ok(())
    }
}
