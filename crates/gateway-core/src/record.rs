use alloy_primitives::Address;
use chrono::{DateTime, SubsecRound, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Resolution data stored for a registered subname.
///
/// Records are created once at registration and never modified afterwards.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Record {
    /// The address `addr(node)` resolves to, if any.
    #[serde(with = "crate::serde_helpers::checksum_opt", default)]
    pub addr: Option<Address>,
    /// Text records, keyed by ENSIP-5 key.
    #[serde(default)]
    pub texts: BTreeMap<String, String>,
    /// When the gateway accepted the registration.
    pub registered_at: DateTime<Utc>,
}

impl Record {
    pub fn new(
        addr: Option<Address>,
        texts: BTreeMap<String, String>,
        registered_at: DateTime<Utc>,
    ) -> Self {
        Self { addr, texts, registered_at: registered_at.trunc_subsecs(3) }
    }

    /// Returns the text record for `key`, if set.
    pub fn text(&self, key: &str) -> Option<&str> {
        self.texts.get(key).map(String::as_str)
    }
}
