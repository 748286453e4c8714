//! Storage of registered records, keyed by node.
//!
//! A store holds at most one [`Record`] per node, forever: [`RecordStore::put`] is an atomic
//! insert-if-absent and there is no update or delete.

use crate::record::Record;
use alloy_primitives::{B256, map::HashMap};
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use std::fmt;

mod journal;
pub use journal::JournalStore;

/// Errors returned by a [`RecordStore`].
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("a record for node {0} already exists")]
    AlreadyExists(B256),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl StoreError {
    pub fn is_already_exists(&self) -> bool {
        matches!(self, Self::AlreadyExists(_))
    }
}

/// Node-keyed record storage shared by registration and resolution.
#[auto_impl::auto_impl(&, Box, Arc)]
pub trait RecordStore: fmt::Debug + Send + Sync {
    /// Returns the record stored for `node`.
    fn get(&self, node: &B256) -> Option<Record>;

    /// Inserts `record` for `node` unless a record already exists.
    ///
    /// Concurrent calls for the same node result in exactly one success; every other call
    /// returns [`StoreError::AlreadyExists`].
    fn put(&self, node: B256, record: Record) -> Result<(), StoreError>;

    /// Number of stored records.
    fn len(&self) -> usize;

    /// Returns `true` if nothing has been registered yet.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The most recent registration timestamp.
    fn latest_registration(&self) -> Option<DateTime<Utc>>;
}

/// A [`RecordStore`] that only lives in memory.
#[derive(Debug, Default)]
pub struct MemoryStore {
    records: RwLock<HashMap<B256, Record>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl RecordStore for MemoryStore {
    fn get(&self, node: &B256) -> Option<Record> {
        self.records.read().get(node).cloned()
    }

    fn put(&self, node: B256, record: Record) -> Result<(), StoreError> {
        let mut records = self.records.write();
        if records.contains_key(&node) {
            return Err(StoreError::AlreadyExists(node));
        }
        records.insert(node, record);
        Ok(())
    }

    fn len(&self) -> usize {
        self.records.read().len()
    }

    fn latest_registration(&self) -> Option<DateTime<Utc>> {
        latest(self.records.read().values())
    }
}

pub(crate) fn latest<'a>(records: impl IntoIterator<Item = &'a Record>) -> Option<DateTime<Utc>> {
    records.into_iter().map(|record| record.registered_at).max()
}
