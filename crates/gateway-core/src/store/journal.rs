use super::{RecordStore, StoreError, latest};
use crate::record::Record;
use alloy_primitives::{B256, map::HashMap};
use chrono::{DateTime, Utc};
use parking_lot::{Mutex, RwLock};
use serde::{Deserialize, Serialize};
use std::{
    fmt,
    fs::{self, File, OpenOptions},
    io::{BufRead, BufReader, Write},
    path::{Path, PathBuf},
};

/// One line of the journal file.
#[derive(Debug, Serialize, Deserialize)]
struct Entry<R> {
    node: B256,
    record: R,
}

/// A [`RecordStore`] persisted as an append-only JSON-lines journal.
///
/// The full index is kept in memory. Each successful [`put`](RecordStore::put) appends one line
/// and syncs it to disk before the record becomes visible, so a record is either durably stored
/// or absent.
///
/// Writers are serialized on the journal file; the index lock is only taken to insert, so reads
/// never wait on disk I/O.
pub struct JournalStore {
    path: PathBuf,
    records: RwLock<HashMap<B256, Record>>,
    file: Mutex<File>,
}

impl JournalStore {
    /// Opens the journal at `path`, creating it if it does not exist, and replays it.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let file = OpenOptions::new().read(true).append(true).create(true).open(&path)?;
        let (records, valid_len) = replay(&file, &path)?;

        // Drop a torn final line so the next append starts on a fresh line.
        if valid_len < file.metadata()?.len() {
            file.set_len(valid_len)?;
            file.sync_all()?;
        }

        debug!(
            target: "gateway::store",
            path = %path.display(),
            records = records.len(),
            "opened journal"
        );
        Ok(Self { path, records: RwLock::new(records), file: Mutex::new(file) })
    }

    /// Returns the path of the journal file.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Reads every complete entry of the journal.
///
/// Returns the index and the byte length of the valid prefix.
fn replay(file: &File, path: &Path) -> Result<(HashMap<B256, Record>, u64), StoreError> {
    let mut records = HashMap::default();
    let mut reader = BufReader::new(file);
    let mut line = String::new();
    let mut valid_len = 0u64;
    let mut line_no = 0usize;
    loop {
        line.clear();
        let read = reader.read_line(&mut line)?;
        if read == 0 {
            break;
        }
        line_no += 1;
        if !line.ends_with('\n') {
            warn!(
                target: "gateway::store",
                path = %path.display(),
                line = line_no,
                "discarding incomplete journal entry"
            );
            break;
        }
        valid_len += read as u64;
        if line.trim().is_empty() {
            continue;
        }
        let entry: Entry<Record> = serde_json::from_str(&line)?;
        if records.contains_key(&entry.node) {
            warn!(
                target: "gateway::store",
                node = %entry.node,
                line = line_no,
                "ignoring duplicate journal entry"
            );
            continue;
        }
        records.insert(entry.node, entry.record);
    }
    Ok((records, valid_len))
}

impl RecordStore for JournalStore {
    fn get(&self, node: &B256) -> Option<Record> {
        self.records.read().get(node).cloned()
    }

    fn put(&self, node: B256, record: Record) -> Result<(), StoreError> {
        // Held until the record is indexed, so check and insert are atomic across writers.
        let mut file = self.file.lock();
        if self.records.read().contains_key(&node) {
            return Err(StoreError::AlreadyExists(node));
        }

        let mut line = serde_json::to_vec(&Entry { node, record: &record })?;
        line.push(b'\n');
        let offset = file.metadata()?.len();
        if let Err(err) = file.write_all(&line).and_then(|()| file.sync_data()) {
            // Roll back a partial append so later entries start on a clean line.
            let _ = file.set_len(offset);
            return Err(err.into());
        }

        self.records.write().insert(node, record);
        Ok(())
    }

    fn len(&self) -> usize {
        self.records.read().len()
    }

    fn latest_registration(&self) -> Option<DateTime<Utc>> {
        latest(self.records.read().values())
    }
}

impl fmt::Debug for JournalStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JournalStore")
            .field("path", &self.path)
            .field("records", &self.len())
            .finish()
    }
}
