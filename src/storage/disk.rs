use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::config::EncodingParams;
use crate::error::{QuiverError, Result};
use crate::models::{StoredRecord, VectorId};
use crate::storage::blob_log::BlobLog;
use crate::storage::VectorStore;
use crate::vector::similarity::hamming;

const LOG_EXTENSION: &str = "qlog";
const DEFAULT_MAX_BLOB_BYTES: usize = 65_536;

/// One entry in a collection's append-only log.
#[derive(Debug, Serialize, Deserialize)]
enum LogRecord {
    Meta {
        dimension: u64,
    },
    Insert {
        id: VectorId,
        blob: Vec<u8>,
        binary_code: Vec<u8>,
    },
    Update {
        id: VectorId,
        blob: Vec<u8>,
        binary_code: Vec<u8>,
    },
    Tombstone {
        id: VectorId,
    },
}

#[derive(Clone, Debug, Default)]
struct RecordBody {
    blob: Vec<u8>,
    binary_code: Vec<u8>,
}

#[derive(Clone, Debug, Default)]
struct CollectionState {
    dimension: usize,
    next_id: VectorId,
    records: BTreeMap<VectorId, RecordBody>,
}

struct DiskCollection {
    state: CollectionState,
    log: BlobLog,
}

struct TxState {
    snapshot: HashMap<String, CollectionState>,
    created: Vec<String>,
    dropped: Vec<(String, DiskCollection)>,
    pending: Vec<(String, Vec<u8>)>,
}

struct Inner {
    collections: HashMap<String, DiskCollection>,
    tx: Option<TxState>,
}

/// Log-backed persistent storage backend.
///
/// Each collection is one crc32-checked append-only log file under the
/// store directory; updates append new versions and deletes append
/// tombstones. The id index is held in memory and rebuilt by replay on
/// open. Transactions stage log appends and apply them on `commit`;
/// `rollback` restores the in-memory state captured at `begin`.
pub struct DiskStore {
    dir: PathBuf,
    inner: Mutex<Inner>,
    max_blob_bytes: usize,
}

impl DiskStore {
    /// Open a store directory, replaying every collection log found in it.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir)?;

        let mut collections = HashMap::new();
        for entry in std::fs::read_dir(&dir)? {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) != Some(LOG_EXTENSION) {
                continue;
            }
            let Some(name) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };
            let log = BlobLog::open(path.clone())?;
            let state = Self::replay_collection(&log)?;
            collections.insert(name.to_string(), DiskCollection { state, log });
        }

        info!(
            dir = %dir.display(),
            collections = collections.len(),
            "opened disk store"
        );

        Ok(Self {
            dir,
            inner: Mutex::new(Inner {
                collections,
                tx: None,
            }),
            max_blob_bytes: DEFAULT_MAX_BLOB_BYTES,
        })
    }

    fn replay_collection(log: &BlobLog) -> Result<CollectionState> {
        let mut state = CollectionState {
            next_id: 1,
            ..Default::default()
        };
        for payload in log.replay()? {
            match bincode::deserialize::<LogRecord>(&payload)? {
                LogRecord::Meta { dimension } => state.dimension = dimension as usize,
                LogRecord::Insert {
                    id,
                    blob,
                    binary_code,
                } => {
                    state.next_id = state.next_id.max(id + 1);
                    state.records.insert(id, RecordBody { blob, binary_code });
                }
                LogRecord::Update {
                    id,
                    blob,
                    binary_code,
                } => {
                    if let Some(body) = state.records.get_mut(&id) {
                        *body = RecordBody { blob, binary_code };
                    }
                }
                LogRecord::Tombstone { id } => {
                    state.records.remove(&id);
                }
            }
        }
        Ok(state)
    }

    fn log_path(&self, name: &str) -> PathBuf {
        self.dir.join(format!("{}.{}", name, LOG_EXTENSION))
    }

    fn missing(name: &str) -> QuiverError {
        QuiverError::CollectionNotFound(name.to_string())
    }

    /// Route a log record: append directly outside a transaction, stage it
    /// inside one.
    fn write_record(inner: &mut Inner, name: &str, record: &LogRecord) -> Result<()> {
        let payload = bincode::serialize(record)?;
        if let Some(tx) = inner.tx.as_mut() {
            tx.pending.push((name.to_string(), payload));
            return Ok(());
        }
        let coll = inner
            .collections
            .get(name)
            .ok_or_else(|| Self::missing(name))?;
        coll.log.append(&payload)?;
        Ok(())
    }

    fn remove_log_file(path: &Path) -> Result<()> {
        match std::fs::remove_file(path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

impl VectorStore for DiskStore {
    fn create_store(
        &self,
        name: &str,
        dimension: usize,
        _encoding: &EncodingParams,
    ) -> Result<()> {
        let mut inner = self.inner.lock();
        if inner.collections.contains_key(name) {
            return Err(QuiverError::Backend(format!(
                "store {} already exists",
                name
            )));
        }

        let path = self.log_path(name);
        let log = BlobLog::open(path)?;
        let meta = bincode::serialize(&LogRecord::Meta {
            dimension: dimension as u64,
        })?;
        log.append(&meta)?;

        inner.collections.insert(
            name.to_string(),
            DiskCollection {
                state: CollectionState {
                    dimension,
                    next_id: 1,
                    records: BTreeMap::new(),
                },
                log,
            },
        );
        if let Some(tx) = inner.tx.as_mut() {
            tx.created.push(name.to_string());
        }
        Ok(())
    }

    fn drop_store(&self, name: &str) -> Result<()> {
        let mut inner = self.inner.lock();
        let Some(coll) = inner.collections.remove(name) else {
            return Ok(());
        };
        if let Some(tx) = inner.tx.as_mut() {
            // File deletion waits for commit; staged writes to the store
            // are moot once it is gone
            tx.pending.retain(|(n, _)| n != name);
            tx.dropped.push((name.to_string(), coll));
        } else {
            Self::remove_log_file(coll.log.path())?;
        }
        Ok(())
    }

    fn store_exists(&self, name: &str) -> Result<bool> {
        Ok(self.inner.lock().collections.contains_key(name))
    }

    fn store_dimension(&self, name: &str) -> Result<usize> {
        let inner = self.inner.lock();
        let coll = inner
            .collections
            .get(name)
            .ok_or_else(|| Self::missing(name))?;
        Ok(coll.state.dimension)
    }

    fn insert(&self, name: &str, blob: &[u8], binary_code: &[u8]) -> Result<VectorId> {
        let mut inner = self.inner.lock();
        let coll = inner
            .collections
            .get_mut(name)
            .ok_or_else(|| Self::missing(name))?;
        let id = coll.state.next_id;
        coll.state.next_id += 1;
        coll.state.records.insert(
            id,
            RecordBody {
                blob: blob.to_vec(),
                binary_code: binary_code.to_vec(),
            },
        );
        Self::write_record(
            &mut inner,
            name,
            &LogRecord::Insert {
                id,
                blob: blob.to_vec(),
                binary_code: binary_code.to_vec(),
            },
        )?;
        Ok(id)
    }

    fn update_by_id(
        &self,
        name: &str,
        id: VectorId,
        blob: &[u8],
        binary_code: &[u8],
    ) -> Result<bool> {
        let mut inner = self.inner.lock();
        let coll = inner
            .collections
            .get_mut(name)
            .ok_or_else(|| Self::missing(name))?;
        let Some(body) = coll.state.records.get_mut(&id) else {
            return Ok(false);
        };
        body.blob = blob.to_vec();
        body.binary_code = binary_code.to_vec();
        Self::write_record(
            &mut inner,
            name,
            &LogRecord::Update {
                id,
                blob: blob.to_vec(),
                binary_code: binary_code.to_vec(),
            },
        )?;
        Ok(true)
    }

    fn select_by_ids(&self, name: &str, ids: &[VectorId]) -> Result<Vec<StoredRecord>> {
        let inner = self.inner.lock();
        let coll = inner
            .collections
            .get(name)
            .ok_or_else(|| Self::missing(name))?;
        Ok(ids
            .iter()
            .filter_map(|id| {
                coll.state
                    .records
                    .get(id)
                    .map(|body| StoredRecord::new(*id, body.blob.clone(), body.binary_code.clone()))
            })
            .collect())
    }

    fn select_all(&self, name: &str) -> Result<Vec<StoredRecord>> {
        let inner = self.inner.lock();
        let coll = inner
            .collections
            .get(name)
            .ok_or_else(|| Self::missing(name))?;
        Ok(coll
            .state
            .records
            .iter()
            .map(|(id, body)| StoredRecord::new(*id, body.blob.clone(), body.binary_code.clone()))
            .collect())
    }

    fn count(&self, name: &str) -> Result<usize> {
        let inner = self.inner.lock();
        let coll = inner
            .collections
            .get(name)
            .ok_or_else(|| Self::missing(name))?;
        Ok(coll.state.records.len())
    }

    fn delete_by_id(&self, name: &str, id: VectorId) -> Result<()> {
        let mut inner = self.inner.lock();
        let coll = inner
            .collections
            .get_mut(name)
            .ok_or_else(|| Self::missing(name))?;
        if coll.state.records.remove(&id).is_none() {
            return Ok(());
        }
        Self::write_record(&mut inner, name, &LogRecord::Tombstone { id })
    }

    fn top_k_by_hamming(
        &self,
        name: &str,
        binary_code: &[u8],
        k: usize,
    ) -> Result<Vec<StoredRecord>> {
        let inner = self.inner.lock();
        let coll = inner
            .collections
            .get(name)
            .ok_or_else(|| Self::missing(name))?;

        let mut scored: Vec<(u32, VectorId)> = coll
            .state
            .records
            .iter()
            .map(|(id, body)| (hamming(&body.binary_code, binary_code), *id))
            .collect();
        scored.sort_unstable();
        scored.truncate(k);

        Ok(scored
            .into_iter()
            .map(|(_, id)| {
                let body = &coll.state.records[&id];
                StoredRecord::new(id, body.blob.clone(), body.binary_code.clone())
            })
            .collect())
    }

    fn begin(&self) -> Result<()> {
        let mut inner = self.inner.lock();
        if inner.tx.is_some() {
            return Err(QuiverError::Backend(
                "transaction already open".to_string(),
            ));
        }
        let snapshot = inner
            .collections
            .iter()
            .map(|(name, coll)| (name.clone(), coll.state.clone()))
            .collect();
        inner.tx = Some(TxState {
            snapshot,
            created: Vec::new(),
            dropped: Vec::new(),
            pending: Vec::new(),
        });
        Ok(())
    }

    fn commit(&self) -> Result<()> {
        let mut inner = self.inner.lock();
        let Some(tx) = inner.tx.take() else {
            return Err(QuiverError::Backend("no open transaction".to_string()));
        };
        for (name, payload) in &tx.pending {
            if let Some(coll) = inner.collections.get(name) {
                coll.log.append(payload)?;
            }
        }
        for (_, coll) in tx.dropped {
            Self::remove_log_file(coll.log.path())?;
        }
        Ok(())
    }

    fn rollback(&self) -> Result<()> {
        let mut inner = self.inner.lock();
        let Some(tx) = inner.tx.take() else {
            return Err(QuiverError::Backend("no open transaction".to_string()));
        };
        for (name, coll) in tx.dropped {
            inner.collections.insert(name, coll);
        }
        for name in tx.created {
            if let Some(coll) = inner.collections.remove(&name) {
                Self::remove_log_file(coll.log.path())?;
            }
        }
        for (name, state) in tx.snapshot {
            if let Some(coll) = inner.collections.get_mut(&name) {
                coll.state = state;
            }
        }
        Ok(())
    }

    fn max_blob_bytes(&self) -> usize {
        self.max_blob_bytes
    }
}
