use std::collections::{BTreeMap, HashMap};

use parking_lot::{Mutex, RwLock};

use crate::config::EncodingParams;
use crate::error::{QuiverError, Result};
use crate::models::{StoredRecord, VectorId};
use crate::storage::VectorStore;
use crate::vector::similarity::hamming;

/// Default per-record blob budget: 16384 binary32 components.
const DEFAULT_MAX_BLOB_BYTES: usize = 65_536;

#[derive(Clone, Debug)]
struct RecordBody {
    blob: Vec<u8>,
    binary_code: Vec<u8>,
}

#[derive(Clone, Debug)]
struct StoreState {
    dimension: usize,
    next_id: VectorId,
    // BTreeMap so iteration (and Hamming tie-breaking) is ascending by id
    records: BTreeMap<VectorId, RecordBody>,
}

impl StoreState {
    fn new(dimension: usize) -> Self {
        Self {
            dimension,
            next_id: 1,
            records: BTreeMap::new(),
        }
    }
}

/// In-memory storage backend.
///
/// Transactions are snapshot-based: `begin` clones the full state,
/// `rollback` restores it, `commit` discards the snapshot. Intended for
/// tests and embedded use.
pub struct MemoryStore {
    stores: RwLock<HashMap<String, StoreState>>,
    snapshot: Mutex<Option<HashMap<String, StoreState>>>,
    max_blob_bytes: usize,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::with_max_blob_bytes(DEFAULT_MAX_BLOB_BYTES)
    }

    pub fn with_max_blob_bytes(max_blob_bytes: usize) -> Self {
        Self {
            stores: RwLock::new(HashMap::new()),
            snapshot: Mutex::new(None),
            max_blob_bytes,
        }
    }

    fn missing(name: &str) -> QuiverError {
        QuiverError::CollectionNotFound(name.to_string())
    }
}

impl VectorStore for MemoryStore {
    fn create_store(
        &self,
        name: &str,
        dimension: usize,
        _encoding: &EncodingParams,
    ) -> Result<()> {
        let mut stores = self.stores.write();
        if stores.contains_key(name) {
            return Err(QuiverError::Backend(format!(
                "store {} already exists",
                name
            )));
        }
        stores.insert(name.to_string(), StoreState::new(dimension));
        Ok(())
    }

    fn drop_store(&self, name: &str) -> Result<()> {
        self.stores.write().remove(name);
        Ok(())
    }

    fn store_exists(&self, name: &str) -> Result<bool> {
        Ok(self.stores.read().contains_key(name))
    }

    fn store_dimension(&self, name: &str) -> Result<usize> {
        let stores = self.stores.read();
        let state = stores.get(name).ok_or_else(|| Self::missing(name))?;
        Ok(state.dimension)
    }

    fn insert(&self, name: &str, blob: &[u8], binary_code: &[u8]) -> Result<VectorId> {
        let mut stores = self.stores.write();
        let state = stores.get_mut(name).ok_or_else(|| Self::missing(name))?;
        let id = state.next_id;
        state.next_id += 1;
        state.records.insert(
            id,
            RecordBody {
                blob: blob.to_vec(),
                binary_code: binary_code.to_vec(),
            },
        );
        Ok(id)
    }

    fn update_by_id(
        &self,
        name: &str,
        id: VectorId,
        blob: &[u8],
        binary_code: &[u8],
    ) -> Result<bool> {
        let mut stores = self.stores.write();
        let state = stores.get_mut(name).ok_or_else(|| Self::missing(name))?;
        match state.records.get_mut(&id) {
            Some(body) => {
                body.blob = blob.to_vec();
                body.binary_code = binary_code.to_vec();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    fn select_by_ids(&self, name: &str, ids: &[VectorId]) -> Result<Vec<StoredRecord>> {
        let stores = self.stores.read();
        let state = stores.get(name).ok_or_else(|| Self::missing(name))?;
        Ok(ids
            .iter()
            .filter_map(|id| {
                state
                    .records
                    .get(id)
                    .map(|body| StoredRecord::new(*id, body.blob.clone(), body.binary_code.clone()))
            })
            .collect())
    }

    fn select_all(&self, name: &str) -> Result<Vec<StoredRecord>> {
        let stores = self.stores.read();
        let state = stores.get(name).ok_or_else(|| Self::missing(name))?;
        Ok(state
            .records
            .iter()
            .map(|(id, body)| StoredRecord::new(*id, body.blob.clone(), body.binary_code.clone()))
            .collect())
    }

    fn count(&self, name: &str) -> Result<usize> {
        let stores = self.stores.read();
        let state = stores.get(name).ok_or_else(|| Self::missing(name))?;
        Ok(state.records.len())
    }

    fn delete_by_id(&self, name: &str, id: VectorId) -> Result<()> {
        let mut stores = self.stores.write();
        let state = stores.get_mut(name).ok_or_else(|| Self::missing(name))?;
        state.records.remove(&id);
        Ok(())
    }

    fn top_k_by_hamming(
        &self,
        name: &str,
        binary_code: &[u8],
        k: usize,
    ) -> Result<Vec<StoredRecord>> {
        let stores = self.stores.read();
        let state = stores.get(name).ok_or_else(|| Self::missing(name))?;

        let mut scored: Vec<(u32, VectorId)> = state
            .records
            .iter()
            .map(|(id, body)| (hamming(&body.binary_code, binary_code), *id))
            .collect();
        // Ascending distance, ties by ascending id
        scored.sort_unstable();
        scored.truncate(k);

        Ok(scored
            .into_iter()
            .map(|(_, id)| {
                let body = &state.records[&id];
                StoredRecord::new(id, body.blob.clone(), body.binary_code.clone())
            })
            .collect())
    }

    fn begin(&self) -> Result<()> {
        let mut snapshot = self.snapshot.lock();
        if snapshot.is_some() {
            return Err(QuiverError::Backend(
                "transaction already open".to_string(),
            ));
        }
        *snapshot = Some(self.stores.read().clone());
        Ok(())
    }

    fn commit(&self) -> Result<()> {
        let mut snapshot = self.snapshot.lock();
        if snapshot.take().is_none() {
            return Err(QuiverError::Backend("no open transaction".to_string()));
        }
        Ok(())
    }

    fn rollback(&self) -> Result<()> {
        let mut snapshot = self.snapshot.lock();
        match snapshot.take() {
            Some(saved) => {
                *self.stores.write() = saved;
                Ok(())
            }
            None => Err(QuiverError::Backend("no open transaction".to_string())),
        }
    }

    fn max_blob_bytes(&self) -> usize {
        self.max_blob_bytes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params() -> EncodingParams {
        EncodingParams::default()
    }

    #[test]
    fn test_create_and_exists() {
        let store = MemoryStore::new();
        assert!(!store.store_exists("docs").unwrap());
        store.create_store("docs", 4, &params()).unwrap();
        assert!(store.store_exists("docs").unwrap());
        assert_eq!(store.store_dimension("docs").unwrap(), 4);

        let err = store.create_store("docs", 4, &params()).unwrap_err();
        assert!(matches!(err, QuiverError::Backend(_)));
    }

    #[test]
    fn test_insert_assigns_sequential_ids() {
        let store = MemoryStore::new();
        store.create_store("docs", 1, &params()).unwrap();
        let a = store.insert("docs", &[0; 4], &[0]).unwrap();
        let b = store.insert("docs", &[0; 4], &[0]).unwrap();
        assert!(b > a);
        assert_eq!(store.count("docs").unwrap(), 2);
    }

    #[test]
    fn test_update_reports_rows_affected() {
        let store = MemoryStore::new();
        store.create_store("docs", 1, &params()).unwrap();
        let id = store.insert("docs", &[1; 4], &[1]).unwrap();
        assert!(store.update_by_id("docs", id, &[2; 4], &[0]).unwrap());
        assert!(!store.update_by_id("docs", id + 99, &[2; 4], &[0]).unwrap());

        let records = store.select_by_ids("docs", &[id]).unwrap();
        assert_eq!(records[0].blob, vec![2; 4]);
    }

    #[test]
    fn test_select_omits_missing_ids() {
        let store = MemoryStore::new();
        store.create_store("docs", 1, &params()).unwrap();
        let id = store.insert("docs", &[0; 4], &[0]).unwrap();
        let records = store.select_by_ids("docs", &[id, 999]).unwrap();
        assert_eq!(records.len(), 1);
    }

    #[test]
    fn test_delete_absent_is_success() {
        let store = MemoryStore::new();
        store.create_store("docs", 1, &params()).unwrap();
        store.delete_by_id("docs", 12345).unwrap();
    }

    #[test]
    fn test_top_k_ordering() {
        let store = MemoryStore::new();
        store.create_store("docs", 8, &params()).unwrap();
        let a = store.insert("docs", &[0; 32], &[0b0000_0001]).unwrap();
        let b = store.insert("docs", &[0; 32], &[0b1111_1111]).unwrap();
        let c = store.insert("docs", &[0; 32], &[0b0000_0011]).unwrap();

        let top = store.top_k_by_hamming("docs", &[0b0000_0001], 2).unwrap();
        assert_eq!(top.len(), 2);
        assert_eq!(top[0].id, a);
        assert_eq!(top[1].id, c);
        assert!(top.iter().all(|r| r.id != b));
    }

    #[test]
    fn test_rollback_restores_state() {
        let store = MemoryStore::new();
        store.create_store("docs", 1, &params()).unwrap();
        store.insert("docs", &[0; 4], &[0]).unwrap();

        store.begin().unwrap();
        store.insert("docs", &[0; 4], &[0]).unwrap();
        store.insert("docs", &[0; 4], &[0]).unwrap();
        store.rollback().unwrap();

        assert_eq!(store.count("docs").unwrap(), 1);
    }

    #[test]
    fn test_commit_keeps_writes() {
        let store = MemoryStore::new();
        store.create_store("docs", 1, &params()).unwrap();

        store.begin().unwrap();
        store.insert("docs", &[0; 4], &[0]).unwrap();
        store.commit().unwrap();

        assert_eq!(store.count("docs").unwrap(), 1);
    }

    #[test]
    fn test_transaction_misuse() {
        let store = MemoryStore::new();
        assert!(store.commit().is_err());
        assert!(store.rollback().is_err());
        store.begin().unwrap();
        assert!(store.begin().is_err());
        store.rollback().unwrap();
    }
}
