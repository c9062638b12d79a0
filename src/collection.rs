//! Collection lifecycle: dimension validation, the normalize → quantize →
//! encode pipeline, and transactional writes through the storage backend.

use std::sync::Arc;

use tracing::{debug, info};

use crate::config::EncodingParams;
use crate::error::{QuiverError, Result};
use crate::models::{VectorId, VectorRecord};
use crate::storage::VectorStore;
use crate::vector::{from_blob, normalize, to_bits, to_blob};

/// Handle to a created or opened collection
#[derive(Clone, Debug)]
pub struct Collection {
    pub name: String,
    pub dimension: usize,
}

/// Manages vector record CRUD against a storage backend.
///
/// The backend connection is treated as owned by the caller for the
/// duration of one logical operation; nothing is cached or pooled here.
pub struct CollectionManager {
    store: Arc<dyn VectorStore>,
    encoding: EncodingParams,
}

impl CollectionManager {
    pub fn new(store: Arc<dyn VectorStore>) -> Self {
        Self {
            store,
            encoding: EncodingParams::default(),
        }
    }

    pub fn store(&self) -> Arc<dyn VectorStore> {
        Arc::clone(&self.store)
    }

    /// Largest dimension the backend's per-record blob budget allows
    pub fn max_dimension(&self) -> usize {
        self.encoding.max_dimension(self.store.max_blob_bytes())
    }

    /// Create a collection with a fixed dimension.
    ///
    /// Never silently idempotent: an existing collection of the same name
    /// fails with `AlreadyExists`, so a persisted dimension can never
    /// silently disagree with the requested one.
    pub fn create(&self, name: &str, dimension: usize) -> Result<Collection> {
        let max = self.max_dimension();
        if dimension == 0 || dimension > max {
            return Err(QuiverError::DimensionOutOfRange { dimension, max });
        }

        self.store.begin()?;
        let result: Result<()> = (|| {
            if self.store.store_exists(name)? {
                return Err(QuiverError::AlreadyExists(name.to_string()));
            }
            self.store.create_store(name, dimension, &self.encoding)
        })();
        match result {
            Ok(()) => {
                self.store.commit()?;
                info!(collection = name, dimension, "created collection");
                Ok(Collection {
                    name: name.to_string(),
                    dimension,
                })
            }
            Err(e) => {
                self.store.rollback()?;
                Err(e)
            }
        }
    }

    /// Open an existing collection, reading its dimension from the backend.
    pub fn open(&self, name: &str) -> Result<Collection> {
        if !self.store.store_exists(name)? {
            return Err(QuiverError::CollectionNotFound(name.to_string()));
        }
        let dimension = self.store.store_dimension(name)?;
        Ok(Collection {
            name: name.to_string(),
            dimension,
        })
    }

    /// Delete a collection and all its records. No-op if absent.
    pub fn drop(&self, name: &str) -> Result<()> {
        self.store.begin()?;
        match self.store.drop_store(name) {
            Ok(()) => {
                self.store.commit()?;
                info!(collection = name, "dropped collection");
                Ok(())
            }
            Err(e) => {
                self.store.rollback()?;
                Err(e)
            }
        }
    }

    /// Insert a vector, or replace an existing record wholesale when `id`
    /// is given.
    ///
    /// The input is validated against the collection dimension, then
    /// normalized and encoded. Replacing an id that does not exist fails
    /// with `NotFound` rather than silently affecting zero rows.
    pub fn upsert(
        &self,
        collection: &Collection,
        vector: &[f32],
        id: Option<VectorId>,
    ) -> Result<VectorId> {
        let (blob, binary_code) = self.encode(collection, vector)?;
        match id {
            None => {
                let id = self.store.insert(&collection.name, &blob, &binary_code)?;
                debug!(collection = %collection.name, id, "inserted vector");
                Ok(id)
            }
            Some(id) => {
                let affected =
                    self.store
                        .update_by_id(&collection.name, id, &blob, &binary_code)?;
                if !affected {
                    return Err(QuiverError::NotFound {
                        collection: collection.name.clone(),
                        id,
                    });
                }
                debug!(collection = %collection.name, id, "replaced vector");
                Ok(id)
            }
        }
    }

    /// Insert a batch of vectors inside one transaction.
    ///
    /// Every vector is validated before the transaction opens, so a
    /// dimension error creates no state at all; any backend failure rolls
    /// back the whole batch. Returned ids preserve input order.
    pub fn batch_insert(
        &self,
        collection: &Collection,
        vectors: &[Vec<f32>],
    ) -> Result<Vec<VectorId>> {
        let mut encoded = Vec::with_capacity(vectors.len());
        for vector in vectors {
            encoded.push(self.encode(collection, vector)?);
        }

        self.store.begin()?;
        let result: Result<Vec<VectorId>> = (|| {
            let mut ids = Vec::with_capacity(encoded.len());
            for (blob, binary_code) in &encoded {
                ids.push(self.store.insert(&collection.name, blob, binary_code)?);
            }
            Ok(ids)
        })();
        match result {
            Ok(ids) => {
                self.store.commit()?;
                info!(
                    collection = %collection.name,
                    count = ids.len(),
                    "batch insert committed"
                );
                Ok(ids)
            }
            Err(e) => {
                self.store.rollback()?;
                Err(e)
            }
        }
    }

    /// Fetch records by id; missing ids are silently omitted.
    pub fn select(&self, collection: &Collection, ids: &[VectorId]) -> Result<Vec<VectorRecord>> {
        let stored = self.store.select_by_ids(&collection.name, ids)?;
        stored.into_iter().map(Self::decode).collect()
    }

    /// All records, in backend-defined order.
    pub fn select_all(&self, collection: &Collection) -> Result<Vec<VectorRecord>> {
        let stored = self.store.select_all(&collection.name)?;
        stored.into_iter().map(Self::decode).collect()
    }

    pub fn count(&self, collection: &Collection) -> Result<usize> {
        self.store.count(&collection.name)
    }

    /// Delete a record; deleting an absent id is success.
    pub fn delete(&self, collection: &Collection, id: VectorId) -> Result<()> {
        self.store.delete_by_id(&collection.name, id)
    }

    /// Validate → normalize → encode pipeline shared by every write path.
    fn encode(&self, collection: &Collection, vector: &[f32]) -> Result<(Vec<u8>, Vec<u8>)> {
        if vector.len() != collection.dimension {
            return Err(QuiverError::InvalidDimension {
                expected: collection.dimension,
                actual: vector.len(),
            });
        }
        let normalized = normalize(vector);
        Ok((to_blob(&normalized), to_bits(&normalized)))
    }

    fn decode(stored: crate::models::StoredRecord) -> Result<VectorRecord> {
        Ok(VectorRecord {
            id: stored.id,
            normalized_vector: from_blob(&stored.blob)?,
            binary_code: stored.binary_code,
        })
    }
}
