//! Storage backend contract and the two reference backends.
//!
//! The core never caches or pools a backend connection: it treats the
//! store as owned by the caller for the duration of one logical
//! operation. Records cross this boundary only in encoded form (blob +
//! binary code); all codecs live in [`crate::vector`].

mod blob_log;
mod disk;
mod memory;

pub use blob_log::{BlobLog, BlobPointer};
pub use disk::DiskStore;
pub use memory::MemoryStore;

use crate::config::EncodingParams;
use crate::error::Result;
use crate::models::{StoredRecord, VectorId};

/// Contract every storage backend must satisfy.
///
/// Mutating sequences are made atomic through `begin`/`commit`/`rollback`;
/// single-record writes are atomic on their own. Reads inherit whatever
/// isolation the backend provides.
pub trait VectorStore: Send + Sync {
    /// Create a store. Fails if a store with that name already exists.
    fn create_store(&self, name: &str, dimension: usize, encoding: &EncodingParams)
        -> Result<()>;

    /// Delete a store and all its records. No-op if absent.
    fn drop_store(&self, name: &str) -> Result<()>;

    fn store_exists(&self, name: &str) -> Result<bool>;

    /// Dimension the store was created with.
    fn store_dimension(&self, name: &str) -> Result<usize>;

    /// Insert a record, returning the backend-assigned id.
    fn insert(&self, name: &str, blob: &[u8], binary_code: &[u8]) -> Result<VectorId>;

    /// Replace an existing record wholesale. Returns whether a row was
    /// affected; updating an absent id is reported, not an error.
    fn update_by_id(
        &self,
        name: &str,
        id: VectorId,
        blob: &[u8],
        binary_code: &[u8],
    ) -> Result<bool>;

    /// Fetch records by id. Missing ids are silently omitted; the result
    /// order is unrelated to the request order.
    fn select_by_ids(&self, name: &str, ids: &[VectorId]) -> Result<Vec<StoredRecord>>;

    /// All records, in backend-defined order.
    fn select_all(&self, name: &str) -> Result<Vec<StoredRecord>>;

    fn count(&self, name: &str) -> Result<usize>;

    /// Delete a record. Deleting an absent id is success.
    fn delete_by_id(&self, name: &str, id: VectorId) -> Result<()>;

    /// The `k` records whose binary code is closest to `binary_code` by
    /// Hamming distance, ascending. Ties are broken in backend-defined
    /// order; callers must not rely on a specific one.
    fn top_k_by_hamming(
        &self,
        name: &str,
        binary_code: &[u8],
        k: usize,
    ) -> Result<Vec<StoredRecord>>;

    fn begin(&self) -> Result<()>;
    fn commit(&self) -> Result<()>;
    fn rollback(&self) -> Result<()>;

    /// Per-record blob byte ceiling; bounds the maximum collection
    /// dimension together with the encoding.
    fn max_blob_bytes(&self) -> usize;
}
