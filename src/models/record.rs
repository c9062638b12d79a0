use serde::{Deserialize, Serialize};

/// Unique record identifier, assigned by the storage backend on first insert
pub type VectorId = u64;

/// Dense embedding vector (typically 384-1536 dimensions)
pub type Vector = Vec<f32>;

/// A persisted vector record in its decoded form
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct VectorRecord {
    pub id: VectorId,
    /// Unit-norm vector (except the documented zero-vector case)
    pub normalized_vector: Vector,
    /// Sign-bit quantization of `normalized_vector`, ceil(dimension/8) bytes
    pub binary_code: Vec<u8>,
}

/// A record as it crosses the storage boundary: encoded blob plus binary code
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct StoredRecord {
    pub id: VectorId,
    /// binary32 little-endian blob, 4 bytes per component
    pub blob: Vec<u8>,
    pub binary_code: Vec<u8>,
}

impl StoredRecord {
    pub fn new(id: VectorId, blob: Vec<u8>, binary_code: Vec<u8>) -> Self {
        Self {
            id,
            blob,
            binary_code,
        }
    }
}
