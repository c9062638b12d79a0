//! Approximate nearest-neighbor search over dense embedding vectors
//! stored as compact binary records.
//!
//! Vectors are L2-normalized, sign-bit quantized into packed binary
//! codes, and persisted as binary32 little-endian blobs. Search runs in
//! two stages: a cheap Hamming-distance prune over the binary codes,
//! then an exact cosine rerank of the surviving candidates.

pub mod collection;
pub mod config;
pub mod error;
pub mod models;
pub mod search;
pub mod storage;
pub mod vector;

pub use collection::{Collection, CollectionManager};
pub use config::{CollectionConfig, EncodingParams};
pub use error::{QuiverError, Result};
pub use models::{SearchHit, StoredRecord, Vector, VectorId, VectorRecord};
pub use search::Searcher;
pub use storage::{DiskStore, MemoryStore, VectorStore};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
