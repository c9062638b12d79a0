use serde::{Deserialize, Serialize};

/// Bytes used by one component in the binary32 blob encoding
pub const BLOB_BYTES_PER_COMPONENT: usize = 4;

/// Encoding parameters passed to the storage backend at collection creation
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncodingParams {
    /// Bytes per component in the persisted vector blob
    pub bytes_per_component: usize,
}

impl Default for EncodingParams {
    fn default() -> Self {
        Self {
            bytes_per_component: BLOB_BYTES_PER_COMPONENT,
        }
    }
}

impl EncodingParams {
    /// Largest dimension that fits within the given per-record blob budget
    pub fn max_dimension(&self, max_blob_bytes: usize) -> usize {
        max_blob_bytes / self.bytes_per_component
    }

    /// Blob length in bytes for a vector of the given dimension
    pub fn blob_len(&self, dimension: usize) -> usize {
        dimension * self.bytes_per_component
    }

    /// Binary code length in bytes for a vector of the given dimension
    pub fn code_len(&self, dimension: usize) -> usize {
        dimension.div_ceil(8)
    }
}

/// Collection configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CollectionConfig {
    pub name: String,
    pub dimension: usize,
    pub encoding: EncodingParams,
}

impl CollectionConfig {
    pub fn new(name: impl Into<String>, dimension: usize) -> Self {
        Self {
            name: name.into(),
            dimension,
            encoding: EncodingParams::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_encoding() {
        let params = EncodingParams::default();
        assert_eq!(params.bytes_per_component, 4);
        assert_eq!(params.blob_len(384), 1536);
        assert_eq!(params.code_len(384), 48);
        assert_eq!(params.code_len(3), 1);
    }

    #[test]
    fn test_max_dimension() {
        let params = EncodingParams::default();
        assert_eq!(params.max_dimension(65_536), 16_384);
        assert_eq!(params.max_dimension(3), 0);
    }

    #[test]
    fn test_collection_config() {
        let config = CollectionConfig::new("docs", 768);
        assert_eq!(config.name, "docs");
        assert_eq!(config.dimension, 768);
        assert_eq!(config.encoding, EncodingParams::default());
    }
}
