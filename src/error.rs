use thiserror::Error;

/// Main error type for quiver operations
#[derive(Error, Debug)]
pub enum QuiverError {
    #[error("Invalid vector dimensions: expected {expected}, got {actual}")]
    InvalidDimension { expected: usize, actual: usize },

    #[error("Collection dimension {dimension} out of range (1..={max})")]
    DimensionOutOfRange { dimension: usize, max: usize },

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Collection already exists: {0}")]
    AlreadyExists(String),

    #[error("Collection not found: {0}")]
    CollectionNotFound(String),

    #[error("Record not found in collection {collection}: id {id}")]
    NotFound { collection: String, id: u64 },

    #[error("Backend error: {0}")]
    Backend(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] bincode::Error),
}

/// Result type alias for quiver operations
pub type Result<T> = std::result::Result<T, QuiverError>;

impl QuiverError {
    /// Check if this error was raised by input validation, before any
    /// backend call was made
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            QuiverError::InvalidDimension { .. }
                | QuiverError::DimensionOutOfRange { .. }
                | QuiverError::InvalidArgument(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = QuiverError::InvalidDimension {
            expected: 384,
            actual: 3,
        };
        assert_eq!(
            err.to_string(),
            "Invalid vector dimensions: expected 384, got 3"
        );

        let err = QuiverError::NotFound {
            collection: "docs".to_string(),
            id: 42,
        };
        assert_eq!(err.to_string(), "Record not found in collection docs: id 42");
    }

    #[test]
    fn test_validation_errors() {
        assert!(QuiverError::InvalidArgument("topN".to_string()).is_validation());
        assert!(QuiverError::DimensionOutOfRange {
            dimension: 0,
            max: 16384
        }
        .is_validation());
        assert!(!QuiverError::Backend("down".to_string()).is_validation());
    }
}
