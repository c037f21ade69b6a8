//! Error types for local persistence

use std::path::PathBuf;
use thiserror::Error;

/// Result type for store operations
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors that can occur while reading or writing the local namespace
#[derive(Debug, Error)]
pub enum StoreError {
    /// Failed to read a file
    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Failed to write a file
    #[error("Failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    /// A stored file did not parse as valid JSON
    #[error("Failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },

    /// A value could not be serialized
    #[error("Failed to serialize value: {0}")]
    Serialize(#[source] serde_json::Error),

    /// Failed to create the data directory
    #[error("Failed to create directory {path}: {source}")]
    DirectoryCreation {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Could not resolve a platform data directory
    #[error("Path resolution failed: {reason}")]
    PathResolution { reason: String },

    /// The store mutex was poisoned by a panicking writer
    #[error("Store lock poisoned")]
    LockPoisoned,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_includes_path() {
        let err = StoreError::Read {
            path: PathBuf::from("/tmp/study_data.json"),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "gone"),
        };
        assert!(err.to_string().contains("study_data.json"));
    }

    #[test]
    fn test_path_resolution_display() {
        let err = StoreError::PathResolution {
            reason: "no home directory".to_string(),
        };
        assert!(err.to_string().contains("no home directory"));
    }
}
