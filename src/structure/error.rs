//! Structure fetch error types.

use std::path::PathBuf;

use crate::store::StoreError;

/// Errors from fetching, uploading or caching protein structures.
#[derive(thiserror::Error, Debug)]
pub enum StructureError {
    #[error("Invalid UniProt accession: {0:?}")]
    InvalidId(String),

    #[error("Invalid structure service URL {url}: {reason}")]
    InvalidBaseUrl { url: String, reason: String },

    #[error("Structure request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Structure service returned HTTP {status} for {url}")]
    Status { url: String, status: u16 },

    #[error("Structure model at {url} exceeds {limit} bytes")]
    ModelTooLarge { url: String, limit: usize },

    #[error("No structure model available for {0}")]
    MissingModel(String),

    #[error("Structure file is empty")]
    EmptyFile,

    #[error("Failed to write structure file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Store(#[from] StoreError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_display() {
        let err = StructureError::Status {
            url: "https://example.org/api/prediction/P1".to_string(),
            status: 404,
        };
        assert_eq!(
            err.to_string(),
            "Structure service returned HTTP 404 for https://example.org/api/prediction/P1"
        );
    }

    #[test]
    fn test_store_error_transparent() {
        let err = StructureError::from(StoreError::TaskCancelled);
        assert_eq!(err.to_string(), "Blocking task cancelled");
    }
}
