//! Audit error types.

use crate::store::StoreError;

/// Errors that can occur while appending to an audit store.
#[derive(thiserror::Error, Debug)]
pub enum AuditError {
    /// The backing database rejected the write.
    #[error("Audit store write failed: {0}")]
    Store(#[from] StoreError),

    /// The store could not be reached at all.
    #[error("Audit store unavailable: {0}")]
    Unavailable(String),
}
