//! Shared application state.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::config::AppConfig;
use crate::redact::Redactor;
use crate::store::Database;
use crate::structure::{StructureClient, StructureError};

/// Application state shared across all handlers.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Database for entities and the audit log.
    pub db: Database,
    /// Redaction rules for audit snapshots.
    pub redactor: Arc<Redactor>,
    /// Client for the structure prediction service.
    pub structures: StructureClient,
    /// Directory holding structure files.
    pub storage_dir: Arc<PathBuf>,
    /// Largest request body accepted.
    pub max_body_bytes: usize,
}

impl AppState {
    /// Build state from configuration and an open database.
    ///
    /// # Errors
    ///
    /// Returns an error if the structure client cannot be built.
    pub fn new(db: Database, config: &AppConfig) -> Result<Self, StructureError> {
        Ok(Self {
            db,
            redactor: Arc::new(Redactor::new(&config.redaction)),
            structures: StructureClient::new(&config.structures)?,
            storage_dir: Arc::new(config.structures.storage_dir.clone()),
            max_body_bytes: config.server.max_body_bytes,
        })
    }

    /// Directory holding structure files.
    #[must_use]
    pub fn storage_dir(&self) -> &Path {
        &self.storage_dir
    }
}
