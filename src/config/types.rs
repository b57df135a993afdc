//! Configuration types.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Top-level configuration for the variant tracker.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// HTTP server settings.
    pub server: ServerConfig,
    /// Database settings.
    pub database: DatabaseConfig,
    /// Protein structure fetch settings.
    pub structures: StructureConfig,
    /// Audit redaction rules.
    pub redaction: RedactionConfig,
}

/// Default port for the API server.
pub const DEFAULT_PORT: u16 = 3000;

/// Default request body limit (10 MiB).
pub const DEFAULT_MAX_BODY_BYTES: usize = 10 * 1024 * 1024;

/// Default limit for downloaded structure models (64 MiB).
pub const DEFAULT_MAX_MODEL_BYTES: usize = 64 * 1024 * 1024;

/// HTTP server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Host address to bind to.
    pub host: String,
    /// Port to listen on.
    pub port: u16,
    /// Whether to enable permissive CORS.
    pub cors_permissive: bool,
    /// Largest request body the audit middleware will buffer.
    pub max_body_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: DEFAULT_PORT,
            cors_permissive: true,
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
        }
    }
}

impl ServerConfig {
    /// Get the configured address as a string.
    #[must_use]
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Database configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// Path of the `SQLite` database file.
    pub path: PathBuf,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: data_dir().join("variants.db"),
        }
    }
}

/// Configuration for fetching protein structures from an external service.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StructureConfig {
    /// Base URL of the structure prediction API.
    pub base_url: String,
    /// Directory where structure files are stored.
    pub storage_dir: PathBuf,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
    /// Largest model file accepted from the service.
    pub max_model_bytes: usize,
}

impl Default for StructureConfig {
    fn default() -> Self {
        Self {
            base_url: "https://alphafold.ebi.ac.uk/api".to_string(),
            storage_dir: data_dir().join("structures"),
            timeout_secs: 30,
            max_model_bytes: DEFAULT_MAX_MODEL_BYTES,
        }
    }
}

/// Redaction rules applied to audit payloads.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RedactionConfig {
    /// Replacement for `name` and `email` fields.
    pub marker: String,
    /// Replacement for `ipAddress` fields.
    pub ip_mask: String,
    /// Prefix identifying a medical record number in `patientId`.
    pub mrn_prefix: String,
    /// Number of leading MRN characters left visible.
    pub mrn_visible: usize,
    /// Mask appended after the visible MRN characters.
    pub mrn_mask: String,
    /// Containers nested deeper than this are replaced by the marker.
    pub max_depth: usize,
}

impl Default for RedactionConfig {
    fn default() -> Self {
        Self {
            marker: "[REDACTED]".to_string(),
            ip_mask: "xxx.xxx.xxx.xxx".to_string(),
            mrn_prefix: "MRN-".to_string(),
            mrn_visible: 4,
            mrn_mask: "****".to_string(),
            max_depth: 64,
        }
    }
}

/// Returns the default data directory.
///
/// This is `~/.local/share/variant-tracker` on Unix systems.
#[must_use]
pub fn data_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("variant-tracker")
}
