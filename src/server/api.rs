//! Request and response types for the HTTP API.

use axum::http::HeaderMap;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Header carrying the acting user's id.
pub const USER_ID_HEADER: &str = "x-user-id";

/// Maximum allowed limit for pagination.
pub const MAX_AUDIT_LIMIT: usize = 1000;

const fn default_limit() -> usize {
    100
}

/// Error body returned by every failing endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

impl ErrorBody {
    /// Create an error body.
    #[must_use]
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}

/// Response for GET /api/health.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
}

/// Query parameters for GET /api/variants.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VariantsQuery {
    /// Only list variants of this patient.
    pub patient_id: Option<Uuid>,
}

/// Query parameters for GET /api/audit-logs.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditLogQuery {
    /// Maximum number of records to return.
    #[serde(default = "default_limit")]
    pub limit: usize,
    /// Number of records to skip.
    #[serde(default)]
    pub offset: usize,
    /// Only return records for this entity type, e.g. `Variant`.
    #[serde(default)]
    pub entity_type: Option<String>,
}

impl AuditLogQuery {
    /// Get the effective limit, capped at `MAX_AUDIT_LIMIT`.
    #[must_use]
    pub fn effective_limit(&self) -> usize {
        self.limit.min(MAX_AUDIT_LIMIT)
    }
}

impl Default for AuditLogQuery {
    fn default() -> Self {
        Self {
            limit: default_limit(),
            offset: 0,
            entity_type: None,
        }
    }
}

/// Acting user from the request headers, if present and readable.
#[must_use]
pub fn user_id(headers: &HeaderMap) -> Option<String> {
    headers
        .get(USER_ID_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(String::from)
}
