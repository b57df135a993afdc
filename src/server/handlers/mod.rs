//! HTTP handlers for the tracker API.

mod audit_logs;
mod patients;
mod social;
mod structures;
mod variants;

use axum::Json;
use serde::Serialize;
use serde_json::Value;

use super::api::HealthResponse;

pub use audit_logs::list_audit_logs;
pub use patients::{
    create_patient, create_risk_assessment, get_patient, list_patient_variants, list_patients,
    list_risk_assessments,
};
pub use social::{create_comment, create_share, list_comments, list_shares};
pub use structures::{fetch_structure, get_structure, upload_structure};
pub use variants::{create_prediction, get_variant, list_predictions, list_variants, upsert_variant};

/// GET /api/health - Liveness probe.
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
    })
}

/// JSON snapshot of an entity for the audit trail.
///
/// An entity that fails to serialize has no snapshot rather than a `null` one.
fn snapshot<T: Serialize>(entity: &T) -> Option<Value> {
    match serde_json::to_value(entity) {
        Ok(value) => Some(value),
        Err(e) => {
            tracing::warn!(error = %e, "Failed to snapshot entity for audit");
            None
        }
    }
}
