//! Audit log browsing.

use axum::extract::{Query, State};
use axum::Json;

use crate::audit::AuditRecord;
use crate::server::api::AuditLogQuery;
use crate::server::error::ApiError;
use crate::server::state::AppState;

/// GET /api/audit-logs - Newest audit records first.
///
/// Snapshots were redacted when written, so records are returned as stored.
pub async fn list_audit_logs(
    State(state): State<AppState>,
    Query(query): Query<AuditLogQuery>,
) -> Result<Json<Vec<AuditRecord>>, ApiError> {
    let limit = query.effective_limit();
    let records = state
        .db
        .list_audit_records(limit, query.offset, query.entity_type)
        .await?;
    Ok(Json(records))
}
