//! Protein structure endpoints.

use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::Json;

use super::snapshot;
use crate::audit::{audit_action, AuditAction};
use crate::server::api::user_id;
use crate::server::error::ApiError;
use crate::server::state::AppState;
use crate::store::ProteinStructure;
use crate::structure::{fetch_and_cache, save_upload, validate_uniprot_id};

/// GET /api/structures/:uniprot_id - Cached structure metadata.
pub async fn get_structure(
    State(state): State<AppState>,
    Path(uniprot_id): Path<String>,
) -> Result<Json<ProteinStructure>, ApiError> {
    validate_uniprot_id(&uniprot_id)?;
    state
        .db
        .get_structure(&uniprot_id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found("Structure", &uniprot_id))
}

/// POST /api/structures/:uniprot_id/fetch - Download and cache a predicted structure.
///
/// Answers 200 when the structure was already cached and 201 after a download.
pub async fn fetch_structure(
    State(state): State<AppState>,
    Path(uniprot_id): Path<String>,
    headers: HeaderMap,
) -> Result<(StatusCode, Json<ProteinStructure>), ApiError> {
    let outcome =
        fetch_and_cache(&state.db, &state.structures, state.storage_dir(), &uniprot_id).await?;
    if outcome.cached {
        return Ok((StatusCode::OK, Json(outcome.structure)));
    }

    audit_action(
        &state.db,
        &state.redactor,
        AuditAction::new("structure_fetched", &uniprot_id, "structures")
            .new_values(snapshot(&outcome.structure))
            .user_id(user_id(&headers)),
    )
    .await;

    Ok((StatusCode::CREATED, Json(outcome.structure)))
}

/// PUT /api/structures/:uniprot_id/upload - Store a structure file from the request body.
pub async fn upload_structure(
    State(state): State<AppState>,
    Path(uniprot_id): Path<String>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<(StatusCode, Json<ProteinStructure>), ApiError> {
    let structure = save_upload(&state.db, state.storage_dir(), &uniprot_id, &body).await?;

    audit_action(
        &state.db,
        &state.redactor,
        AuditAction::new("structure_uploaded", &uniprot_id, "structures")
            .new_values(snapshot(&structure))
            .user_id(user_id(&headers)),
    )
    .await;

    Ok((StatusCode::CREATED, Json(structure)))
}
