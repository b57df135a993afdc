//! Variant and prediction endpoints.

use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::Json;
use uuid::Uuid;

use super::snapshot;
use crate::audit::{audit_action, AuditAction};
use crate::server::api::{user_id, VariantsQuery};
use crate::server::error::{require, ApiError};
use crate::server::state::AppState;
use crate::store::{NewPrediction, NewVariant, Prediction, Variant};

/// GET /api/variants - List variants, optionally for one patient.
pub async fn list_variants(
    State(state): State<AppState>,
    Query(query): Query<VariantsQuery>,
) -> Result<Json<Vec<Variant>>, ApiError> {
    Ok(Json(state.db.list_variants(query.patient_id).await?))
}

/// POST /api/variants - Insert or update a variant.
///
/// Answers 201 for a new variant and 200 when an existing one was updated.
pub async fn upsert_variant(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(input): Json<NewVariant>,
) -> Result<(StatusCode, Json<Variant>), ApiError> {
    require("gene", &input.gene)?;
    require("hgvs", &input.hgvs)?;

    let upsert = state.db.upsert_variant(input).await?;
    let variant = upsert.variant;

    let (status, action) = match upsert.previous {
        Some(previous) => (
            StatusCode::OK,
            AuditAction::new("variant_updated", variant.id.to_string(), "variants")
                .old_values(snapshot(&previous)),
        ),
        None => (
            StatusCode::CREATED,
            AuditAction::new("variant_created", variant.id.to_string(), "variants"),
        ),
    };
    audit_action(
        &state.db,
        &state.redactor,
        action
            .new_values(snapshot(&variant))
            .user_id(user_id(&headers)),
    )
    .await;

    Ok((status, Json(variant)))
}

/// GET /api/variants/:id - Get one variant.
pub async fn get_variant(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Variant>, ApiError> {
    state
        .db
        .get_variant(id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found("Variant", id))
}

/// GET /api/variants/:id/predictions - Model predictions for a variant.
pub async fn list_predictions(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<Prediction>>, ApiError> {
    Ok(Json(state.db.list_predictions(id).await?))
}

/// POST /api/variants/:id/predictions - Record a model prediction.
pub async fn create_prediction(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(input): Json<NewPrediction>,
) -> Result<(StatusCode, Json<Prediction>), ApiError> {
    require("modelName", &input.model_name)?;
    if !input.score.is_finite() {
        return Err(ApiError::Validation("score must be a finite number".to_string()));
    }

    let prediction = state.db.create_prediction(id, input).await?;
    Ok((StatusCode::CREATED, Json(prediction)))
}
