//! Patient and risk assessment endpoints.

use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::Json;
use uuid::Uuid;

use super::snapshot;
use crate::audit::{audit_action, AuditAction};
use crate::server::api::user_id;
use crate::server::error::{require, ApiError};
use crate::server::state::AppState;
use crate::store::{NewPatient, NewRiskAssessment, Patient, RiskAssessment, Variant};

/// GET /api/patients - List patients.
pub async fn list_patients(State(state): State<AppState>) -> Result<Json<Vec<Patient>>, ApiError> {
    Ok(Json(state.db.list_patients().await?))
}

/// POST /api/patients - Register a patient.
pub async fn create_patient(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(input): Json<NewPatient>,
) -> Result<(StatusCode, Json<Patient>), ApiError> {
    require("patientId", &input.patient_id)?;
    require("name", &input.name)?;

    let patient = state.db.create_patient(input).await?;

    audit_action(
        &state.db,
        &state.redactor,
        AuditAction::new("patient_created", patient.id.to_string(), "patients")
            .new_values(snapshot(&patient))
            .user_id(user_id(&headers)),
    )
    .await;

    Ok((StatusCode::CREATED, Json(patient)))
}

/// GET /api/patients/:id - Get one patient.
pub async fn get_patient(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Patient>, ApiError> {
    state
        .db
        .get_patient(id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found("Patient", id))
}

/// GET /api/patients/:id/variants - Variants of one patient.
pub async fn list_patient_variants(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<Variant>>, ApiError> {
    if state.db.get_patient(id).await?.is_none() {
        return Err(ApiError::not_found("Patient", id));
    }
    Ok(Json(state.db.list_variants(Some(id)).await?))
}

/// GET /api/patients/:id/risk-assessments - Risk assessments of one patient.
pub async fn list_risk_assessments(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<RiskAssessment>>, ApiError> {
    Ok(Json(state.db.list_risk_assessments(id).await?))
}

/// POST /api/patients/:id/risk-assessments - Record a risk assessment.
pub async fn create_risk_assessment(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(input): Json<NewRiskAssessment>,
) -> Result<(StatusCode, Json<RiskAssessment>), ApiError> {
    require("riskLevel", &input.risk_level)?;
    let assessment = state.db.create_risk_assessment(id, input).await?;
    Ok((StatusCode::CREATED, Json(assessment)))
}
