//! Comment and share endpoints.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use uuid::Uuid;

use crate::server::error::{require, ApiError};
use crate::server::state::AppState;
use crate::store::{Comment, NewComment, NewShare, Share};

/// GET /api/variants/:id/comments
pub async fn list_comments(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<Comment>>, ApiError> {
    Ok(Json(state.db.list_comments(id).await?))
}

/// POST /api/variants/:id/comments
pub async fn create_comment(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(input): Json<NewComment>,
) -> Result<(StatusCode, Json<Comment>), ApiError> {
    require("author", &input.author)?;
    require("body", &input.body)?;
    Ok((StatusCode::CREATED, Json(state.db.create_comment(id, input).await?)))
}

/// GET /api/variants/:id/shares
pub async fn list_shares(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<Share>>, ApiError> {
    Ok(Json(state.db.list_shares(id).await?))
}

/// POST /api/variants/:id/shares
pub async fn create_share(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(input): Json<NewShare>,
) -> Result<(StatusCode, Json<Share>), ApiError> {
    require("sharedBy", &input.shared_by)?;
    require("sharedWith", &input.shared_with)?;
    Ok((StatusCode::CREATED, Json(state.db.create_share(id, input).await?)))
}
