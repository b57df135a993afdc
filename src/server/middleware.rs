//! Request-observing audit middleware.

use axum::body::Body;
use axum::extract::{Request, State};
use axum::http::Method;
use axum::middleware::Next;
use axum::response::Response;
use serde_json::Value;

use super::api::user_id;
use super::error::ApiError;
use super::state::AppState;
use crate::audit::{audit_action, AuditAction, UNKNOWN_ENTITY_ID};

/// Last non-empty segment of a request path.
fn last_segment(path: &str) -> &str {
    path.rsplit('/').find(|s| !s.is_empty()).unwrap_or_default()
}

/// Map a failure to buffer the request body to an API error.
///
/// Errors from the body itself arrive wrapped in [`axum::Error`]; any other
/// error is the length limit being hit.
fn body_error(err: axum::Error, limit: usize) -> ApiError {
    let inner = err.into_inner();
    if inner.is::<axum::Error>() {
        ApiError::Validation(format!("Failed to read request body: {inner}"))
    } else {
        ApiError::PayloadTooLarge(limit)
    }
}

/// Audit every successful non-`GET` API request.
///
/// The request body is buffered so it can be recorded as the new values of
/// the record. The audit write is spawned after the handler has produced its
/// response and does not hold the response back. Handlers that audit
/// explicitly still get this generic record as well.
pub async fn audit_requests(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    if request.method() == Method::GET || !request.uri().path().starts_with("/api/") {
        return Ok(next.run(request).await);
    }

    let method = request.method().clone();
    let path = request.uri().path().to_string();
    let user = user_id(request.headers());

    let (parts, body) = request.into_parts();
    let bytes = axum::body::to_bytes(body, state.max_body_bytes)
        .await
        .map_err(|e| body_error(e, state.max_body_bytes))?;
    let payload: Option<Value> = serde_json::from_slice(&bytes).ok();

    let response = next.run(Request::from_parts(parts, Body::from(bytes))).await;
    let status = response.status();
    if status.is_client_error() || status.is_server_error() {
        return Ok(response);
    }

    let entity_id = payload
        .as_ref()
        .and_then(|p| p.get("id"))
        .and_then(Value::as_str)
        .unwrap_or(UNKNOWN_ENTITY_ID)
        .to_string();
    let mut action =
        AuditAction::new(format!("{method} {path}"), entity_id, last_segment(&path)).user_id(user);
    if let Some(payload) = payload {
        action = action.new_values(payload);
    }

    let db = state.db.clone();
    let redactor = state.redactor.clone();
    tokio::spawn(async move {
        audit_action(&db, &redactor, action).await;
    });

    Ok(response)
}
