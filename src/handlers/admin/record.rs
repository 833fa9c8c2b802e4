use axum::{
    extract::{rejection::JsonRejection, Path, State},
    Extension, Json,
};
use serde_json::Value;

use super::{query_service, require_role, resolve_resource};
use crate::app::AppState;
use crate::auth::Session;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult};
use crate::resources::StatusUpdate;
use crate::services::{notify_best_effort, StatusChangeEvent};

/// GET /api/admin/:resource/:id
pub async fn get(
    State(state): State<AppState>,
    Path((resource, id)): Path<(String, String)>,
    session: Option<Extension<Session>>,
) -> ApiResult<Value> {
    let spec = resolve_resource(&resource)?;
    let session = session.map(|Extension(s)| s);
    require_role(&state, session.as_ref(), spec, spec.read_roles, "read")?;

    let service = query_service(&state).await?;
    match service
        .get(spec, &id)
        .await
        .map_err(|e| ApiError::from_store(e, state.settings.expose_error_details))?
    {
        Some(record) => Ok(ApiResponse::success(record)),
        None => Err(ApiError::not_found("Record not found")),
    }
}

/// PATCH /api/admin/:resource/:id - move a record through its lifecycle
pub async fn patch(
    State(state): State<AppState>,
    Path((resource, id)): Path<(String, String)>,
    session: Option<Extension<Session>>,
    payload: Result<Json<StatusUpdate>, JsonRejection>,
) -> ApiResult<Value> {
    let spec = resolve_resource(&resource)?;
    let session = session.map(|Extension(s)| s);
    let session = require_role(&state, session.as_ref(), spec, spec.mutate_roles, "update")?;

    let Json(body) = payload.map_err(|e| ApiError::bad_request(format!("Invalid request body: {}", e.body_text())))?;
    let update = body
        .validate(spec)
        .map_err(|errors| ApiError::validation_error("Validation failed", errors))?;

    let service = query_service(&state).await?;
    let record = service
        .update_status(spec, &id, &update, &session.id)
        .await
        .map_err(|e| ApiError::from_store(e, state.settings.expose_error_details))?
        .ok_or_else(|| ApiError::not_found("Record not found"))?;

    if state.settings.audit_logging {
        tracing::info!(resource = spec.name, record = %id, status = %update.status, user = %session.id, "status updated");
    }

    let event = StatusChangeEvent {
        resource: spec.name.to_string(),
        record_id: id,
        status: update.status,
        changed_by: session.id.clone(),
    };
    notify_best_effort(state.notifier.as_ref(), &event).await;

    Ok(ApiResponse::success(record))
}
