use axum::{
    extract::{Path, Query, State},
    Extension,
};
use serde_json::Value;
use std::collections::HashMap;

use super::{query_service, require_role, resolve_resource};
use crate::app::AppState;
use crate::auth::Session;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult};
use crate::services::shape;

/// GET /api/admin/:resource - paginated, filtered listing with optional stats
pub async fn list(
    State(state): State<AppState>,
    Path(resource): Path<String>,
    session: Option<Extension<Session>>,
    Query(params): Query<HashMap<String, String>>,
) -> ApiResult<Value> {
    let spec = resolve_resource(&resource)?;
    let session = session.map(|Extension(s)| s);
    require_role(&state, session.as_ref(), spec, spec.read_roles, "list")?;

    let service = query_service(&state).await?;
    let request = service.request(spec, &params)?;
    let listing = service
        .list(spec, &request)
        .await
        .map_err(|e| ApiError::from_store(e, state.settings.expose_error_details))?;

    tracing::debug!(
        resource = spec.name,
        page = request.window.page,
        limit = request.window.limit,
        search = request.predicate.search().unwrap_or(""),
        total = listing.pagination.total,
        "admin listing"
    );

    Ok(ApiResponse::success(shape(spec, listing)))
}
