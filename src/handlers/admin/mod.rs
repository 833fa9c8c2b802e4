// handlers/admin/mod.rs - Admin handlers (session + per-resource role gate)
//
// Every route resolves the resource first, then runs the access gate before
// touching the query string, the body, or storage.

pub mod list;
pub mod record;

pub use list::list;
pub use record::get as record_get;
pub use record::patch as record_patch;

use crate::app::AppState;
use crate::auth::{gate, Role, Session};
use crate::error::ApiError;
use crate::resources::{self, ResourceSpec};
use crate::services::AdminQueryService;

pub(crate) fn resolve_resource(name: &str) -> Result<&'static ResourceSpec, ApiError> {
    resources::find(name).ok_or_else(|| ApiError::not_found(format!("Unknown resource: {}", name)))
}

/// Run the access gate; denials are audit-logged when enabled.
pub(crate) fn require_role<'a>(
    state: &AppState,
    session: Option<&'a Session>,
    spec: &ResourceSpec,
    allowed: &[Role],
    action: &str,
) -> Result<&'a Session, ApiError> {
    let decision = gate::authorize(session, allowed);
    if let Some(err) = ApiError::from_denial(decision.reason) {
        if state.settings.audit_logging {
            tracing::warn!(
                resource = spec.name,
                action,
                user = session.map(|s| s.id.as_str()).unwrap_or("-"),
                reason = ?decision.reason,
                "admin access denied"
            );
        }
        return Err(err);
    }
    session.ok_or_else(ApiError::unauthorized)
}

pub(crate) async fn query_service(state: &AppState) -> Result<AdminQueryService, ApiError> {
    let store = state
        .db
        .acquire()
        .await
        .map_err(|e| ApiError::from_store(e, state.settings.expose_error_details))?;
    Ok(AdminQueryService::new(store, state.settings.query()))
}
