// handlers/public/mod.rs - Public handlers (no session required)
//
// Service descriptor and health check.

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde_json::{json, Value};

use crate::app::AppState;
use crate::resources::RESOURCES;

/// GET / - service descriptor
pub async fn root() -> Json<Value> {
    let resources: Vec<&str> = RESOURCES.iter().map(|r| r.name).collect();

    Json(json!({
        "success": true,
        "data": {
            "name": "Admin Query API",
            "version": env!("CARGO_PKG_VERSION"),
            "description": "Paginated, filtered, role-gated admin listings",
            "endpoints": {
                "home": "/ (public)",
                "health": "/health (public)",
                "list": "/api/admin/:resource (session + role)",
                "record": "/api/admin/:resource/:id (session + role; PATCH changes status)",
            },
            "resources": resources,
        }
    }))
}

/// GET /health - storage reachability
pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let now = chrono::Utc::now();

    match state.db.health_check().await {
        Ok(()) => (
            StatusCode::OK,
            Json(json!({
                "success": true,
                "data": {
                    "status": "ok",
                    "timestamp": now,
                    "database": "ok"
                }
            })),
        ),
        Err(e) => {
            tracing::warn!("Health check failed: {}", e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({
                    "success": false,
                    "error": "database unavailable",
                    "data": {
                        "status": "degraded",
                        "timestamp": now,
                        "database_error": state.settings.expose_error_details.then(|| e.to_string())
                    }
                })),
            )
        }
    }
}
