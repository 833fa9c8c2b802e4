use axum::{
    http::{header, HeaderValue, Method},
    middleware,
    routing::get,
    Router,
};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    trace::TraceLayer,
};

use crate::config::AppConfig;
use crate::database::DatabaseManager;
use crate::filter::PageLimits;
use crate::handlers::{admin, public};
use crate::middleware::resolve_session;
use crate::services::{LogNotifier, Notifier, QuerySettings};

/// Per-process settings the request path reads. Copied out of `AppConfig` once
/// so handlers and tests never touch the global.
#[derive(Debug, Clone)]
pub struct ServiceSettings {
    pub page_limits: PageLimits,
    pub max_search_length: usize,
    pub jwt_secret: String,
    pub session_cookie: String,
    pub expose_error_details: bool,
    pub audit_logging: bool,
    pub cors_origins: Vec<String>,
}

impl ServiceSettings {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            page_limits: PageLimits::new(config.query.default_limit, config.query.max_limit),
            max_search_length: config.query.max_search_length,
            jwt_secret: config.security.jwt_secret.clone(),
            session_cookie: config.security.session_cookie.clone(),
            expose_error_details: config.security.expose_error_details,
            audit_logging: config.security.enable_audit_logging,
            cors_origins: config.security.cors_origins.clone(),
        }
    }

    pub fn query(&self) -> QuerySettings {
        QuerySettings {
            limits: self.page_limits,
            max_search_length: self.max_search_length,
        }
    }
}

#[derive(Clone)]
pub struct AppState {
    pub db: Arc<DatabaseManager>,
    pub notifier: Arc<dyn Notifier>,
    pub settings: Arc<ServiceSettings>,
}

impl AppState {
    pub fn new(db: DatabaseManager, settings: ServiceSettings) -> Self {
        Self {
            db: Arc::new(db),
            notifier: Arc::new(LogNotifier),
            settings: Arc::new(settings),
        }
    }

    pub fn with_notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.notifier = notifier;
        self
    }
}

pub fn app(state: AppState) -> Router {
    let cors = cors_layer(&state.settings.cors_origins);

    Router::new()
        // Public
        .route("/", get(public::root))
        .route("/health", get(public::health))
        // Admin listings and per-record status changes
        .route("/api/admin/:resource", get(admin::list))
        .route("/api/admin/:resource/:id", get(admin::record_get).patch(admin::record_patch))
        .layer(middleware::from_fn_with_state(state.clone(), resolve_session))
        .layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()).layer(cors))
        .with_state(state)
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    if origins.is_empty() {
        return CorsLayer::permissive();
    }

    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|o| match HeaderValue::from_str(o) {
            Ok(v) => Some(v),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin: {}", o);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::PATCH, Method::OPTIONS])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
        .allow_credentials(true)
}
