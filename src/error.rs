// HTTP API Error Types
use axum::{http::StatusCode, response::IntoResponse, Json};
use serde::Serialize;
use serde_json::{json, Value};

use crate::auth::AccessReason;
use crate::database::StoreError;
use crate::filter::FilterError;

/// One failed field of a request body or query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self { field: field.into(), message: message.into() }
    }
}

/// HTTP API error with status code and client-safe message
#[derive(Debug)]
pub enum ApiError {
    // 400 Bad Request
    BadRequest(String),
    ValidationError { message: String, field_errors: Vec<FieldError> },

    // 401 Unauthorized
    Unauthorized(String),

    // 403 Forbidden
    Forbidden(String),

    // 404 Not Found
    NotFound(String),

    // 409 Conflict
    Conflict(String),

    // 500 Internal Server Error
    InternalServerError { message: String, details: Option<String> },

    // 503 Service Unavailable
    ServiceUnavailable(String),
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) | ApiError::ValidationError { .. } => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::InternalServerError { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::ServiceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        }
    }

    pub fn message(&self) -> &str {
        match self {
            ApiError::BadRequest(msg)
            | ApiError::Unauthorized(msg)
            | ApiError::Forbidden(msg)
            | ApiError::NotFound(msg)
            | ApiError::Conflict(msg)
            | ApiError::ServiceUnavailable(msg) => msg,
            ApiError::ValidationError { message, .. } => message,
            ApiError::InternalServerError { message, .. } => message,
        }
    }

    /// `{success: false, error, details?}`
    pub fn to_json(&self) -> Value {
        let mut body = json!({
            "success": false,
            "error": self.message(),
        });
        match self {
            ApiError::ValidationError { field_errors, .. } => {
                body["details"] = json!(field_errors);
            }
            ApiError::InternalServerError { details: Some(details), .. } => {
                body["details"] = Value::String(details.clone());
            }
            _ => {}
        }
        body
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        ApiError::BadRequest(message.into())
    }

    pub fn validation_error(message: impl Into<String>, field_errors: Vec<FieldError>) -> Self {
        ApiError::ValidationError { message: message.into(), field_errors }
    }

    pub fn unauthorized() -> Self {
        ApiError::Unauthorized("Authentication required".to_string())
    }

    pub fn forbidden() -> Self {
        ApiError::Forbidden("Insufficient permissions".to_string())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        ApiError::NotFound(message.into())
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        ApiError::Conflict(message.into())
    }

    pub fn internal_server_error(message: impl Into<String>) -> Self {
        ApiError::InternalServerError { message: message.into(), details: None }
    }

    pub fn service_unavailable(message: impl Into<String>) -> Self {
        ApiError::ServiceUnavailable(message.into())
    }

    /// Map a denied access decision to its HTTP error; `None` when access was granted.
    pub fn from_denial(reason: AccessReason) -> Option<Self> {
        match reason {
            AccessReason::Unauthenticated => Some(Self::unauthorized()),
            AccessReason::Forbidden => Some(Self::forbidden()),
            AccessReason::Ok => None,
        }
    }

    /// Storage failure as seen by the client. The cause is logged here and only
    /// echoed back as `details` when `expose_details` is set.
    pub fn from_store(err: StoreError, expose_details: bool) -> Self {
        match err {
            StoreError::Conflict(msg) => ApiError::conflict(msg),
            StoreError::ConnectionError(msg) => {
                tracing::error!("Database connection error: {}", msg);
                ApiError::service_unavailable("Database temporarily unavailable")
            }
            StoreError::InvalidDatabaseUrl => {
                tracing::error!("Database URL is invalid");
                ApiError::service_unavailable("Database temporarily unavailable")
            }
            StoreError::QueryError(msg) => {
                tracing::error!("Database query error: {}", msg);
                ApiError::InternalServerError {
                    message: "Query failed".to_string(),
                    details: expose_details.then_some(msg),
                }
            }
            StoreError::Sqlx(sqlx_err) => {
                tracing::error!("SQLx error: {}", sqlx_err);
                ApiError::InternalServerError {
                    message: "Query failed".to_string(),
                    details: expose_details.then(|| sqlx_err.to_string()),
                }
            }
        }
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        ApiError::from_store(err, false)
    }
}

impl From<FilterError> for ApiError {
    fn from(err: FilterError) -> Self {
        let message = match &err {
            FilterError::InvalidFilterValue { allowed, .. } => {
                format!("{} (expected one of: {})", err, allowed.join(", "))
            }
            FilterError::InvalidField(_) => err.to_string(),
        };
        ApiError::validation_error("Invalid query parameters", vec![FieldError::new(err.param(), message)])
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message())
    }
}

impl std::error::Error for ApiError {}

// Automatic HTTP response conversion for Axum
impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        (self.status_code(), Json(self.to_json())).into_response()
    }
}
