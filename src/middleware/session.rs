use axum::{
    extract::{Request, State},
    http::{header, HeaderMap},
    middleware::Next,
    response::Response,
};

use crate::app::AppState;
use crate::auth::{decode_token, Session};

/// Resolve the caller's session, if any, into request extensions.
///
/// Never rejects: a missing, malformed, or expired token simply leaves the
/// request without a `Session`, and the access gate answers for it.
pub async fn resolve_session(State(state): State<AppState>, mut request: Request, next: Next) -> Response {
    let settings = &state.settings;
    let session = extract_token(request.headers(), &settings.session_cookie).and_then(|token| {
        match decode_token(&token, &settings.jwt_secret) {
            Ok(claims) => Some(Session::from(claims)),
            Err(e) => {
                tracing::debug!("Ignoring session token: {}", e);
                None
            }
        }
    });

    if let Some(session) = session {
        request.extensions_mut().insert(session);
    }
    next.run(request).await
}

/// Bearer token from `Authorization`, falling back to the session cookie.
fn extract_token(headers: &HeaderMap, cookie_name: &str) -> Option<String> {
    let bearer = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty());
    if let Some(token) = bearer {
        return Some(token.to_string());
    }

    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, value)| *name == cookie_name && !value.is_empty())
        .map(|(_, value)| value.to_string())
}
