#![allow(dead_code)]

use std::sync::Arc;

use anyhow::Result;
use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use serde_json::Value;
use tower::ServiceExt;

use admin_query_api::app::{app, AppState, ServiceSettings};
use admin_query_api::auth::{issue_token, Claims};
use admin_query_api::cli::commands::seed::{self, Fixture};
use admin_query_api::database::{DatabaseManager, MemoryStore, StoreHandle};
use admin_query_api::filter::PageLimits;
use admin_query_api::services::Notifier;

pub const SECRET: &str = "integration-test-secret";
pub const COOKIE: &str = "admin_session";

pub fn settings() -> ServiceSettings {
    ServiceSettings {
        page_limits: PageLimits::new(20, 100),
        max_search_length: 100,
        jwt_secret: SECRET.to_string(),
        session_cookie: COOKIE.to_string(),
        expose_error_details: false,
        audit_logging: true,
        cors_origins: Vec::new(),
    }
}

pub struct TestApp {
    pub router: Router,
    pub store: StoreHandle,
}

/// Router over an in-memory store seeded with `fixture` (`{collection: [docs]}`).
pub async fn spawn(fixture: Value) -> Result<TestApp> {
    build(fixture, None).await
}

pub async fn spawn_with_notifier(fixture: Value, notifier: Arc<dyn Notifier>) -> Result<TestApp> {
    build(fixture, Some(notifier)).await
}

async fn build(fixture: Value, notifier: Option<Arc<dyn Notifier>>) -> Result<TestApp> {
    let store = Arc::new(MemoryStore::new());
    let fixture: Fixture = serde_json::from_value(fixture)?;
    seed::load(store.as_ref(), fixture).await?;

    let mut state = AppState::new(DatabaseManager::with_store(store.clone()), settings());
    if let Some(notifier) = notifier {
        state = state.with_notifier(notifier);
    }
    Ok(TestApp { router: app(state), store })
}

/// Router over an arbitrary store, e.g. one that fails every call.
pub fn with_store(store: StoreHandle, settings: ServiceSettings) -> TestApp {
    let state = AppState::new(DatabaseManager::with_store(store.clone()), settings);
    TestApp { router: app(state), store }
}

pub fn token(sub: &str, role: &str) -> String {
    issue_token(&Claims::new(sub, role, 1), SECRET).expect("token")
}

impl TestApp {
    pub async fn get(&self, uri: &str, token: Option<&str>) -> Result<(StatusCode, Value)> {
        let mut req = Request::builder().method(Method::GET).uri(uri);
        if let Some(token) = token {
            req = req.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        self.send(req.body(Body::empty())?).await
    }

    pub async fn patch(&self, uri: &str, token: Option<&str>, body: Value) -> Result<(StatusCode, Value)> {
        let mut req = Request::builder()
            .method(Method::PATCH)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json");
        if let Some(token) = token {
            req = req.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        self.send(req.body(Body::from(serde_json::to_vec(&body)?))?).await
    }

    pub async fn send(&self, req: Request<Body>) -> Result<(StatusCode, Value)> {
        let resp = self.router.clone().oneshot(req).await?;
        let status = resp.status();
        let bytes = to_bytes(resp.into_body(), usize::MAX).await?;
        let body = if bytes.is_empty() { Value::Null } else { serde_json::from_slice(&bytes)? };
        Ok((status, body))
    }
}

/// `n` documents with ids `id00..` and strictly increasing `createdAt`.
pub fn numbered(n: usize, extra: impl Fn(usize) -> Value) -> Vec<Value> {
    (0..n)
        .map(|i| {
            let mut doc = serde_json::json!({
                "_id": format!("id{:02}", i),
                "createdAt": format!("2024-01-{:02}T00:00:00Z", i + 1),
            });
            if let (Value::Object(obj), Value::Object(more)) = (&mut doc, extra(i)) {
                obj.extend(more);
            }
            doc
        })
        .collect()
}
