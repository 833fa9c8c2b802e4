mod common;

use anyhow::Result;
use axum::http::StatusCode;
use serde_json::json;

#[tokio::test]
async fn root_lists_resources() -> Result<()> {
    let app = common::spawn(json!({})).await?;
    let (status, body) = app.get("/", None).await?;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    let resources = body["data"]["resources"].as_array().expect("resources array");
    assert!(resources.contains(&json!("orders")));
    assert!(resources.contains(&json!("volunteers")));
    Ok(())
}

#[tokio::test]
async fn health_reports_ok_on_memory_store() -> Result<()> {
    let app = common::spawn(json!({})).await?;
    let (status, body) = app.get("/health", None).await?;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], "ok");
    assert_eq!(body["data"]["database"], "ok");
    Ok(())
}
