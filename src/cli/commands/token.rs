use anyhow::Context;
use serde_json::json;

use crate::auth::{issue_token, Claims, Role};
use crate::cli::{utils::output_success, OutputFormat};
use crate::config::config;

pub fn handle(sub: &str, role: &str, hours: Option<u64>, output_format: OutputFormat) -> anyhow::Result<()> {
    let role: Role = role
        .parse()
        .map_err(|_| anyhow::anyhow!("unknown role '{}' (expected admin, editor, reviewer or finance)", role))?;
    anyhow::ensure!(!sub.trim().is_empty(), "--sub must not be empty");

    let security = &config().security;
    let hours = hours.unwrap_or(security.jwt_expiry_hours);
    let hours = i64::try_from(hours).context("--hours is too large")?;

    let claims = Claims::new(sub, role.as_str(), hours);
    let token = issue_token(&claims, &security.jwt_secret)?;

    match output_format {
        OutputFormat::Json => output_success(
            output_format,
            "Token issued",
            Some(json!({ "token": token, "sub": sub, "role": role, "expires_at": claims.exp })),
        ),
        OutputFormat::Text => {
            println!("{}", token);
            Ok(())
        }
    }
}
