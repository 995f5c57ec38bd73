pub mod academics;
pub mod auth;
pub mod health;
pub mod logs;
pub mod questions;
pub mod results;
pub mod staff;
pub mod students;
pub mod tests;

use crate::middleware::auth::Claims;
use crate::services::audit_service::Actor;
use axum::http::HeaderMap;

/// Builds the audit actor for a request from the verified claims and the
/// request headers.
pub fn actor_from(claims: &Claims, headers: &HeaderMap) -> Actor {
    let ip = headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.split(',').next())
        .map(|s| s.trim().to_string());
    let user_agent = headers
        .get(axum::http::header::USER_AGENT)
        .and_then(|v| v.to_str().ok())
        .map(String::from);

    Actor {
        admin_id: claims.admin_id(),
        ip,
        user_agent,
    }
}
