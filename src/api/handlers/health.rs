use crate::AppState;
use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    /// False when the identity store cannot answer a lookup
    pub database: bool,
}

/// Liveness plus a cheap storage probe
#[utoipa::path(
    get,
    path = "/health",
    responses((status = 200, description = "Service health", body = HealthResponse)),
    tag = "health"
)]
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let database = match state.repository.email_exists("health@novadom.invalid").await {
        Ok(_) => true,
        Err(e) => {
            tracing::warn!(error = %e, "health check storage probe failed");
            false
        }
    };

    Json(HealthResponse {
        status: if database { "ok" } else { "degraded" }.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        database,
    })
}

/// Service name and entry points
pub async fn root() -> Json<serde_json::Value> {
    let prefix = "/api/v1";
    Json(serde_json::json!({
        "message": "Welcome to NovaDom API",
        "version": env!("CARGO_PKG_VERSION"),
        "status": "operational",
        "auth_endpoints": {
            "register_buyer": format!("{prefix}/auth/register/buyer"),
            "register_developer": format!("{prefix}/auth/register/developer"),
            "token": format!("{prefix}/auth/token"),
            "login": format!("{prefix}/auth/login"),
            "profile": format!("{prefix}/auth/me"),
        },
        "admin_endpoints": {
            "admins": format!("{prefix}/admin/admins"),
            "developers": format!("{prefix}/admin/developers"),
            "pending_developers": format!("{prefix}/admin/developers/pending"),
            "verify_developer": format!("{prefix}/admin/developers/{{id}}/verify"),
            "reject_developer": format!("{prefix}/admin/developers/{{id}}/reject"),
            "reset_developer": format!("{prefix}/admin/developers/{{id}}/reset"),
        },
    }))
}
