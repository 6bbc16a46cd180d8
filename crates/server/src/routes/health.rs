//! Health check endpoint

use axum::{Extension, Json, extract::State, http::StatusCode, response::IntoResponse};
use deadpool_postgres::Pool;
use serde::Serialize;

use crate::ai::Assistant;

/// Health check response
#[derive(Serialize)]
pub struct HealthResponse {
    status: &'static str,
    database: &'static str,
    /// `enabled` when a model API key is configured
    ai: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    reason: Option<String>,
}

/// GET /health - Check database connectivity and report AI configuration
pub async fn check(
    State(pool): State<Pool>,
    Extension(assistant): Extension<Assistant>,
) -> impl IntoResponse {
    let ai = if assistant.is_enabled() {
        "enabled"
    } else {
        "disabled"
    };

    let failure = match pool.get().await {
        Ok(client) => match client.query_one("SELECT 1", &[]).await {
            Ok(_) => None,
            Err(e) => {
                tracing::error!(error = %e, "Health check query failed");
                Some(format!("Database query failed: {}", e))
            }
        },
        Err(e) => {
            tracing::error!(error = %e, "Health check pool error");
            Some(format!("Database connection failed: {}", e))
        }
    };

    match failure {
        None => (
            StatusCode::OK,
            Json(HealthResponse {
                status: "healthy",
                database: "up",
                ai,
                reason: None,
            }),
        ),
        Some(reason) => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(HealthResponse {
                status: "unhealthy",
                database: "down",
                ai,
                reason: Some(reason),
            }),
        ),
    }
}
