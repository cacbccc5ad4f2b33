//! Health check and dashboard settings handlers

use axum::{extract::State, Json};
use serde::Serialize;
use shared::types::DashboardSettings;

use crate::middleware::CurrentUser;
use crate::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub database: String,
}

/// Health check endpoint handler
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    // Check database connectivity
    let db_status = match sqlx::query("SELECT 1").execute(&state.db).await {
        Ok(_) => "connected".to_string(),
        Err(e) => {
            tracing::error!(error = %e, "Health check could not reach the database");
            "disconnected".to_string()
        }
    };

    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        database: db_status,
    })
}

/// Polling intervals and display thresholds for the admin dashboards
pub async fn get_dashboard_settings(
    State(state): State<AppState>,
    _current_user: CurrentUser,
) -> Json<DashboardSettings> {
    Json(state.config.dashboard.settings())
}
