/// Health check endpoint
///
/// ```text
/// GET /api/health
/// ```
///
/// ```json
/// { "ok": true, "database": "connected", "version": "0.1.0" }
/// ```
///
/// `ok` reports that the process is serving requests; a failing store shows
/// up as `"database": "disconnected"` without failing the probe.

use crate::app::AppState;
use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};

/// Health check response
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub ok: bool,

    /// `connected` or `disconnected`
    pub database: String,

    /// Application version
    pub version: String,
}

/// Health check handler
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let database = match state.stores.health.ping().await {
        Ok(()) => "connected",
        Err(e) => {
            tracing::warn!(error = %e, "Database health check failed");
            "disconnected"
        }
    };

    Json(HealthResponse {
        ok: true,
        database: database.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}
