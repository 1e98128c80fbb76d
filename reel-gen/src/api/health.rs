//! Health check endpoint

use axum::{extract::State, routing::get, Json, Router};
use chrono::Utc;
use serde::Serialize;

use crate::AppState;

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Service status ("ok")
    pub status: String,
    /// Module name ("reel-gen")
    pub module: String,
    /// Crate version from Cargo.toml
    pub version: String,
    /// Seconds since service started
    pub uptime_seconds: u64,
    pub providers: ProviderStatus,
}

/// "live" when a credential is configured, otherwise "placeholder"
#[derive(Debug, Serialize)]
pub struct ProviderStatus {
    pub speech: &'static str,
    pub video: &'static str,
}

fn mode(configured: bool) -> &'static str {
    if configured {
        "live"
    } else {
        "placeholder"
    }
}

/// GET /health
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let uptime = Utc::now().signed_duration_since(state.startup_time);
    let uptime_seconds = uptime.num_seconds().max(0) as u64;

    Json(HealthResponse {
        status: "ok".to_string(),
        module: "reel-gen".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_seconds,
        providers: ProviderStatus {
            speech: mode(state.config.elevenlabs.is_configured()),
            video: mode(state.config.kling.is_configured()),
        },
    })
}

/// Build health check routes
pub fn health_routes() -> Router<AppState> {
    Router::new().route("/health", get(health_check))
}
