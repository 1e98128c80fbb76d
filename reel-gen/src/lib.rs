//! reel-gen library interface
//!
//! Exposes the router, state and pipeline for the binary and for
//! integration testing.

pub mod api;
pub mod config;
pub mod error;
pub mod models;
pub mod pipeline;
pub mod services;

pub use crate::error::{ApiError, ApiResult};

use crate::config::GeneratorConfig;
use crate::pipeline::{GenerationStages, LiveStages, Pipeline};
use axum::Router;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    /// Resolved configuration (read-only after startup)
    pub config: Arc<GeneratorConfig>,
    pub pipeline: Arc<Pipeline>,
    /// Service startup timestamp for uptime tracking
    pub startup_time: DateTime<Utc>,
}

impl AppState {
    /// State with live stages built from `config`
    pub fn new(config: GeneratorConfig) -> Self {
        let stages = Arc::new(LiveStages::from_config(&config));
        Self::with_stages(config, stages)
    }

    /// State with caller-supplied stages
    pub fn with_stages(config: GeneratorConfig, stages: Arc<dyn GenerationStages>) -> Self {
        let pipeline = Arc::new(Pipeline::new(stages, config.timing.clone()));
        Self {
            config: Arc::new(config),
            pipeline,
            startup_time: Utc::now(),
        }
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .merge(api::generate_routes())
        .merge(api::health_routes())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
