//! HTTP API handlers for reel-gen
//!
//! - `POST /api/generate`: start a run, stream its progress as SSE
//! - `GET /health`: liveness and provider status

pub mod generate;
pub mod health;

pub use generate::generate_routes;
pub use health::health_routes;
