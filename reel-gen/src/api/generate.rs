//! Generation trigger endpoint
//!
//! `POST /api/generate` with `{ "topic": "..." }`.
//!
//! - Empty topic: 400 JSON error, no stream, no stage runs
//! - Malformed body: stream carrying a single terminal error event
//! - Otherwise: stream of progress events ending in one terminal event

use crate::error::ApiResult;
use crate::models::GenerationRequest;
use crate::pipeline::{ChannelSink, RunEmitter};
use crate::AppState;
use axum::{
    extract::{rejection::JsonRejection, State},
    http::header,
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use reel_common::sse::progress_event_stream;
use reel_common::ProgressEvent;
use tokio::sync::mpsc;
use tracing::{info, warn};

/// POST /api/generate
pub async fn generate(
    State(state): State<AppState>,
    payload: Result<Json<GenerationRequest>, JsonRejection>,
) -> ApiResult<Response> {
    let request = match payload {
        Ok(Json(request)) => request,
        Err(rejection) => {
            let message = rejection.body_text();
            warn!("Malformed generation request: {}", message);
            return Ok(single_error_stream(message).await);
        }
    };

    let topic = request.into_topic()?;
    info!(topic = %topic, "Generation requested");

    let rx = state.pipeline.clone().spawn(topic);
    Ok(stream_response(rx))
}

/// Stream that carries only one terminal error event
async fn single_error_stream(message: String) -> Response {
    let (tx, rx) = mpsc::channel(1);
    let mut sink = ChannelSink::new(tx);
    RunEmitter::new(&mut sink)
        .finish(ProgressEvent::error(message))
        .await;
    drop(sink);
    stream_response(rx)
}

/// SSE response: `text/event-stream`, `Cache-Control: no-cache` (set by
/// axum), plus an explicit keep-alive connection header
fn stream_response(rx: mpsc::Receiver<ProgressEvent>) -> Response {
    (
        [(header::CONNECTION, "keep-alive")],
        progress_event_stream(rx),
    )
        .into_response()
}

/// Build generation routes
pub fn generate_routes() -> Router<AppState> {
    Router::new().route("/api/generate", post(generate))
}
