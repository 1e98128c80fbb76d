//! Stage implementations and remote provider clients
//!
//! Provider clients (ElevenLabs, Kling) sit behind traits so the
//! synthesizers can be exercised with test doubles.

pub mod captions;
pub mod elevenlabs_client;
pub mod kling_client;
pub mod lip_sync;
pub mod script_composer;
pub mod video_synthesizer;
pub mod voice_synthesizer;

pub use captions::CaptionStage;
pub use elevenlabs_client::{ElevenLabsClient, SpeechProvider};
pub use kling_client::{KlingClient, TaskStatus, VideoProvider, VideoRequest};
pub use lip_sync::LipSyncStage;
pub use script_composer::{FixedHookSelector, HookSelector, RandomHookSelector, ScriptComposer};
pub use video_synthesizer::{PollPolicy, VideoSynthesizer};
pub use voice_synthesizer::VoiceSynthesizer;

use thiserror::Error;

/// Remote provider errors
///
/// Never reach the client; synthesizers log them and fall back to
/// placeholder media.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("API error {0}: {1}")]
    ApiError(u16, String),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Invalid API key")]
    InvalidApiKey,
}

/// Build a provider HTTP client
pub(crate) fn build_http_client(
    timeout: std::time::Duration,
) -> Result<reqwest::Client, ProviderError> {
    reqwest::Client::builder()
        .user_agent(concat!("reel-gen/", env!("CARGO_PKG_VERSION")))
        .timeout(timeout)
        .build()
        .map_err(|e| ProviderError::NetworkError(e.to_string()))
}

/// Map a non-success provider response to a [`ProviderError`]
pub(crate) async fn error_for_status(response: reqwest::Response) -> ProviderError {
    let status = response.status();
    if status == reqwest::StatusCode::UNAUTHORIZED {
        return ProviderError::InvalidApiKey;
    }
    let error_text = response.text().await.unwrap_or_default();
    ProviderError::ApiError(status.as_u16(), error_text)
}
