//! ElevenLabs text-to-speech client

use super::{build_http_client, error_for_status, ProviderError};
use async_trait::async_trait;
use serde::Serialize;
use std::time::Duration;

pub const ELEVENLABS_BASE_URL: &str = "https://api.elevenlabs.io";
/// "Rachel" stock voice
pub const DEFAULT_VOICE_ID: &str = "21m00Tcm4TlvDq8ikWAM";
const MODEL_ID: &str = "eleven_monolingual_v1";
const STABILITY: f32 = 0.5;
const SIMILARITY_BOOST: f32 = 0.5;

/// Source of synthesized speech
#[async_trait]
pub trait SpeechProvider: Send + Sync {
    /// Provider name for logs
    fn name(&self) -> &'static str;

    /// Synthesize `text`, returning the encoded audio and its MIME type
    async fn synthesize(&self, text: &str) -> Result<(Vec<u8>, String), ProviderError>;
}

#[derive(Debug, Serialize)]
struct SpeechRequest<'a> {
    text: &'a str,
    model_id: &'a str,
    voice_settings: VoiceSettings,
}

#[derive(Debug, Serialize)]
struct VoiceSettings {
    stability: f32,
    similarity_boost: f32,
}

/// ElevenLabs API client
pub struct ElevenLabsClient {
    http_client: reqwest::Client,
    base_url: String,
    api_key: String,
    voice_id: String,
}

impl ElevenLabsClient {
    pub fn new(api_key: String, base_url: String, timeout: Duration) -> Result<Self, ProviderError> {
        Ok(Self {
            http_client: build_http_client(timeout)?,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
            voice_id: DEFAULT_VOICE_ID.to_string(),
        })
    }

    fn speech_url(&self) -> String {
        format!("{}/v1/text-to-speech/{}", self.base_url, self.voice_id)
    }
}

#[async_trait]
impl SpeechProvider for ElevenLabsClient {
    fn name(&self) -> &'static str {
        "ElevenLabs"
    }

    async fn synthesize(&self, text: &str) -> Result<(Vec<u8>, String), ProviderError> {
        let body = SpeechRequest {
            text,
            model_id: MODEL_ID,
            voice_settings: VoiceSettings {
                stability: STABILITY,
                similarity_boost: SIMILARITY_BOOST,
            },
        };

        tracing::debug!(chars = text.len(), voice = %self.voice_id, "Requesting ElevenLabs speech");

        let response = self
            .http_client
            .post(self.speech_url())
            .header(reqwest::header::ACCEPT, "audio/mpeg")
            .header("xi-api-key", &self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| ProviderError::NetworkError(e.to_string()))?;

        if !response.status().is_success() {
            return Err(error_for_status(response).await);
        }

        let mime = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|v| v.split(';').next().unwrap_or(v).trim().to_string())
            .unwrap_or_else(|| "audio/mpeg".to_string());

        let bytes = response
            .bytes()
            .await
            .map_err(|e| ProviderError::NetworkError(e.to_string()))?;

        if bytes.is_empty() {
            return Err(ProviderError::ParseError("empty audio body".to_string()));
        }

        tracing::info!(bytes = bytes.len(), mime = %mime, "ElevenLabs speech synthesized");
        Ok((bytes.to_vec(), mime))
    }
}
