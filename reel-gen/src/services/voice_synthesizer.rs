//! Voice synthesis stage
//!
//! Without a configured provider this stage is a deliberate demo mode and
//! returns [`PLACEHOLDER_AUDIO`](crate::models::PLACEHOLDER_AUDIO) without
//! touching the network. Provider failures degrade to the same placeholder
//! and are never surfaced to the client.

use super::elevenlabs_client::SpeechProvider;
use crate::models::{MediaReference, Script};
use base64::Engine as _;
use std::sync::Arc;
use tracing::{info, warn};

pub struct VoiceSynthesizer {
    provider: Option<Arc<dyn SpeechProvider>>,
}

impl VoiceSynthesizer {
    pub fn new(provider: Option<Arc<dyn SpeechProvider>>) -> Self {
        Self { provider }
    }

    /// Synthesizer that always returns the placeholder
    pub fn placeholder_only() -> Self {
        Self { provider: None }
    }

    pub fn is_live(&self) -> bool {
        self.provider.is_some()
    }

    /// One attempt at synthesis; never fails
    pub async fn synthesize(&self, script: &Script) -> MediaReference {
        let Some(provider) = &self.provider else {
            info!("Speech provider not configured, using placeholder audio");
            return MediaReference::placeholder_audio();
        };

        match provider.synthesize(script.as_str()).await {
            Ok((audio, mime)) => {
                let encoded = base64::engine::general_purpose::STANDARD.encode(&audio);
                MediaReference::new(format!("data:{};base64,{}", mime, encoded))
            }
            Err(e) => {
                warn!(provider = provider.name(), "Speech synthesis failed, using placeholder audio: {}", e);
                MediaReference::placeholder_audio()
            }
        }
    }
}
