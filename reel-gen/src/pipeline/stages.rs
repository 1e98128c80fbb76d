//! Stage seam between the orchestrator and the concrete services

use crate::config::GeneratorConfig;
use crate::models::{MediaReference, Script, Topic};
use crate::services::{
    CaptionStage, ElevenLabsClient, KlingClient, LipSyncStage, ScriptComposer, SpeechProvider,
    VideoProvider, VideoSynthesizer, VoiceSynthesizer,
};
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;
use tracing::{error, info};

/// Failure that aborts a run
///
/// The display text is what the client sees in the terminal error event.
#[derive(Debug, Error)]
pub enum StageError {
    #[error("{0}")]
    Failed(String),
}

/// The five generation stages, in pipeline order
#[async_trait]
pub trait GenerationStages: Send + Sync {
    async fn compose_script(&self, topic: &Topic) -> Result<Script, StageError>;

    async fn synthesize_voice(&self, script: &Script) -> Result<MediaReference, StageError>;

    async fn synthesize_video(
        &self,
        topic: &Topic,
        script: &Script,
    ) -> Result<MediaReference, StageError>;

    async fn lip_sync(
        &self,
        video: &MediaReference,
        audio: &MediaReference,
    ) -> Result<MediaReference, StageError>;

    async fn add_captions(
        &self,
        video: &MediaReference,
        script: &Script,
    ) -> Result<MediaReference, StageError>;
}

/// Production stages backed by the real services
pub struct LiveStages {
    pub composer: ScriptComposer,
    pub voice: VoiceSynthesizer,
    pub video: VideoSynthesizer,
    pub lip_sync: LipSyncStage,
    pub captions: CaptionStage,
}

impl LiveStages {
    /// Build stages from resolved configuration
    ///
    /// Providers without a credential, or whose client cannot be built, run
    /// in placeholder mode.
    pub fn from_config(config: &GeneratorConfig) -> Self {
        let speech: Option<Arc<dyn SpeechProvider>> =
            config.elevenlabs.api_key.as_ref().and_then(|key| {
                match ElevenLabsClient::new(
                    key.clone(),
                    config.elevenlabs.base_url.clone(),
                    config.elevenlabs.request_timeout,
                ) {
                    Ok(client) => {
                        info!("ElevenLabs client initialized");
                        Some(Arc::new(client) as Arc<dyn SpeechProvider>)
                    }
                    Err(e) => {
                        error!("Failed to initialize ElevenLabs client: {}", e);
                        None
                    }
                }
            });

        let video: Option<Arc<dyn VideoProvider>> =
            config.kling.api_key.as_ref().and_then(|key| {
                match KlingClient::new(
                    key.clone(),
                    config.kling.base_url.clone(),
                    config.kling.request_timeout,
                ) {
                    Ok(client) => {
                        info!("Kling client initialized");
                        Some(Arc::new(client) as Arc<dyn VideoProvider>)
                    }
                    Err(e) => {
                        error!("Failed to initialize Kling client: {}", e);
                        None
                    }
                }
            });

        Self {
            composer: ScriptComposer::default(),
            voice: VoiceSynthesizer::new(speech),
            video: VideoSynthesizer::new(video, config.poll_policy),
            lip_sync: LipSyncStage::new(config.timing.lip_sync_delay),
            captions: CaptionStage::new(config.timing.caption_delay, config.caption_pass_through),
        }
    }
}

#[async_trait]
impl GenerationStages for LiveStages {
    async fn compose_script(&self, topic: &Topic) -> Result<Script, StageError> {
        Ok(self.composer.compose(topic))
    }

    async fn synthesize_voice(&self, script: &Script) -> Result<MediaReference, StageError> {
        Ok(self.voice.synthesize(script).await)
    }

    async fn synthesize_video(
        &self,
        topic: &Topic,
        script: &Script,
    ) -> Result<MediaReference, StageError> {
        Ok(self.video.synthesize(topic, script).await)
    }

    async fn lip_sync(
        &self,
        video: &MediaReference,
        audio: &MediaReference,
    ) -> Result<MediaReference, StageError> {
        Ok(self.lip_sync.apply(video, audio).await)
    }

    async fn add_captions(
        &self,
        video: &MediaReference,
        script: &Script,
    ) -> Result<MediaReference, StageError> {
        Ok(self.captions.apply(video, script).await)
    }
}
