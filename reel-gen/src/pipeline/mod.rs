//! Generation pipeline orchestrator
//!
//! # Step Progression
//! COMPOSE_SCRIPT → SYNTHESIZE_VOICE → SYNTHESIZE_VIDEO → LIP_SYNC → CAPTIONS → FINALIZE
//!
//! Each step emits its progress message immediately before it runs, then
//! pauses for its pacing delay. Steps never run concurrently and never
//! branch. A stage error skips every remaining step and ends the run with a
//! single error event; otherwise the run ends with the completion event.

pub mod sink;
pub mod stages;

pub use sink::{ChannelSink, CollectingSink, ProgressSink, RunEmitter};
pub use stages::{GenerationStages, LiveStages, StageError};

use crate::models::{MediaReference, Topic};
use reel_common::events::{ProgressEvent, GENERIC_FAILURE_MESSAGE};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{error, info, info_span, Instrument};
use uuid::Uuid;

/// Buffered events per run before the orchestrator waits on the client
pub const EVENT_CHANNEL_CAPACITY: usize = 16;

/// Pipeline steps, in execution order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineStep {
    ComposeScript,
    SynthesizeVoice,
    SynthesizeVideo,
    LipSync,
    Captions,
    Finalize,
}

impl PipelineStep {
    pub const ALL: [PipelineStep; 6] = [
        PipelineStep::ComposeScript,
        PipelineStep::SynthesizeVoice,
        PipelineStep::SynthesizeVideo,
        PipelineStep::LipSync,
        PipelineStep::Captions,
        PipelineStep::Finalize,
    ];

    /// Progress text shown to the client before the step runs
    pub fn message(self) -> &'static str {
        match self {
            PipelineStep::ComposeScript => "🎬 Creating viral script...",
            PipelineStep::SynthesizeVoice => "🎤 Generating AI voice with ElevenLabs...",
            PipelineStep::SynthesizeVideo => "🎨 Creating stunning visuals with Kling AI...",
            PipelineStep::LipSync => "💋 Syncing lips with audio...",
            PipelineStep::Captions => "✨ Adding dynamic captions...",
            PipelineStep::Finalize => "🎉 Rendering final video...",
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            PipelineStep::ComposeScript => "COMPOSE_SCRIPT",
            PipelineStep::SynthesizeVoice => "SYNTHESIZE_VOICE",
            PipelineStep::SynthesizeVideo => "SYNTHESIZE_VIDEO",
            PipelineStep::LipSync => "LIP_SYNC",
            PipelineStep::Captions => "CAPTIONS",
            PipelineStep::Finalize => "FINALIZE",
        }
    }

    fn index(self) -> usize {
        self as usize
    }
}

/// Fixed delays of a run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageTiming {
    /// Pause after each step, indexed by [`PipelineStep`] order
    pub pacing: [Duration; 6],
    pub lip_sync_delay: Duration,
    pub caption_delay: Duration,
}

impl Default for StageTiming {
    fn default() -> Self {
        Self {
            pacing: [1000, 1500, 2000, 1500, 1500, 1000].map(Duration::from_millis),
            lip_sync_delay: Duration::from_millis(1000),
            caption_delay: Duration::from_millis(1000),
        }
    }
}

impl StageTiming {
    /// No delays at all
    pub fn immediate() -> Self {
        Self {
            pacing: [Duration::ZERO; 6],
            lip_sync_delay: Duration::ZERO,
            caption_delay: Duration::ZERO,
        }
    }

    pub fn pacing_for(&self, step: PipelineStep) -> Duration {
        self.pacing[step.index()]
    }
}

/// How a run ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    Completed(MediaReference),
    Failed(String),
}

pub struct Pipeline {
    stages: Arc<dyn GenerationStages>,
    timing: StageTiming,
}

impl Pipeline {
    pub fn new(stages: Arc<dyn GenerationStages>, timing: StageTiming) -> Self {
        Self { stages, timing }
    }

    /// Execute one run, writing its events to `sink`
    ///
    /// Always emits exactly one terminal event.
    pub async fn run(&self, topic: &Topic, sink: &mut dyn ProgressSink) -> RunOutcome {
        let run_id = Uuid::new_v4();
        let span = info_span!("generation", %run_id);

        async move {
            info!(topic = %topic, "Generation run started");
            let mut emitter = RunEmitter::new(sink);

            match self.execute(topic, &mut emitter).await {
                Ok(video) => {
                    info!(video = %video, "Generation run completed");
                    emitter
                        .finish(ProgressEvent::complete(video.as_str()))
                        .await;
                    RunOutcome::Completed(video)
                }
                Err(e) => {
                    error!("Generation error: {}", e);
                    let event = ProgressEvent::error(e.to_string());
                    let message = match &event {
                        ProgressEvent::Error { error } => error.clone(),
                        _ => GENERIC_FAILURE_MESSAGE.to_string(),
                    };
                    emitter.finish(event).await;
                    RunOutcome::Failed(message)
                }
            }
        }
        .instrument(span)
        .await
    }

    /// Run the pipeline on its own task, returning the event stream
    ///
    /// If the run task dies without reaching its terminal event, a generic
    /// error event is sent in its place.
    pub fn spawn(self: Arc<Self>, topic: Topic) -> mpsc::Receiver<ProgressEvent> {
        let (tx, rx) = mpsc::channel(EVENT_CHANNEL_CAPACITY);
        let run_tx = tx.clone();

        tokio::spawn(async move {
            let run = tokio::spawn(async move {
                let mut sink = ChannelSink::new(run_tx);
                self.run(&topic, &mut sink).await
            });

            if let Err(e) = run.await {
                error!("Generation task aborted: {}", e);
                let mut sink = ChannelSink::new(tx);
                sink.emit(ProgressEvent::error(GENERIC_FAILURE_MESSAGE)).await;
            }
        });

        rx
    }

    async fn execute(
        &self,
        topic: &Topic,
        emitter: &mut RunEmitter<'_>,
    ) -> Result<MediaReference, StageError> {
        self.begin(emitter, PipelineStep::ComposeScript).await;
        let script = self.stages.compose_script(topic).await?;
        self.pace(PipelineStep::ComposeScript).await;

        self.begin(emitter, PipelineStep::SynthesizeVoice).await;
        let audio = self.stages.synthesize_voice(&script).await?;
        self.pace(PipelineStep::SynthesizeVoice).await;

        self.begin(emitter, PipelineStep::SynthesizeVideo).await;
        let video = self.stages.synthesize_video(topic, &script).await?;
        self.pace(PipelineStep::SynthesizeVideo).await;

        self.begin(emitter, PipelineStep::LipSync).await;
        let synced = self.stages.lip_sync(&video, &audio).await?;
        self.pace(PipelineStep::LipSync).await;

        self.begin(emitter, PipelineStep::Captions).await;
        let captioned = self.stages.add_captions(&synced, &script).await?;
        self.pace(PipelineStep::Captions).await;

        self.begin(emitter, PipelineStep::Finalize).await;
        self.pace(PipelineStep::Finalize).await;

        Ok(captioned)
    }

    async fn begin(&self, emitter: &mut RunEmitter<'_>, step: PipelineStep) {
        tracing::debug!(step = step.name(), "Entering step");
        emitter.progress(step.message()).await;
    }

    async fn pace(&self, step: PipelineStep) {
        let pause = self.timing.pacing_for(step);
        if !pause.is_zero() {
            tokio::time::sleep(pause).await;
        }
    }
}
