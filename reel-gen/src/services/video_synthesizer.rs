//! Video synthesis stage
//!
//! Submits one text-to-video task and polls its status under a bounded
//! [`PollPolicy`]. The worst-case wait is `max_attempts * interval` no matter
//! how slow the provider is; once that budget is spent the run commits to
//! the placeholder and never resumes the task.

use super::kling_client::{TaskStatus, VideoProvider, VideoRequest};
use super::ProviderError;
use crate::models::{MediaReference, Script, Topic};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Bounded status polling: sleep `interval`, query, repeat up to `max_attempts` times
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollPolicy {
    pub max_attempts: u32,
    pub interval: Duration,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 30,
            interval: Duration::from_secs(2),
        }
    }
}

impl PollPolicy {
    /// Upper bound on time spent polling, saturating at `Duration::MAX`
    pub fn budget(&self) -> Duration {
        self.interval
            .checked_mul(self.max_attempts)
            .unwrap_or(Duration::MAX)
    }
}

/// Build the cinematic prompt sent to the video provider
pub fn video_prompt(topic: &Topic) -> String {
    format!(
        "Cinematic 4K video: {}. Vibrant colors, dynamic motion, professional lighting, eye-catching visuals, trending style, high energy",
        topic
    )
}

pub struct VideoSynthesizer {
    provider: Option<Arc<dyn VideoProvider>>,
    policy: PollPolicy,
}

impl VideoSynthesizer {
    pub fn new(provider: Option<Arc<dyn VideoProvider>>, policy: PollPolicy) -> Self {
        Self { provider, policy }
    }

    /// Synthesizer that always returns the placeholder
    pub fn placeholder_only() -> Self {
        Self::new(None, PollPolicy::default())
    }

    pub fn is_live(&self) -> bool {
        self.provider.is_some()
    }

    pub fn policy(&self) -> PollPolicy {
        self.policy
    }

    /// Generate a clip for `topic`; never fails
    ///
    /// The script is not sent to the provider; narration is carried by the
    /// voice track.
    pub async fn synthesize(&self, topic: &Topic, _script: &Script) -> MediaReference {
        let Some(provider) = &self.provider else {
            info!("Video provider not configured, using placeholder video");
            return MediaReference::placeholder_video();
        };

        match self.generate(provider.as_ref(), topic).await {
            Ok(Some(video)) => video,
            Ok(None) => MediaReference::placeholder_video(),
            Err(e) => {
                warn!(provider = provider.name(), "Video generation failed, using placeholder video: {}", e);
                MediaReference::placeholder_video()
            }
        }
    }

    /// Submit and poll. `Ok(None)` means the task did not yield a usable video.
    async fn generate(
        &self,
        provider: &dyn VideoProvider,
        topic: &Topic,
    ) -> Result<Option<MediaReference>, ProviderError> {
        let request = VideoRequest::vertical_short(video_prompt(topic));
        let task_id = provider.submit(&request).await?;

        for attempt in 1..=self.policy.max_attempts {
            tokio::time::sleep(self.policy.interval).await;

            match provider.status(&task_id).await? {
                TaskStatus::Completed {
                    video_url: Some(url),
                } => {
                    info!(task_id = %task_id, attempt, "Video task completed");
                    return Ok(Some(MediaReference::new(url)));
                }
                TaskStatus::Completed { video_url: None } => {
                    warn!(task_id = %task_id, attempt, "Video task completed without a video URL, using placeholder video");
                    return Ok(None);
                }
                TaskStatus::Failed => {
                    warn!(task_id = %task_id, attempt, "Video task failed, using placeholder video");
                    return Ok(None);
                }
                TaskStatus::Pending(state) => {
                    debug!(task_id = %task_id, attempt, state = %state, "Video task pending");
                }
            }
        }

        warn!(
            task_id = %task_id,
            attempts = self.policy.max_attempts,
            budget = ?self.policy.budget(),
            "Video task poll budget exhausted, using placeholder video"
        );
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::{FixedHookSelector, ScriptComposer};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    /// Scripted provider: reports `completed` on query number `complete_on`
    struct ScriptedProvider {
        submit_fails: bool,
        complete_on: Option<usize>,
        fail_on: Option<usize>,
        status_errors: bool,
        submits: AtomicUsize,
        queries: AtomicUsize,
        last_request: Mutex<Option<VideoRequest>>,
    }

    impl ScriptedProvider {
        fn completing_on(n: usize) -> Self {
            Self {
                submit_fails: false,
                complete_on: Some(n),
                fail_on: None,
                status_errors: false,
                submits: AtomicUsize::new(0),
                queries: AtomicUsize::new(0),
                last_request: Mutex::new(None),
            }
        }

        fn never_completing() -> Self {
            Self {
                complete_on: None,
                ..Self::completing_on(0)
            }
        }
    }

    #[async_trait]
    impl VideoProvider for ScriptedProvider {
        fn name(&self) -> &'static str {
            "Scripted"
        }

        async fn submit(&self, request: &VideoRequest) -> Result<String, ProviderError> {
            self.submits.fetch_add(1, Ordering::SeqCst);
            *self.last_request.lock().unwrap() = Some(request.clone());
            if self.submit_fails {
                return Err(ProviderError::ApiError(503, "busy".to_string()));
            }
            Ok("task-1".to_string())
        }

        async fn status(&self, task_id: &str) -> Result<TaskStatus, ProviderError> {
            assert_eq!(task_id, "task-1");
            let n = self.queries.fetch_add(1, Ordering::SeqCst) + 1;
            if self.status_errors {
                return Err(ProviderError::NetworkError("reset".to_string()));
            }
            if self.fail_on == Some(n) {
                return Ok(TaskStatus::Failed);
            }
            if self.complete_on == Some(n) {
                return Ok(TaskStatus::Completed {
                    video_url: Some("https://cdn.example/clip.mp4".to_string()),
                });
            }
            Ok(TaskStatus::Pending("processing".to_string()))
        }
    }

    fn fast_policy(max_attempts: u32) -> PollPolicy {
        PollPolicy {
            max_attempts,
            interval: Duration::ZERO,
        }
    }

    fn inputs() -> (Topic, Script) {
        let topic = Topic::parse("Best productivity app").unwrap();
        let script = ScriptComposer::new(Box::new(FixedHookSelector(0))).compose(&topic);
        (topic, script)
    }

    #[test]
    fn test_default_policy_budget() {
        let policy = PollPolicy::default();
        assert_eq!(policy.max_attempts, 30);
        assert_eq!(policy.interval, Duration::from_secs(2));
        assert_eq!(policy.budget(), Duration::from_secs(60));
    }

    #[test]
    fn test_budget_saturates_on_extreme_interval() {
        let policy = PollPolicy {
            max_attempts: 30,
            interval: Duration::from_millis(u64::MAX),
        };
        assert_eq!(policy.budget(), Duration::MAX);
    }

    #[test]
    fn test_video_prompt() {
        let (topic, _) = inputs();
        assert_eq!(
            video_prompt(&topic),
            "Cinematic 4K video: Best productivity app. Vibrant colors, dynamic motion, \
             professional lighting, eye-catching visuals, trending style, high energy"
        );
    }

    #[tokio::test]
    async fn test_no_credential_returns_placeholder() {
        let (topic, script) = inputs();
        let synth = VideoSynthesizer::placeholder_only();
        assert!(!synth.is_live());
        assert_eq!(
            synth.synthesize(&topic, &script).await,
            MediaReference::placeholder_video()
        );
    }

    #[tokio::test]
    async fn test_stops_on_first_completed_status() {
        let (topic, script) = inputs();
        let provider = Arc::new(ScriptedProvider::completing_on(3));
        let synth = VideoSynthesizer::new(Some(provider.clone()), fast_policy(30));

        let video = synth.synthesize(&topic, &script).await;

        assert_eq!(video.as_str(), "https://cdn.example/clip.mp4");
        assert_eq!(provider.submits.load(Ordering::SeqCst), 1);
        assert_eq!(provider.queries.load(Ordering::SeqCst), 3);

        let request = provider.last_request.lock().unwrap().clone().unwrap();
        assert_eq!(request, VideoRequest::vertical_short(video_prompt(&topic)));
    }

    #[tokio::test]
    async fn test_exhausted_budget_falls_back_after_max_attempts() {
        let (topic, script) = inputs();
        let provider = Arc::new(ScriptedProvider::never_completing());
        let synth = VideoSynthesizer::new(Some(provider.clone()), fast_policy(30));

        let video = synth.synthesize(&topic, &script).await;

        assert_eq!(video, MediaReference::placeholder_video());
        assert_eq!(provider.queries.load(Ordering::SeqCst), 30);
    }

    #[tokio::test]
    async fn test_completion_after_budget_is_not_observed() {
        let (topic, script) = inputs();
        let provider = Arc::new(ScriptedProvider::completing_on(6));
        let synth = VideoSynthesizer::new(Some(provider.clone()), fast_policy(5));

        let video = synth.synthesize(&topic, &script).await;

        assert_eq!(video, MediaReference::placeholder_video());
        assert_eq!(provider.queries.load(Ordering::SeqCst), 5);
    }

    #[tokio::test]
    async fn test_failed_task_stops_polling() {
        let (topic, script) = inputs();
        let provider = Arc::new(ScriptedProvider {
            fail_on: Some(2),
            ..ScriptedProvider::never_completing()
        });
        let synth = VideoSynthesizer::new(Some(provider.clone()), fast_policy(30));

        let video = synth.synthesize(&topic, &script).await;

        assert_eq!(video, MediaReference::placeholder_video());
        assert_eq!(provider.queries.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_submit_failure_skips_polling() {
        let (topic, script) = inputs();
        let provider = Arc::new(ScriptedProvider {
            submit_fails: true,
            ..ScriptedProvider::completing_on(1)
        });
        let synth = VideoSynthesizer::new(Some(provider.clone()), fast_policy(30));

        let video = synth.synthesize(&topic, &script).await;

        assert_eq!(video, MediaReference::placeholder_video());
        assert_eq!(provider.queries.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_status_error_falls_back() {
        let (topic, script) = inputs();
        let provider = Arc::new(ScriptedProvider {
            status_errors: true,
            ..ScriptedProvider::completing_on(3)
        });
        let synth = VideoSynthesizer::new(Some(provider.clone()), fast_policy(30));

        let video = synth.synthesize(&topic, &script).await;

        assert_eq!(video, MediaReference::placeholder_video());
        assert_eq!(provider.queries.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_poll_interval_is_honoured() {
        let (topic, script) = inputs();
        let provider = Arc::new(ScriptedProvider::completing_on(2));
        let policy = PollPolicy {
            max_attempts: 5,
            interval: Duration::from_millis(20),
        };
        let synth = VideoSynthesizer::new(Some(provider), policy);

        let start = std::time::Instant::now();
        synth.synthesize(&topic, &script).await;

        // Two sleeps precede the completing query
        assert!(start.elapsed() >= Duration::from_millis(40));
    }
}
