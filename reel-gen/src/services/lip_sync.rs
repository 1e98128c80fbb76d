//! Lip-sync stage
//!
//! Stub: waits a fixed delay and returns the video unchanged. The audio
//! reference is accepted so a real lip-sync integration can slot in
//! without changing the pipeline.

use crate::models::MediaReference;
use std::time::Duration;

pub struct LipSyncStage {
    delay: Duration,
}

impl LipSyncStage {
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }

    pub async fn apply(&self, video: &MediaReference, _audio: &MediaReference) -> MediaReference {
        tokio::time::sleep(self.delay).await;
        tracing::debug!("Lip-sync stub passed video through");
        video.clone()
    }
}
