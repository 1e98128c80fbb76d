//! Caption stage
//!
//! Known stub: waits a fixed delay and returns the public demo clip
//! ([`DEMO_VIDEO_URL`]) whatever video it receives. With `pass_through`
//! enabled the incoming video is returned instead, which is the behaviour a
//! real captioning integration must keep.

use crate::models::{MediaReference, Script, DEMO_VIDEO_URL};
use std::time::Duration;

pub struct CaptionStage {
    delay: Duration,
    pass_through: bool,
}

impl CaptionStage {
    pub fn new(delay: Duration, pass_through: bool) -> Self {
        Self {
            delay,
            pass_through,
        }
    }

    pub async fn apply(&self, video: &MediaReference, _script: &Script) -> MediaReference {
        tokio::time::sleep(self.delay).await;

        if self.pass_through {
            tracing::debug!("Caption stub passed video through");
            video.clone()
        } else {
            tracing::debug!(input = %video, "Caption stub replaced video with demo clip");
            MediaReference::new(DEMO_VIDEO_URL)
        }
    }
}
