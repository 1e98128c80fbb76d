//! Progress event types streamed to generation clients
//!
//! A generation run emits any number of [`ProgressEvent::Progress`] events
//! followed by exactly one terminal event ([`ProgressEvent::Error`] or
//! [`ProgressEvent::Complete`]).
//!
//! The wire shapes carry no tag; clients inspect which fields are present:
//!
//! ```json
//! { "progress": "🎬 Creating viral script..." }
//! { "error": "Failed to generate video" }
//! { "videoUrl": "https://...", "progress": "Complete!" }
//! ```

use serde::{Deserialize, Serialize};

/// Progress text carried by the completion event
pub const COMPLETE_PROGRESS: &str = "Complete!";

/// Fallback message when a failure carries no text of its own
pub const GENERIC_FAILURE_MESSAGE: &str = "Failed to generate video";

/// One event of a generation run's progress stream
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ProgressEvent {
    /// Run finished; carries the final video reference (terminal)
    Complete {
        #[serde(rename = "videoUrl")]
        video_url: String,
        progress: String,
    },

    /// Run aborted (terminal)
    Error { error: String },

    /// Human-readable status update
    Progress { progress: String },
}

impl ProgressEvent {
    pub fn progress(message: impl Into<String>) -> Self {
        ProgressEvent::Progress {
            progress: message.into(),
        }
    }

    /// Error event; an empty message is replaced with [`GENERIC_FAILURE_MESSAGE`]
    pub fn error(message: impl Into<String>) -> Self {
        let message = message.into();
        let error = if message.trim().is_empty() {
            GENERIC_FAILURE_MESSAGE.to_string()
        } else {
            message
        };
        ProgressEvent::Error { error }
    }

    pub fn complete(video_url: impl Into<String>) -> Self {
        ProgressEvent::Complete {
            video_url: video_url.into(),
            progress: COMPLETE_PROGRESS.to_string(),
        }
    }

    /// True for events that end a run
    pub fn is_terminal(&self) -> bool {
        !matches!(self, ProgressEvent::Progress { .. })
    }

    /// Short event name for logging
    pub fn event_type(&self) -> &'static str {
        match self {
            ProgressEvent::Complete { .. } => "complete",
            ProgressEvent::Error { .. } => "error",
            ProgressEvent::Progress { .. } => "progress",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_progress_wire_shape() {
        let value = serde_json::to_value(ProgressEvent::progress("working")).unwrap();
        assert_eq!(value, json!({ "progress": "working" }));
    }

    #[test]
    fn test_complete_wire_shape() {
        let value = serde_json::to_value(ProgressEvent::complete("https://example.com/v.mp4")).unwrap();
        assert_eq!(
            value,
            json!({ "videoUrl": "https://example.com/v.mp4", "progress": "Complete!" })
        );
    }

    #[test]
    fn test_error_falls_back_to_generic_message() {
        assert_eq!(
            ProgressEvent::error("  "),
            ProgressEvent::Error {
                error: GENERIC_FAILURE_MESSAGE.to_string()
            }
        );
        assert_eq!(
            ProgressEvent::error("boom"),
            ProgressEvent::Error {
                error: "boom".to_string()
            }
        );
    }

    #[test]
    fn test_terminal_classification() {
        assert!(!ProgressEvent::progress("x").is_terminal());
        assert!(ProgressEvent::error("x").is_terminal());
        assert!(ProgressEvent::complete("x").is_terminal());
    }

    #[test]
    fn test_untagged_deserialize_prefers_complete() {
        let event: ProgressEvent =
            serde_json::from_str(r#"{"videoUrl":"u","progress":"Complete!"}"#).unwrap();
        assert_eq!(event, ProgressEvent::complete("u"));

        let event: ProgressEvent = serde_json::from_str(r#"{"progress":"p"}"#).unwrap();
        assert_eq!(event, ProgressEvent::progress("p"));
    }
}
