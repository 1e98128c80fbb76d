//! Server-Sent Events (SSE) utilities
//!
//! Frames a run's [`ProgressEvent`]s as `data: <json>\n\n` lines and parses
//! them back on the client side.

use crate::events::ProgressEvent;
use axum::response::sse::{Event, KeepAlive, Sse};
use futures::stream::Stream;
use std::convert::Infallible;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{debug, warn};

/// Interval between `: heartbeat` comments while a stage is running
pub const HEARTBEAT_INTERVAL: Duration = Duration::from_secs(15);

/// Turn the receiving end of a run's event channel into an SSE response
///
/// Events are forwarded in order. The stream ends after the first terminal
/// event, or when the sender side is dropped.
///
/// # Example
/// ```rust,ignore
/// let (tx, rx) = tokio::sync::mpsc::channel(16);
/// tokio::spawn(async move { pipeline.run(topic, &mut ChannelSink::new(tx)).await });
/// reel_common::sse::progress_event_stream(rx)
/// ```
pub fn progress_event_stream(
    mut rx: mpsc::Receiver<ProgressEvent>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let stream = async_stream::stream! {
        while let Some(event) = rx.recv().await {
            let terminal = event.is_terminal();

            match serde_json::to_string(&event) {
                Ok(event_json) => {
                    debug!("SSE: Forwarding {} event", event.event_type());
                    yield Ok(Event::default().data(event_json));
                }
                Err(e) => {
                    warn!("SSE: Failed to serialize {} event: {}", event.event_type(), e);
                }
            }

            if terminal {
                debug!("SSE: Terminal event sent, closing stream");
                break;
            }
        }
    };

    Sse::new(stream).keep_alive(
        KeepAlive::new()
            .interval(HEARTBEAT_INTERVAL)
            .text("heartbeat"),
    )
}

/// Parse every `data: <json>` line of an SSE body into events
///
/// Comment lines, blank lines and payloads that are not progress events are
/// skipped, the same way the browser client treats them.
pub fn parse_data_lines(body: &str) -> Vec<ProgressEvent> {
    body.lines()
        .filter_map(|line| line.strip_prefix("data:"))
        .map(str::trim_start)
        .filter_map(|payload| serde_json::from_str(payload).ok())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_data_lines_skips_comments() {
        let body = "data: {\"progress\":\"a\"}\n\n: heartbeat\n\ndata: {\"error\":\"b\"}\n\n";
        let events = parse_data_lines(body);
        assert_eq!(
            events,
            vec![ProgressEvent::progress("a"), ProgressEvent::error("b")]
        );
    }

    #[test]
    fn test_parse_data_lines_ignores_garbage() {
        assert!(parse_data_lines("data: not json\n\nevent: x\n").is_empty());
    }
}
