//! Progress sinks
//!
//! The orchestrator only knows [`ProgressSink`]; transport framing lives in
//! `reel_common::sse`.

use async_trait::async_trait;
use reel_common::ProgressEvent;
use tokio::sync::mpsc;
use tracing::{debug, warn};

/// Destination for a run's progress events
#[async_trait]
pub trait ProgressSink: Send {
    async fn emit(&mut self, event: ProgressEvent);
}

/// Forwards events into a channel feeding the SSE response
///
/// A dropped receiver (client disconnected) is logged once; the run keeps
/// going and later events are discarded.
pub struct ChannelSink {
    tx: mpsc::Sender<ProgressEvent>,
    disconnected: bool,
}

impl ChannelSink {
    pub fn new(tx: mpsc::Sender<ProgressEvent>) -> Self {
        Self {
            tx,
            disconnected: false,
        }
    }
}

#[async_trait]
impl ProgressSink for ChannelSink {
    async fn emit(&mut self, event: ProgressEvent) {
        if self.tx.send(event).await.is_err() && !self.disconnected {
            debug!("Progress receiver dropped, discarding remaining events");
            self.disconnected = true;
        }
    }
}

/// Keeps every event in memory
#[derive(Debug, Default)]
pub struct CollectingSink {
    pub events: Vec<ProgressEvent>,
}

#[async_trait]
impl ProgressSink for CollectingSink {
    async fn emit(&mut self, event: ProgressEvent) {
        self.events.push(event);
    }
}

/// Enforces the run protocol on top of a sink: at most one terminal event,
/// nothing after it
pub struct RunEmitter<'a> {
    sink: &'a mut dyn ProgressSink,
    terminated: bool,
}

impl<'a> RunEmitter<'a> {
    pub fn new(sink: &'a mut dyn ProgressSink) -> Self {
        Self {
            sink,
            terminated: false,
        }
    }

    pub fn is_terminated(&self) -> bool {
        self.terminated
    }

    pub async fn progress(&mut self, message: &str) {
        if self.terminated {
            warn!(dropped = message, "Dropping progress event emitted after terminal event");
            return;
        }
        self.sink.emit(ProgressEvent::progress(message)).await;
    }

    /// Emit the terminal event. Non-terminal events are rejected.
    pub async fn finish(&mut self, event: ProgressEvent) {
        if !event.is_terminal() {
            warn!(event_type = event.event_type(), "finish() called with non-terminal event, ignoring");
            return;
        }
        if self.terminated {
            warn!(event_type = event.event_type(), "Dropping second terminal event");
            return;
        }
        self.terminated = true;
        self.sink.emit(event).await;
    }
}
