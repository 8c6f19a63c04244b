//! Translator events and delivery sinks
//!
//! Events are the observability surface of the translator: session
//! boundaries, accepted signs, separators, soft failures and drops. They are
//! delivered through an [`EventSink`]; a failing sink never affects
//! stabilizer state.

use std::io::Write;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

/// Events emitted by the translator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TranslatorEvent {
    /// Capture started
    SessionStarted {
        ts: DateTime<Utc>,
        epoch: u64,
    },

    /// Capture stopped
    SessionEnded {
        ts: DateTime<Utc>,
        epoch: u64,
        /// Archived text, if the buffer was non-empty
        #[serde(skip_serializing_if = "Option::is_none")]
        text: Option<String>,
    },

    /// Label appended to the buffer
    SignAccepted {
        ts: DateTime<Utc>,
        epoch: u64,
        label: String,
        confidence: f32,
    },

    /// Idle separator inserted
    SeparatorInserted {
        ts: DateTime<Utc>,
        epoch: u64,
    },

    /// Classification request failed; the frame was dropped
    ClassificationFailed {
        ts: DateTime<Utc>,
        epoch: u64,
        error: String,
    },

    /// Response from an earlier session discarded
    StaleResponseDropped {
        ts: DateTime<Utc>,
        origin_epoch: u64,
        current_epoch: u64,
    },

    /// Landmark vector rejected at the pipeline boundary
    MalformedFrame {
        ts: DateTime<Utc>,
        error: String,
    },

    /// Text-to-sign submission completed
    TextToSignCompleted {
        ts: DateTime<Utc>,
        text: String,
        display: String,
    },

    /// History log emptied
    HistoryCleared {
        ts: DateTime<Utc>,
    },
}

impl TranslatorEvent {
    pub fn session_started(epoch: u64) -> Self {
        Self::SessionStarted {
            ts: Utc::now(),
            epoch,
        }
    }

    pub fn session_ended(epoch: u64, text: Option<String>) -> Self {
        Self::SessionEnded {
            ts: Utc::now(),
            epoch,
            text,
        }
    }

    pub fn sign_accepted(epoch: u64, label: String, confidence: f32) -> Self {
        Self::SignAccepted {
            ts: Utc::now(),
            epoch,
            label,
            confidence,
        }
    }

    pub fn separator_inserted(epoch: u64) -> Self {
        Self::SeparatorInserted {
            ts: Utc::now(),
            epoch,
        }
    }

    pub fn classification_failed(epoch: u64, error: String) -> Self {
        Self::ClassificationFailed {
            ts: Utc::now(),
            epoch,
            error,
        }
    }

    pub fn stale_response_dropped(origin_epoch: u64, current_epoch: u64) -> Self {
        Self::StaleResponseDropped {
            ts: Utc::now(),
            origin_epoch,
            current_epoch,
        }
    }

    pub fn malformed_frame(error: String) -> Self {
        Self::MalformedFrame {
            ts: Utc::now(),
            error,
        }
    }

    pub fn text_to_sign_completed(text: String, display: String) -> Self {
        Self::TextToSignCompleted {
            ts: Utc::now(),
            text,
            display,
        }
    }

    pub fn history_cleared() -> Self {
        Self::HistoryCleared { ts: Utc::now() }
    }

    /// Event type name as serialized
    pub fn event_type(&self) -> &'static str {
        match self {
            Self::SessionStarted { .. } => "session_started",
            Self::SessionEnded { .. } => "session_ended",
            Self::SignAccepted { .. } => "sign_accepted",
            Self::SeparatorInserted { .. } => "separator_inserted",
            Self::ClassificationFailed { .. } => "classification_failed",
            Self::StaleResponseDropped { .. } => "stale_response_dropped",
            Self::MalformedFrame { .. } => "malformed_frame",
            Self::TextToSignCompleted { .. } => "text_to_sign_completed",
            Self::HistoryCleared { .. } => "history_cleared",
        }
    }
}

/// Trait for event delivery targets
///
/// Implementations include:
/// - `TerminalSink` - JSONL output to terminal/file
/// - `ChannelSink` - Broadcast channel for in-process subscribers
/// - `MultiSink` - Fan-out to several sinks (empty = discard)
pub trait EventSink: Send + Sync {
    /// Emit an event to this sink
    fn emit(&self, event: TranslatorEvent) -> Result<(), EventSinkError>;

    /// Close the sink and perform any cleanup
    fn close(&self) -> Result<(), EventSinkError> {
        Ok(())
    }
}

/// Error type for event sink operations
#[derive(Debug, thiserror::Error)]
pub enum EventSinkError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Channel send error: {0}")]
    Channel(String),

    #[error("Sink writer lock poisoned")]
    Poisoned,
}

/// Terminal/file JSONL sink
///
/// Writes events as newline-delimited JSON to a writer.
pub struct TerminalSink<W: Write + Send + Sync> {
    writer: std::sync::Mutex<W>,
}

impl<W: Write + Send + Sync> TerminalSink<W> {
    /// Create a new terminal sink writing to the specified output
    pub fn new(writer: W) -> Self {
        Self {
            writer: std::sync::Mutex::new(writer),
        }
    }
}

impl TerminalSink<std::io::Stdout> {
    /// Create a terminal sink writing to stdout
    pub fn stdout() -> Self {
        Self::new(std::io::stdout())
    }
}

impl<W: Write + Send + Sync> EventSink for TerminalSink<W> {
    fn emit(&self, event: TranslatorEvent) -> Result<(), EventSinkError> {
        let line = serde_json::to_string(&event)
            .map_err(|e| EventSinkError::Serialization(e.to_string()))?;
        let mut writer = self.writer.lock().map_err(|_| EventSinkError::Poisoned)?;
        writeln!(writer, "{}", line)?;
        writer.flush()?;
        Ok(())
    }

    fn close(&self) -> Result<(), EventSinkError> {
        let mut writer = self.writer.lock().map_err(|_| EventSinkError::Poisoned)?;
        writer.flush()?;
        Ok(())
    }
}

/// Broadcast channel sink
///
/// Sends events to a tokio broadcast channel that can have multiple subscribers.
pub struct ChannelSink {
    sender: broadcast::Sender<TranslatorEvent>,
}

impl ChannelSink {
    /// Create a new channel sink with the specified capacity
    pub fn new(capacity: usize) -> (Self, broadcast::Receiver<TranslatorEvent>) {
        let (sender, receiver) = broadcast::channel(capacity);
        (Self { sender }, receiver)
    }

    /// Create a new channel sink with default capacity (256)
    pub fn with_default_capacity() -> (Self, broadcast::Receiver<TranslatorEvent>) {
        Self::new(256)
    }

    /// Subscribe to receive events from this sink
    pub fn subscribe(&self) -> broadcast::Receiver<TranslatorEvent> {
        self.sender.subscribe()
    }

    /// Get the number of active subscribers
    pub fn receiver_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl EventSink for ChannelSink {
    fn emit(&self, event: TranslatorEvent) -> Result<(), EventSinkError> {
        self.sender
            .send(event)
            .map_err(|e| EventSinkError::Channel(e.to_string()))?;
        Ok(())
    }
}

/// Multi-sink that broadcasts events to multiple sinks
///
/// An empty `MultiSink` silently discards everything.
pub struct MultiSink {
    sinks: Vec<Box<dyn EventSink>>,
}

impl MultiSink {
    /// Create a new multi-sink
    pub fn new() -> Self {
        Self { sinks: Vec::new() }
    }

    /// Add a sink to the multi-sink
    pub fn add_sink(&mut self, sink: Box<dyn EventSink>) {
        self.sinks.push(sink);
    }

    pub fn with_sink(mut self, sink: Box<dyn EventSink>) -> Self {
        self.add_sink(sink);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.sinks.is_empty()
    }
}

impl Default for MultiSink {
    fn default() -> Self {
        Self::new()
    }
}

impl EventSink for MultiSink {
    /// Delivers to every sink; returns the first error after trying all of them
    fn emit(&self, event: TranslatorEvent) -> Result<(), EventSinkError> {
        let mut first_error = None;
        for sink in &self.sinks {
            if let Err(e) = sink.emit(event.clone()) {
                first_error.get_or_insert(e);
            }
        }
        first_error.map_or(Ok(()), Err)
    }

    fn close(&self) -> Result<(), EventSinkError> {
        for sink in &self.sinks {
            sink.close()?;
        }
        Ok(())
    }
}
