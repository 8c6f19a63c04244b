//! Session manager
//!
//! Owns the stabilizer for the lifetime of the process and drives the
//! `Idle <-> Capturing` state machine. Every capture start bumps the session
//! epoch; classification responses carry the epoch they were issued under so
//! late arrivals from a finished session are dropped instead of touching a
//! buffer that has already been archived.
//!
//! All methods are synchronous, run-to-completion state transitions. The
//! async plumbing lives in [`runtime`](crate::runtime).

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::time::Instant;

use crate::client::ClassificationResult;
use crate::config::TranslatorConfig;
use crate::events::{EventSink, TranslatorEvent};
use crate::glyphs;
use crate::history::{HistoryEntry, HistoryLog, TranslationMode};
use crate::landmarks::LandmarkFrame;
use crate::stabilizer::{GateRejection, Prediction, StabilizerState, StageOutcome};
use crate::stats::Stats;
use crate::{Error, Result};

/// Capture state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CaptureState {
    Idle,
    Capturing,
}

/// A frame that passed decimation and should be classified
#[derive(Debug, Clone)]
pub struct FrameDispatch {
    /// Epoch the request is issued under
    pub epoch: u64,
    pub frame: LandmarkFrame,
}

/// Outcome of feeding one classification response into the manager
#[derive(Debug, Clone, PartialEq)]
pub enum ResponseDisposition {
    /// Request failed; frame dropped without state change
    Failed,
    /// Discarded by the confidence gate
    Gated(GateRejection),
    /// Passed the gate; result of the remaining stages
    Processed(StageOutcome),
}

/// Read model for presentation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub state: CaptureState,
    pub epoch: u64,
    pub buffer: String,
    pub current_prediction: Option<Prediction>,
    /// Newest first
    pub history: Vec<HistoryEntry>,
    pub stats: Stats,
    /// Glyph sequence of the latest text-to-sign submission
    pub sign_display: Option<String>,
    pub text_to_sign_pending: bool,
}

/// Owner of all translator state
pub struct SessionManager {
    state: CaptureState,
    epoch: u64,
    stabilizer: StabilizerState,
    history: HistoryLog,
    stats: Stats,
    sink: Arc<dyn EventSink>,
    sign_display: Option<String>,
    pending_text_to_sign: usize,
}

impl SessionManager {
    /// Create a manager in the `Idle` state
    pub fn new(config: &TranslatorConfig, sink: Arc<dyn EventSink>) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            state: CaptureState::Idle,
            epoch: 0,
            stabilizer: StabilizerState::new(&config.pipeline, &config.idle, Instant::now()),
            history: HistoryLog::new(config.history.capacity),
            stats: Stats::default(),
            sink,
            sign_display: None,
            pending_text_to_sign: 0,
        })
    }

    fn emit(&self, event: TranslatorEvent) {
        let event_type = event.event_type();
        if let Err(e) = self.sink.emit(event) {
            tracing::debug!(event_type, error = %e, "Event sink rejected event");
        }
    }

    /// `Idle -> Capturing`: bump the epoch and reset all session state
    ///
    /// Starting while already capturing is a no-op that returns the current
    /// epoch.
    pub fn start(&mut self, now: Instant) -> u64 {
        if self.state == CaptureState::Capturing {
            tracing::debug!(epoch = self.epoch, "Capture already running");
            return self.epoch;
        }

        self.epoch += 1;
        self.stabilizer.reset(now);
        self.state = CaptureState::Capturing;

        tracing::info!(epoch = self.epoch, "Capture session started");
        self.emit(TranslatorEvent::session_started(self.epoch));
        self.epoch
    }

    /// `Capturing -> Idle`: archive non-empty text and clear the buffer
    ///
    /// Returns the archived entry, if any. Stopping while idle is a no-op.
    pub fn stop(&mut self) -> Option<HistoryEntry> {
        if self.state == CaptureState::Idle {
            return None;
        }
        self.state = CaptureState::Idle;

        if self.stabilizer.buffer().has_open_word() {
            self.stats.record_word();
        }
        let text = self.stabilizer.take_text();

        let entry = if text.is_empty() {
            None
        } else {
            let entry = HistoryEntry::new(text.clone(), TranslationMode::SignToText);
            self.history.record(entry.clone());
            Some(entry)
        };

        tracing::info!(
            epoch = self.epoch,
            archived = entry.is_some(),
            chars = text.chars().count(),
            "Capture session stopped"
        );
        self.emit(TranslatorEvent::session_ended(
            self.epoch,
            entry.as_ref().map(|e| e.text.clone()),
        ));
        entry
    }

    /// Validate and decimate a raw landmark vector
    ///
    /// Malformed vectors are rejected before decimation and never reach
    /// the classifier. Frames arriving while idle are ignored.
    pub fn on_frame(&mut self, values: Vec<f32>) -> Result<Option<FrameDispatch>> {
        let frame = match LandmarkFrame::new(values) {
            Ok(frame) => frame,
            Err(e) => {
                tracing::warn!(error = %e, "Rejected landmark frame");
                self.emit(TranslatorEvent::malformed_frame(e.to_string()));
                return Err(e);
            }
        };

        if self.state != CaptureState::Capturing {
            return Ok(None);
        }
        if !self.stabilizer.admit_frame() {
            return Ok(None);
        }

        Ok(Some(FrameDispatch {
            epoch: self.epoch,
            frame,
        }))
    }

    /// Feed a classification response tagged with its originating epoch
    pub fn on_classification(
        &mut self,
        origin_epoch: u64,
        outcome: Result<Option<ClassificationResult>>,
        now: Instant,
    ) -> ResponseDisposition {
        let outcome = match outcome {
            Ok(outcome) => outcome,
            Err(e) => {
                tracing::warn!(epoch = origin_epoch, error = %e, "Classification failed, frame dropped");
                self.emit(TranslatorEvent::classification_failed(origin_epoch, e.to_string()));
                return ResponseDisposition::Failed;
            }
        };

        let capturing = self.state == CaptureState::Capturing;
        let result = match self
            .stabilizer
            .gate()
            .check(outcome, origin_epoch, self.epoch, capturing)
        {
            Ok(result) => result,
            Err(rejection) => {
                match &rejection {
                    GateRejection::StaleEpoch { origin, current } => {
                        tracing::debug!(origin, current, "Dropped stale classification response");
                        self.emit(TranslatorEvent::stale_response_dropped(*origin, *current));
                    }
                    other => tracing::trace!(rejection = ?other, "Classification gated"),
                }
                return ResponseDisposition::Gated(rejection);
            }
        };

        let outcome = self.stabilizer.process(result, now);
        if let StageOutcome::Appended(prediction) = &outcome {
            self.stats.record_sign(prediction.confidence);
            tracing::debug!(
                epoch = self.epoch,
                label = %prediction.label,
                confidence = prediction.confidence,
                "Sign accepted"
            );
            self.emit(TranslatorEvent::sign_accepted(
                self.epoch,
                prediction.label.clone(),
                prediction.confidence,
            ));
        }
        ResponseDisposition::Processed(outcome)
    }

    /// Idle poll; returns `true` when a separator was inserted
    pub fn on_idle_tick(&mut self, now: Instant) -> bool {
        if self.state != CaptureState::Capturing {
            return false;
        }
        if !self.stabilizer.on_idle_tick(now) {
            return false;
        }
        self.stats.record_word();
        tracing::debug!(epoch = self.epoch, "Idle separator inserted");
        self.emit(TranslatorEvent::separator_inserted(self.epoch));
        true
    }

    /// Discard the current text without archiving or ending the session
    pub fn clear_buffer(&mut self) {
        self.stabilizer.clear();
        tracing::debug!(epoch = self.epoch, "Translation buffer cleared");
    }

    pub fn clear_history(&mut self) {
        self.history.clear();
        self.emit(TranslatorEvent::history_cleared());
    }

    /// Accept a text-to-sign submission; returns the trimmed text to render
    pub fn begin_text_to_sign(&mut self, text: &str) -> Result<String> {
        let text = text.trim();
        if text.is_empty() {
            return Err(Error::InvalidText("text must not be empty".to_string()));
        }
        self.pending_text_to_sign += 1;
        Ok(text.to_string())
    }

    /// Finish a submission: render glyphs and archive it
    ///
    /// Leaves the sign-to-text buffer untouched.
    pub fn complete_text_to_sign(&mut self, text: String) -> HistoryEntry {
        self.pending_text_to_sign = self.pending_text_to_sign.saturating_sub(1);

        let display = glyphs::render(&text);
        let entry = HistoryEntry::new(text.clone(), TranslationMode::TextToSign);
        self.history.record(entry.clone());
        self.sign_display = Some(display.clone());

        tracing::debug!(text = %text, "Text-to-sign completed");
        self.emit(TranslatorEvent::text_to_sign_completed(text, display));
        entry
    }

    /// Flush and close the event sink
    pub fn close(&self) {
        if let Err(e) = self.sink.close() {
            tracing::warn!(error = %e, "Failed to close event sink");
        }
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            state: self.state,
            epoch: self.epoch,
            buffer: self.stabilizer.buffer().as_str().to_string(),
            current_prediction: self.stabilizer.current_prediction().cloned(),
            history: self.history.to_vec(),
            stats: self.stats.clone(),
            sign_display: self.sign_display.clone(),
            text_to_sign_pending: self.pending_text_to_sign > 0,
        }
    }

    pub fn state(&self) -> CaptureState {
        self.state
    }

    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    pub fn buffer(&self) -> &str {
        self.stabilizer.buffer().as_str()
    }

    pub fn history(&self) -> &HistoryLog {
        &self.history
    }

    pub fn stats(&self) -> &Stats {
        &self.stats
    }

    pub fn stabilizer(&self) -> &StabilizerState {
        &self.stabilizer
    }
}
