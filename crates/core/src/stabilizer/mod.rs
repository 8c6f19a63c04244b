//! Gesture-stream stabilizer
//!
//! Turns noisy per-frame classifications into an append-only text buffer:
//!
//! ```text
//! frame -> decimator -> classifier -> confidence gate -> smoothing window
//!       -> duplicate suppressor -> buffer append
//! ```
//!
//! The idle timer runs beside the chain and closes words with a separator
//! after a pause. All stage state lives in [`StabilizerState`], owned by the
//! [`SessionManager`](crate::session::SessionManager).

mod buffer;
mod dedup;
mod gate;
mod idle;
mod smoothing;

pub use buffer::TranslatedBuffer;
pub use dedup::DuplicateSuppressor;
pub use gate::{ConfidenceGate, GateRejection};
pub use idle::IdleTimer;
pub use smoothing::SmoothingWindow;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::time::Instant;

use crate::client::ClassificationResult;
use crate::config::{IdleConfig, PipelineConfig};
use crate::decimator::FrameDecimator;

/// Most recently appended sign, for presentation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    pub label: String,
    pub confidence: f32,
    pub timestamp: DateTime<Utc>,
}

/// What happened to a gated result inside the stabilizer
#[derive(Debug, Clone, PartialEq)]
pub enum StageOutcome {
    /// Not enough agreement in the smoothing window yet
    Unstable { stable_count: usize },
    /// Same label as the last appended one
    Duplicate,
    /// Appending would break the separator invariant; checked before dedupe,
    /// so a refused label never becomes the duplicate marker
    Refused,
    /// Label appended to the buffer
    Appended(Prediction),
}

/// Per-session stabilizer state
#[derive(Debug)]
pub struct StabilizerState {
    decimator: FrameDecimator,
    gate: ConfidenceGate,
    smoothing: SmoothingWindow,
    dedup: DuplicateSuppressor,
    idle: IdleTimer,
    buffer: TranslatedBuffer,
    current_prediction: Option<Prediction>,
}

impl StabilizerState {
    pub fn new(pipeline: &PipelineConfig, idle: &IdleConfig, now: Instant) -> Self {
        Self {
            decimator: FrameDecimator::new(pipeline.decimation_factor),
            gate: ConfidenceGate::new(pipeline.confidence_threshold),
            smoothing: SmoothingWindow::new(
                pipeline.smoothing_window_size,
                pipeline.stability_threshold,
            ),
            dedup: DuplicateSuppressor::new(pipeline.dedupe_enabled),
            idle: IdleTimer::new(idle.timeout(), now),
            buffer: TranslatedBuffer::new(pipeline.separator),
            current_prediction: None,
        }
    }

    /// Reset everything for a new session
    pub fn reset(&mut self, now: Instant) {
        self.decimator.reset();
        self.smoothing.reset();
        self.dedup.reset();
        self.buffer.clear();
        self.current_prediction = None;
        self.idle.reset(now);
    }

    /// Clear the session text without touching the idle clock
    pub fn clear(&mut self) {
        self.decimator.reset();
        self.smoothing.reset();
        self.dedup.reset();
        self.buffer.clear();
        self.current_prediction = None;
    }

    /// Count a frame through the decimator
    pub fn admit_frame(&mut self) -> bool {
        self.decimator.admit()
    }

    pub fn gate(&self) -> &ConfidenceGate {
        &self.gate
    }

    /// Run a gated result through smoothing, dedupe and append
    pub fn process(&mut self, result: ClassificationResult, now: Instant) -> StageOutcome {
        self.idle.touch(now);

        let stable_count = self.smoothing.observe(&result.label);
        if !self.smoothing.is_stable(stable_count) {
            tracing::trace!(label = %result.label, stable_count, "Label not yet stable");
            return StageOutcome::Unstable { stable_count };
        }

        if !self.buffer.can_append(&result.label) {
            tracing::trace!(label = %result.label, "Label would double the separator");
            return StageOutcome::Refused;
        }

        if !self.dedup.accept(&result.label) {
            tracing::trace!(label = %result.label, "Duplicate label suppressed");
            return StageOutcome::Duplicate;
        }

        self.buffer.push_label(&result.label);
        let prediction = Prediction {
            label: result.label,
            confidence: result.confidence,
            timestamp: Utc::now(),
        };
        self.current_prediction = Some(prediction.clone());
        StageOutcome::Appended(prediction)
    }

    /// Insert a separator if the session has been idle long enough
    ///
    /// Returns `true` when a separator was appended. Repeated ticks within
    /// the same idle span are no-ops.
    pub fn on_idle_tick(&mut self, now: Instant) -> bool {
        if !self.idle.is_idle(now) || !self.buffer.has_open_word() {
            return false;
        }
        if !self.buffer.push_separator() {
            return false;
        }
        self.dedup.reset();
        self.smoothing.reset();
        true
    }

    pub fn buffer(&self) -> &TranslatedBuffer {
        &self.buffer
    }

    /// Move the buffered text out and clear prediction and dedupe state
    pub fn take_text(&mut self) -> String {
        self.current_prediction = None;
        self.dedup.reset();
        self.smoothing.reset();
        self.buffer.take()
    }

    pub fn current_prediction(&self) -> Option<&Prediction> {
        self.current_prediction.as_ref()
    }

    pub fn smoothing(&self) -> &SmoothingWindow {
        &self.smoothing
    }

    pub fn dedup(&self) -> &DuplicateSuppressor {
        &self.dedup
    }

    pub fn idle(&self) -> &IdleTimer {
        &self.idle
    }

    pub fn decimator(&self) -> &FrameDecimator {
        &self.decimator
    }
}
