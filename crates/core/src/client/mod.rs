//! Classification client abstraction
//!
//! The classifier itself is an external collaborator: it maps a landmark
//! frame to a `{label, confidence}` pair. This module defines the seam the
//! session layer calls through, an HTTP implementation for the real endpoint
//! and a scripted implementation for tests and offline replays.

mod http;
mod scripted;

pub use http::HttpClassificationClient;
pub use scripted::{ScriptedClassifier, ScriptedResponse};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::landmarks::LandmarkFrame;
use crate::Result;

/// A label and the classifier's confidence in it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassificationResult {
    /// Predicted sign label (typically a single letter or digit)
    pub label: String,

    /// Confidence in `[0, 1]`
    pub confidence: f32,
}

impl ClassificationResult {
    pub fn new(label: impl Into<String>, confidence: f32) -> Self {
        Self {
            label: label.into(),
            confidence,
        }
    }
}

/// Trait for classification backends
///
/// `Ok(None)` means the classifier answered but produced no label (for
/// example, the endpoint's own confidence floor rejected the frame). `Err`
/// covers transport failures, timeouts, non-success statuses and malformed
/// bodies; callers treat every error as a dropped frame.
#[async_trait]
pub trait ClassificationClient: Send + Sync {
    /// Classify one landmark frame
    async fn classify(&self, frame: &LandmarkFrame) -> Result<Option<ClassificationResult>>;

    /// Get the name of this client (for logging)
    fn name(&self) -> &str;
}
