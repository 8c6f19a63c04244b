//! Confidence gate
//!
//! First stage after classification. Drops absent results, results under
//! the confidence threshold and anything tagged with an epoch other than the
//! one currently capturing.

use crate::client::ClassificationResult;

/// Why the gate discarded a result
#[derive(Debug, Clone, PartialEq)]
pub enum GateRejection {
    /// Result belongs to an earlier session
    StaleEpoch { origin: u64, current: u64 },
    /// No capture session is running
    NotCapturing,
    /// Classifier answered without a label
    Absent,
    /// Confidence below the threshold
    LowConfidence { confidence: f32 },
}

/// Threshold filter on classifier confidence and session epoch
#[derive(Debug, Clone)]
pub struct ConfidenceGate {
    threshold: f32,
}

impl ConfidenceGate {
    pub fn new(threshold: f32) -> Self {
        Self { threshold }
    }

    /// Pass a result through the gate
    ///
    /// `origin_epoch` is the epoch the request was issued under; `current`
    /// is the manager's epoch when the response arrives.
    pub fn check(
        &self,
        outcome: Option<ClassificationResult>,
        origin_epoch: u64,
        current_epoch: u64,
        capturing: bool,
    ) -> Result<ClassificationResult, GateRejection> {
        if origin_epoch != current_epoch {
            return Err(GateRejection::StaleEpoch {
                origin: origin_epoch,
                current: current_epoch,
            });
        }
        if !capturing {
            return Err(GateRejection::NotCapturing);
        }
        let result = outcome.ok_or(GateRejection::Absent)?;
        if result.label.is_empty() {
            return Err(GateRejection::Absent);
        }
        if result.confidence.is_nan() || result.confidence < self.threshold {
            return Err(GateRejection::LowConfidence {
                confidence: result.confidence,
            });
        }
        Ok(result)
    }
}
