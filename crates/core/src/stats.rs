//! Session-independent counters for presentation

use serde::{Deserialize, Serialize};

/// Translation counters and the accuracy gauge
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Stats {
    /// Signs appended to any buffer
    pub signs_detected: u64,
    /// Words closed by a separator or a session stop
    pub words_translated: u64,
    /// Running mean confidence of appended signs (0.0 before the first)
    pub accuracy: f32,
}

impl Stats {
    pub fn record_sign(&mut self, confidence: f32) {
        self.signs_detected += 1;
        let n = self.signs_detected as f32;
        self.accuracy += (confidence - self.accuracy) / n;
    }

    pub fn record_word(&mut self) {
        self.words_translated += 1;
    }
}
