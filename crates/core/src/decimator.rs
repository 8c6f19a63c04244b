//! Frame decimation
//!
//! Bounds the rate of classification calls independently of the camera frame
//! rate by forwarding only every Nth frame of a session.

/// Per-session frame decimator
#[derive(Debug, Clone)]
pub struct FrameDecimator {
    factor: u32,
    counter: u64,
}

impl FrameDecimator {
    /// Create a decimator forwarding every `factor`th frame
    ///
    /// A factor of 0 is treated as 1 (forward everything); configuration
    /// validation rejects it before it gets here.
    pub fn new(factor: u32) -> Self {
        Self {
            factor: factor.max(1),
            counter: 0,
        }
    }

    /// Count a frame and report whether it should be classified
    ///
    /// Over `F` calls exactly `floor(F / factor)` return `true`.
    pub fn admit(&mut self) -> bool {
        self.counter += 1;
        self.counter % u64::from(self.factor) == 0
    }

    /// Reset the counter at a session boundary
    pub fn reset(&mut self) {
        self.counter = 0;
    }

    /// Frames seen since the last reset
    pub fn frames_seen(&self) -> u64 {
        self.counter
    }

    pub fn factor(&self) -> u32 {
        self.factor
    }
}
