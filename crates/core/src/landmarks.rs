//! Landmark frames
//!
//! A frame is the flattened hand-landmark vector produced once per captured
//! video frame: up to two hands of 21 landmarks, each `(x, y, z)`, zero-padded
//! when a hand is absent. `x`/`y` are normalized to `[0, 1]`, `z` is raw depth.

use serde::Serialize;

use crate::{Error, Result};

/// Landmarks tracked per hand
pub const LANDMARKS_PER_HAND: usize = 21;

/// Hands encoded per frame
pub const MAX_HANDS: usize = 2;

/// Coordinates per landmark
pub const COORDS_PER_LANDMARK: usize = 3;

/// Length of a flattened frame (2 × 21 × 3)
pub const FRAME_LEN: usize = MAX_HANDS * LANDMARKS_PER_HAND * COORDS_PER_LANDMARK;

/// One hand landmark
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Landmark {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Landmark {
    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }
}

/// Validated, fixed-length landmark vector
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LandmarkFrame {
    landmarks: Vec<f32>,
}

impl LandmarkFrame {
    /// Validate a raw vector at the pipeline boundary
    ///
    /// Anything other than exactly [`FRAME_LEN`] finite values is rejected
    /// so it can never reach the classification endpoint.
    pub fn new(values: Vec<f32>) -> Result<Self> {
        if values.len() != FRAME_LEN {
            return Err(Error::MalformedFrame {
                expected: FRAME_LEN,
                actual: values.len(),
            });
        }
        if let Some(index) = values.iter().position(|v| !v.is_finite()) {
            return Err(Error::NonFiniteLandmark { index });
        }
        Ok(Self { landmarks: values })
    }

    /// Flatten tracked hands into a frame
    ///
    /// Only the first two hands are used. Short hands and missing hands are
    /// zero-padded; extra landmarks beyond the frame length are dropped.
    pub fn from_hands(hands: &[Vec<Landmark>]) -> Result<Self> {
        let mut flat = Vec::with_capacity(FRAME_LEN);
        for hand in hands.iter().take(MAX_HANDS) {
            for lm in hand {
                flat.extend_from_slice(&[lm.x, lm.y, lm.z]);
            }
        }
        flat.resize(FRAME_LEN, 0.0);
        Self::new(flat)
    }

    /// Flattened values
    pub fn as_slice(&self) -> &[f32] {
        &self.landmarks
    }
}

impl TryFrom<Vec<f32>> for LandmarkFrame {
    type Error = Error;

    fn try_from(values: Vec<f32>) -> Result<Self> {
        Self::new(values)
    }
}

impl AsRef<[f32]> for LandmarkFrame {
    fn as_ref(&self) -> &[f32] {
        self.as_slice()
    }
}
