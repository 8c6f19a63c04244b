//! Recorded landmark streams
//!
//! A recording is a JSONL file, one step per line. Each line is one of:
//!
//! ```text
//! [0.1, 0.2, ...]                      raw flattened frame
//! {"landmarks": [0.1, 0.2, ...]}       same, in request-body form
//! {"hands": [[[x, y, z], ...], ...]}   per-hand landmarks, flattened on load
//! {"pause_ms": 2500}                   no frames for this long
//! ```
//!
//! Blank lines and lines starting with `#` are skipped. Raw frames are passed
//! through unvalidated so malformed vectors surface as translator events.

use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use gesture_bridge_core::landmarks::Landmark;
use gesture_bridge_core::LandmarkFrame;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RecordLine {
    Raw(Vec<f32>),
    Landmarks { landmarks: Vec<f32> },
    Hands { hands: Vec<Vec<[f32; 3]>> },
    Pause { pause_ms: u64 },
}

/// One replay step
#[derive(Debug, Clone, PartialEq)]
pub enum Step {
    Frame(Vec<f32>),
    Pause(Duration),
}

/// Parse recording text into replay steps
pub fn parse(content: &str) -> Result<Vec<Step>> {
    let mut steps = Vec::new();

    for (index, line) in content.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let record: RecordLine = serde_json::from_str(line)
            .with_context(|| format!("line {}: unrecognized record", index + 1))?;

        let step = match record {
            RecordLine::Raw(values) | RecordLine::Landmarks { landmarks: values } => {
                Step::Frame(values)
            }
            RecordLine::Hands { hands } => {
                let hands: Vec<Vec<Landmark>> = hands
                    .into_iter()
                    .map(|hand| {
                        hand.into_iter()
                            .map(|[x, y, z]| Landmark::new(x, y, z))
                            .collect()
                    })
                    .collect();
                let frame = LandmarkFrame::from_hands(&hands)
                    .with_context(|| format!("line {}: invalid hand landmarks", index + 1))?;
                Step::Frame(frame.as_slice().to_vec())
            }
            RecordLine::Pause { pause_ms } => Step::Pause(Duration::from_millis(pause_ms)),
        };
        steps.push(step);
    }

    Ok(steps)
}

/// Load and parse a recording file
pub fn load(path: &Path) -> Result<Vec<Step>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read recording {}", path.display()))?;
    parse(&content)
}
