//! Gesture Bridge Core
//!
//! Turns a noisy, high-frequency stream of per-frame hand-sign
//! classifications into stable, append-only text, and archives completed
//! translations into a bounded history.
//!
//! This crate provides:
//! - `LandmarkFrame` - validated 126-value hand landmark vectors
//! - `ClassificationClient` - seam to the remote classifier (HTTP or scripted)
//! - `StabilizerState` - decimation, confidence gate, smoothing, dedupe and idle separators
//! - `SessionManager` - capture state machine, session epochs and history flush
//! - `Translator` - tokio driver serializing frames, completions and idle ticks
//! - `TranslatorEvent` / `EventSink` - observability output
//!
//! # Usage
//!
//! ```rust
//! use std::sync::Arc;
//! use gesture_bridge_core::client::{ScriptedClassifier, ScriptedResponse};
//! use gesture_bridge_core::config::TranslatorConfig;
//! use gesture_bridge_core::events::MultiSink;
//! use gesture_bridge_core::Translator;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> gesture_bridge_core::Result<()> {
//! let classifier = Arc::new(ScriptedClassifier::constant(ScriptedResponse::label("A", 0.9)));
//! let translator = Translator::spawn(
//!     TranslatorConfig::default(),
//!     classifier,
//!     Arc::new(MultiSink::new()),
//! )?;
//!
//! translator.start_capture().await?;
//! for _ in 0..12 {
//!     translator.push_frame(vec![0.5; 126]).await?;
//! }
//! tokio::time::sleep(std::time::Duration::from_millis(50)).await;
//! assert_eq!(translator.snapshot().await?.buffer, "A");
//! translator.shutdown().await?;
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod config;
pub mod decimator;
pub mod error;
pub mod events;
pub mod glyphs;
pub mod history;
pub mod landmarks;
pub mod runtime;
pub mod session;
pub mod stabilizer;
pub mod stats;

pub use error::{Error, Result};
pub use history::{HistoryEntry, HistoryLog, TranslationMode};
pub use landmarks::{LandmarkFrame, FRAME_LEN};
pub use runtime::Translator;
pub use session::{CaptureState, SessionManager, Snapshot};
pub use stats::Stats;
