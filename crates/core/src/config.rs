//! Configuration types for the translator
//!
//! Every tunable of the stabilizer pipeline lives here. All sections carry
//! serde defaults so a partial TOML file (or none at all) yields a working
//! configuration.
//!
//! # Example
//!
//! ```
//! use gesture_bridge_core::config::TranslatorConfig;
//!
//! let config = TranslatorConfig::from_toml_str(
//!     r#"
//!     [pipeline]
//!     stability_threshold = 3
//!
//!     [classifier]
//!     endpoint = "http://10.0.0.5:8000/predict"
//!     "#,
//! )
//! .unwrap();
//!
//! assert_eq!(config.pipeline.stability_threshold, 3);
//! assert_eq!(config.pipeline.decimation_factor, 3);
//! assert_eq!(config.history.capacity, 50);
//! ```

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Top-level translator configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TranslatorConfig {
    /// Decimation, gating, smoothing and dedupe settings
    #[serde(default)]
    pub pipeline: PipelineConfig,

    /// Idle separator timing
    #[serde(default)]
    pub idle: IdleConfig,

    /// History log settings
    #[serde(default)]
    pub history: HistoryConfig,

    /// Remote classification endpoint
    #[serde(default)]
    pub classifier: ClassifierConfig,

    /// Text-to-sign submission path
    #[serde(default)]
    pub text_to_sign: TextToSignConfig,
}

impl TranslatorConfig {
    /// Parse a configuration from TOML text and validate it
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a configuration file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        tracing::debug!(path = %path.display(), "Loading translator config");
        Self::from_toml_str(&content)
    }

    /// Render the configuration as pretty TOML
    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| Error::ConfigError(e.to_string()))
    }

    /// Set the classification endpoint
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.classifier.endpoint = endpoint.into();
        self
    }

    /// Set the pipeline section
    pub fn with_pipeline(mut self, pipeline: PipelineConfig) -> Self {
        self.pipeline = pipeline;
        self
    }

    /// Set the idle section
    pub fn with_idle(mut self, idle: IdleConfig) -> Self {
        self.idle = idle;
        self
    }

    /// Check all invariants the pipeline relies on
    pub fn validate(&self) -> Result<()> {
        self.pipeline.validate()?;
        self.idle.validate()?;

        if self.history.capacity == 0 {
            return Err(Error::ConfigError(
                "history.capacity must be at least 1".to_string(),
            ));
        }
        if self.classifier.endpoint.trim().is_empty() {
            return Err(Error::ConfigError(
                "classifier.endpoint must not be empty".to_string(),
            ));
        }
        if self.classifier.timeout_ms == 0 {
            return Err(Error::ConfigError(
                "classifier.timeout_ms must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }
}

/// Stabilizer pipeline settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Forward every Nth landmark frame for classification (default: 3)
    #[serde(default = "default_decimation_factor")]
    pub decimation_factor: u32,

    /// Minimum classifier confidence to accept a label (default: 0.6)
    #[serde(default = "default_confidence_threshold")]
    pub confidence_threshold: f32,

    /// Number of recent accepted labels kept for smoothing (default: 4)
    #[serde(default = "default_smoothing_window_size")]
    pub smoothing_window_size: usize,

    /// Agreeing entries required in the window before a label is trusted (default: 2)
    #[serde(default = "default_stability_threshold")]
    pub stability_threshold: usize,

    /// Block immediate repetition of the last appended label (default: true)
    #[serde(default = "default_dedupe_enabled")]
    pub dedupe_enabled: bool,

    /// Character inserted after an idle pause (default: ' ')
    #[serde(default = "default_separator")]
    pub separator: char,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            decimation_factor: default_decimation_factor(),
            confidence_threshold: default_confidence_threshold(),
            smoothing_window_size: default_smoothing_window_size(),
            stability_threshold: default_stability_threshold(),
            dedupe_enabled: default_dedupe_enabled(),
            separator: default_separator(),
        }
    }
}

impl PipelineConfig {
    fn validate(&self) -> Result<()> {
        if self.decimation_factor == 0 {
            return Err(Error::ConfigError(
                "pipeline.decimation_factor must be at least 1".to_string(),
            ));
        }
        if !(0.0..=1.0).contains(&self.confidence_threshold) {
            return Err(Error::ConfigError(format!(
                "pipeline.confidence_threshold must be within [0, 1], got {}",
                self.confidence_threshold
            )));
        }
        if self.smoothing_window_size == 0 {
            return Err(Error::ConfigError(
                "pipeline.smoothing_window_size must be at least 1".to_string(),
            ));
        }
        if self.stability_threshold == 0 || self.stability_threshold > self.smoothing_window_size {
            return Err(Error::ConfigError(format!(
                "pipeline.stability_threshold must be within 1..={}, got {}",
                self.smoothing_window_size, self.stability_threshold
            )));
        }
        if self.stability_threshold == 1 {
            tracing::warn!(
                "pipeline.stability_threshold = 1 disables smoothing; a single noisy frame can flip output"
            );
        }
        Ok(())
    }
}

/// Idle separator settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IdleConfig {
    /// Pause after the last accepted label before a separator is inserted (default: 2000ms)
    #[serde(default = "default_idle_timeout_ms")]
    pub timeout_ms: u64,

    /// Idle check period while capturing (default: 300ms)
    #[serde(default = "default_idle_poll_ms")]
    pub poll_ms: u64,
}

impl Default for IdleConfig {
    fn default() -> Self {
        Self {
            timeout_ms: default_idle_timeout_ms(),
            poll_ms: default_idle_poll_ms(),
        }
    }
}

impl IdleConfig {
    /// Idle timeout as a `Duration`
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Poll period as a `Duration`
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_ms)
    }

    fn validate(&self) -> Result<()> {
        if self.poll_ms == 0 {
            return Err(Error::ConfigError(
                "idle.poll_ms must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }
}

/// History log settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryConfig {
    /// Maximum number of retained entries, newest first (default: 50)
    #[serde(default = "default_history_capacity")]
    pub capacity: usize,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            capacity: default_history_capacity(),
        }
    }
}

/// Remote classification endpoint settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassifierConfig {
    /// Prediction URL accepting `{"landmarks": [...]}`
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    /// Per-request timeout (default: 1000ms)
    #[serde(default = "default_classifier_timeout_ms")]
    pub timeout_ms: u64,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            timeout_ms: default_classifier_timeout_ms(),
        }
    }
}

impl ClassifierConfig {
    /// Request timeout as a `Duration`
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

/// Text-to-sign submission settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextToSignConfig {
    /// Simulated rendering latency before a submission completes (default: 500ms)
    #[serde(default = "default_text_to_sign_latency_ms")]
    pub latency_ms: u64,
}

impl Default for TextToSignConfig {
    fn default() -> Self {
        Self {
            latency_ms: default_text_to_sign_latency_ms(),
        }
    }
}

impl TextToSignConfig {
    /// Latency as a `Duration`
    pub fn latency(&self) -> Duration {
        Duration::from_millis(self.latency_ms)
    }
}

fn default_decimation_factor() -> u32 {
    3
}

fn default_confidence_threshold() -> f32 {
    0.6
}

fn default_smoothing_window_size() -> usize {
    4
}

fn default_stability_threshold() -> usize {
    2
}

fn default_dedupe_enabled() -> bool {
    true
}

fn default_separator() -> char {
    ' '
}

fn default_idle_timeout_ms() -> u64 {
    2000
}

fn default_idle_poll_ms() -> u64 {
    300
}

fn default_history_capacity() -> usize {
    50
}

fn default_endpoint() -> String {
    "http://127.0.0.1:8000/predict".to_string()
}

fn default_classifier_timeout_ms() -> u64 {
    1000
}

fn default_text_to_sign_latency_ms() -> u64 {
    500
}
