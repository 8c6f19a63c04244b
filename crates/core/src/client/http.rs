//! HTTP classification client
//!
//! Posts `{"landmarks": [f32; 126]}` to the prediction endpoint and expects
//! `{"label": string | null, "confidence": float}` back.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

use super::{ClassificationClient, ClassificationResult};
use crate::config::ClassifierConfig;
use crate::landmarks::LandmarkFrame;
use crate::{Error, Result};

/// Response body of the prediction endpoint
#[derive(Debug, Deserialize)]
struct PredictResponse {
    #[serde(default)]
    label: Option<String>,
    #[serde(default)]
    confidence: Option<f32>,
}

impl PredictResponse {
    fn into_result(self) -> Result<Option<ClassificationResult>> {
        let label = match self.label {
            Some(label) if !label.is_empty() => label,
            // The endpoint answers `label: null` below its own confidence floor
            _ => return Ok(None),
        };

        let confidence = self
            .confidence
            .ok_or_else(|| Error::MalformedResponse("missing confidence".to_string()))?;
        if !confidence.is_finite() || !(0.0..=1.0).contains(&confidence) {
            return Err(Error::MalformedResponse(format!(
                "confidence out of range: {}",
                confidence
            )));
        }

        Ok(Some(ClassificationResult { label, confidence }))
    }
}

/// Classification client backed by the remote HTTP endpoint
pub struct HttpClassificationClient {
    /// HTTP client
    client: Client,

    /// Prediction URL
    endpoint: String,

    /// Request timeout, kept for error reporting
    timeout_ms: u64,
}

impl HttpClassificationClient {
    /// Create a client from the classifier configuration
    pub fn new(config: &ClassifierConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|e| Error::ConfigError(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            endpoint: config.endpoint.clone(),
            timeout_ms: config.timeout_ms,
        })
    }

    /// Prediction URL this client posts to
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn map_transport_error(&self, err: reqwest::Error) -> Error {
        if err.is_timeout() {
            Error::ClassifierTimeout {
                timeout_ms: self.timeout_ms,
            }
        } else if err.is_decode() {
            Error::MalformedResponse(err.to_string())
        } else {
            Error::ClassifierRequest {
                endpoint: self.endpoint.clone(),
                reason: err.to_string(),
            }
        }
    }
}

#[async_trait]
impl ClassificationClient for HttpClassificationClient {
    async fn classify(&self, frame: &LandmarkFrame) -> Result<Option<ClassificationResult>> {
        let response = self
            .client
            .post(&self.endpoint)
            .json(frame)
            .send()
            .await
            .map_err(|e| self.map_transport_error(e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::ClassifierStatus {
                endpoint: self.endpoint.clone(),
                status: status.as_u16(),
            });
        }

        let body: PredictResponse = response
            .json()
            .await
            .map_err(|e| self.map_transport_error(e))?;

        body.into_result()
    }

    fn name(&self) -> &str {
        "http"
    }
}
