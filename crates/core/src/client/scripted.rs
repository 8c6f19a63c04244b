//! Scripted classifier
//!
//! Answers from a queue of canned responses, falling back to a fixed
//! response once the queue is empty. Each response may carry its own delay,
//! which lets callers reproduce out-of-order and late completions.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use super::{ClassificationClient, ClassificationResult};
use crate::landmarks::LandmarkFrame;
use crate::{Error, Result};

/// One canned classifier answer
#[derive(Debug, Clone, PartialEq)]
pub enum ScriptedResponse {
    /// Successful classification
    Label {
        label: String,
        confidence: f32,
    },
    /// Classifier answered without a label
    Absent,
    /// Endpoint failed with the given HTTP status
    ServerError(u16),
}

impl ScriptedResponse {
    pub fn label(label: impl Into<String>, confidence: f32) -> Self {
        ScriptedResponse::Label {
            label: label.into(),
            confidence,
        }
    }

    fn into_result(self) -> Result<Option<ClassificationResult>> {
        match self {
            ScriptedResponse::Label { label, confidence } => {
                Ok(Some(ClassificationResult { label, confidence }))
            }
            ScriptedResponse::Absent => Ok(None),
            ScriptedResponse::ServerError(status) => Err(Error::ClassifierStatus {
                endpoint: "scripted".to_string(),
                status,
            }),
        }
    }
}

/// Classifier that replays a script of responses
pub struct ScriptedClassifier {
    script: Mutex<VecDeque<(ScriptedResponse, Duration)>>,
    fallback: ScriptedResponse,
    delay: Duration,
    calls: AtomicUsize,
}

impl ScriptedClassifier {
    /// Answer every request with the same response
    pub fn constant(response: ScriptedResponse) -> Self {
        Self {
            script: Mutex::new(VecDeque::new()),
            fallback: response,
            delay: Duration::ZERO,
            calls: AtomicUsize::new(0),
        }
    }

    /// Answer every request with a server error
    pub fn failing(status: u16) -> Self {
        Self::constant(ScriptedResponse::ServerError(status))
    }

    /// Answer requests in order, then report no label
    pub fn sequence(responses: impl IntoIterator<Item = ScriptedResponse>) -> Self {
        let classifier = Self::constant(ScriptedResponse::Absent);
        for response in responses {
            classifier.push(response);
        }
        classifier
    }

    /// Apply a default delay to every response without its own
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Queue a response using the default delay
    pub fn push(&self, response: ScriptedResponse) {
        self.push_delayed(response, Duration::ZERO);
    }

    /// Queue a response that completes after `delay`
    pub fn push_delayed(&self, response: ScriptedResponse, delay: Duration) {
        if let Ok(mut script) = self.script.lock() {
            script.push_back((response, delay));
        }
    }

    /// Number of classify calls made so far
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ClassificationClient for ScriptedClassifier {
    async fn classify(&self, _frame: &LandmarkFrame) -> Result<Option<ClassificationResult>> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        let next = self
            .script
            .lock()
            .ok()
            .and_then(|mut script| script.pop_front());
        let (response, delay) = match next {
            Some((response, delay)) if delay.is_zero() => (response, self.delay),
            Some(entry) => entry,
            None => (self.fallback.clone(), self.delay),
        };

        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }

        response.into_result()
    }

    fn name(&self) -> &str {
        "scripted"
    }
}
