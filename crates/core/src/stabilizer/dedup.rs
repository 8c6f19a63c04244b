//! Duplicate suppression
//!
//! A held gesture stays stable across many decimated frames; without this
//! stage it would be appended once per frame.

/// Blocks immediate repetition of the last appended label
#[derive(Debug, Clone)]
pub struct DuplicateSuppressor {
    enabled: bool,
    last: Option<String>,
}

impl DuplicateSuppressor {
    pub fn new(enabled: bool) -> Self {
        Self {
            enabled,
            last: None,
        }
    }

    /// Returns `true` and records the label if it is not a repeat
    pub fn accept(&mut self, label: &str) -> bool {
        if self.enabled && self.last.as_deref() == Some(label) {
            return false;
        }
        self.last = Some(label.to_string());
        true
    }

    /// Clear the marker so the next label is accepted regardless
    pub fn reset(&mut self) {
        self.last = None;
    }

    pub fn last(&self) -> Option<&str> {
        self.last.as_deref()
    }
}
