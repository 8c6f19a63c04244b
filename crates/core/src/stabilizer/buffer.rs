//! Append-only translated text of the active session

/// Text produced by the stabilizer for one capture session
///
/// Never holds two adjacent separator characters.
#[derive(Debug, Clone)]
pub struct TranslatedBuffer {
    text: String,
    separator: char,
    appended: usize,
}

impl TranslatedBuffer {
    pub fn new(separator: char) -> Self {
        Self {
            text: String::new(),
            separator,
            appended: 0,
        }
    }

    /// Whether appending `label` would keep the separator invariant
    pub fn can_append(&self, label: &str) -> bool {
        if label.is_empty() {
            return false;
        }
        let doubled: String = [self.separator, self.separator].iter().collect();
        if label.contains(&doubled) {
            return false;
        }
        !(self.ends_with_separator() && label.starts_with(self.separator))
    }

    /// Append an accepted label; returns `false` if it was refused
    pub fn push_label(&mut self, label: &str) -> bool {
        if !self.can_append(label) {
            return false;
        }
        self.text.push_str(label);
        self.appended += 1;
        true
    }

    /// Append one separator unless the buffer is empty or already ends with one
    pub fn push_separator(&mut self) -> bool {
        if self.text.is_empty() || self.ends_with_separator() {
            return false;
        }
        self.text.push(self.separator);
        true
    }

    pub fn ends_with_separator(&self) -> bool {
        self.text.ends_with(self.separator)
    }

    /// Whether the text after the last separator is non-empty
    pub fn has_open_word(&self) -> bool {
        !self.text.is_empty() && !self.ends_with_separator()
    }

    /// Number of labels appended since the last clear
    pub fn appended(&self) -> usize {
        self.appended
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    pub fn separator(&self) -> char {
        self.separator
    }

    pub fn clear(&mut self) {
        self.text.clear();
        self.appended = 0;
    }

    /// Move the text out, leaving the buffer empty
    pub fn take(&mut self) -> String {
        self.appended = 0;
        std::mem::take(&mut self.text)
    }
}
